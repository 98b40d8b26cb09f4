//! Client error types

use crate::protocol::ProtocolError;
use crate::transport::TransportError;
use thiserror::Error;

/// Errors surfaced by the public client API
#[derive(Debug, Error)]
pub enum ClientError {
    /// Neither a token nor an email/password pair was supplied
    #[error("Either a token or an email and password must be provided")]
    MissingCredentials,

    /// No open connection to write to
    #[error("Not connected to the gateway")]
    NotConnected,

    /// `connect` called while a session is running
    #[error("Session is already running")]
    AlreadyConnected,

    /// `connect` called after the client was shut down
    #[error("Client has been shut down")]
    ShutDown,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Client result type
pub type ClientResult<T> = Result<T, ClientError>;
