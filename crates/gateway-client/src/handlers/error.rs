//! Handler error types

use crate::error::ClientError;
use crate::protocol::ProtocolError;
use thiserror::Error;

/// Handler error type
///
/// Never fatal to the session: the read loop logs it and moves to the next frame.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Payload did not match the opcode's shape
    #[error(transparent)]
    Payload(#[from] ProtocolError),

    /// Payload decoded but carried an unusable value
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Reply could not be sent
    #[error("Send failed: {0}")]
    Send(#[from] ClientError),
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
