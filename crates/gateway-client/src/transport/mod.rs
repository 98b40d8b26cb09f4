//! Transport abstraction
//!
//! A duplex text-message connection split into a write half ([`FrameSink`]) and a
//! read half ([`FrameStream`]). The session engine only talks to these traits.
//! [`WsConnector`] is the production implementation and unit tests use an
//! in-process connector.

#[cfg(test)]
mod memory;
mod ws;

#[cfg(test)]
pub(crate) use memory::{MemoryConnector, MemoryPeer, SentFrame};
pub use ws::WsConnector;

use async_trait::async_trait;
use thiserror::Error;

/// Something read from the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A text frame
    Text(String),
    /// End of stream, with the close code if the peer sent one
    Closed(Option<u16>),
}

/// Opens connections
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> TransportResult<(Box<dyn FrameSink>, Box<dyn FrameStream>)>;
}

/// Write half of a connection
#[async_trait]
pub trait FrameSink: Send {
    async fn send(&mut self, text: String) -> TransportResult<()>;

    /// Send a close frame with `code` and shut the write half
    async fn close(&mut self, code: u16) -> TransportResult<()>;
}

/// Read half of a connection
#[async_trait]
pub trait FrameStream: Send {
    /// Next text frame, or `Inbound::Closed` once the connection is gone
    async fn receive(&mut self) -> Inbound;
}

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Connection closed")]
    Closed,

    #[error("Connect to {url} failed: {reason}")]
    Connect { url: String, reason: String },
}

/// Transport result type
pub type TransportResult<T> = Result<T, TransportError>;
