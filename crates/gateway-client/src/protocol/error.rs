//! Protocol error types

use thiserror::Error;

/// Frame codec errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Inbound text is not a valid gateway envelope
    #[error("Failed to decode frame: {0}")]
    Decode(#[source] serde_json::Error),

    /// Envelope body does not have the shape expected for its opcode/event
    #[error("Invalid {what} payload: {source}")]
    Payload {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Outbound body could not be serialized
    #[error("Failed to encode frame: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Protocol result type
pub type ProtocolResult<T> = Result<T, ProtocolError>;
