//! Gateway protocol definitions
//!
//! Defines the WebSocket protocol including op codes, message formats, and close codes.

mod close_codes;
mod error;
mod messages;
mod opcodes;
mod payloads;
mod presence;

pub use close_codes::{CloseCode, NORMAL_CLOSE};
pub use error::{ProtocolError, ProtocolResult};
pub use messages::{GatewayMessage, OutboundMessage};
pub use opcodes::OpCode;
pub use payloads::{HelloPayload, IdentifyPayload, IdentifyProperties, ReadyPayload, ResumePayload};
pub use presence::{Activity, Assets, Metadata, Presence, Timestamps};
