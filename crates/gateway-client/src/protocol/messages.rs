//! Gateway message format
//!
//! Inbound frames decode into [`GatewayMessage`]; outbound frames are built as
//! [`OutboundMessage`] and encoded as `{"op": <int>, "d": <body>}`.

use super::{
    HelloPayload, IdentifyPayload, OpCode, Presence, ProtocolError, ProtocolResult, ReadyPayload,
    ResumePayload,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway message envelope
///
/// Every frame received over the WebSocket connection follows this format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Operation code
    #[serde(default)]
    pub op: OpCode,

    /// Event name (only for op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Sequence number (only for op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event data payload
    #[serde(default)]
    pub d: Value,
}

impl GatewayMessage {
    // === Server frames (used by fake gateways in tests) ===

    /// Create a Dispatch message (op=0)
    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, sequence: u64, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch,
            t: Some(event_type.into()),
            s: Some(sequence),
            d: data,
        }
    }

    /// Create a Hello message (op=10)
    #[must_use]
    pub fn hello(heartbeat_interval: u64) -> Self {
        Self::control(
            OpCode::Hello,
            serde_json::json!({ "heartbeat_interval": heartbeat_interval }),
        )
    }

    /// Create an Invalid Session message (op=9)
    #[must_use]
    pub fn invalid_session(resumable: bool) -> Self {
        Self::control(OpCode::InvalidSession, Value::Bool(resumable))
    }

    /// Create a control message without event name or sequence
    #[must_use]
    pub fn control(op: OpCode, data: Value) -> Self {
        Self {
            op,
            t: None,
            s: None,
            d: data,
        }
    }

    // === Decoding ===

    /// Decode a frame from wire text
    ///
    /// Unknown opcodes decode as [`OpCode::Unknown`]; anything that is not an
    /// envelope is a [`ProtocolError::Decode`].
    pub fn from_json(json: &str) -> ProtocolResult<Self> {
        serde_json::from_str(json).map_err(ProtocolError::Decode)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> ProtocolResult<String> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Lowercase event name, the key used by event subscriptions
    #[must_use]
    pub fn event_key(&self) -> Option<String> {
        self.t.as_deref().map(str::to_lowercase)
    }

    /// Interpret the body as `T`
    pub fn payload<T: DeserializeOwned>(&self, what: &'static str) -> ProtocolResult<T> {
        T::deserialize(&self.d).map_err(|source| ProtocolError::Payload { what, source })
    }

    /// Parse the Hello body (op=10)
    pub fn as_hello(&self) -> ProtocolResult<HelloPayload> {
        self.payload("Hello")
    }

    /// Parse the READY dispatch body
    pub fn as_ready(&self) -> ProtocolResult<ReadyPayload> {
        self.payload("READY")
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "GatewayMessage(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "GatewayMessage(op={})", self.op)
        }
    }
}

/// Client-to-server frame
///
/// The body is passed through without validation.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage<T = Value> {
    pub op: OpCode,
    pub d: T,
}

impl<T: Serialize> OutboundMessage<T> {
    #[must_use]
    pub fn new(op: OpCode, d: T) -> Self {
        Self { op, d }
    }

    /// Encode to wire text
    pub fn to_json(&self) -> ProtocolResult<String> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

impl OutboundMessage<Option<u64>> {
    /// Heartbeat (op=1) carrying the last seen sequence, `null` before the first one
    #[must_use]
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        Self::new(OpCode::Heartbeat, last_sequence)
    }
}

impl OutboundMessage<IdentifyPayload> {
    /// Identify (op=2)
    #[must_use]
    pub fn identify(payload: IdentifyPayload) -> Self {
        Self::new(OpCode::Identify, payload)
    }
}

impl OutboundMessage<ResumePayload> {
    /// Resume (op=6)
    #[must_use]
    pub fn resume(payload: ResumePayload) -> Self {
        Self::new(OpCode::Resume, payload)
    }
}

impl OutboundMessage<Presence> {
    /// Presence Update (op=3)
    #[must_use]
    pub fn presence(presence: Presence) -> Self {
        Self::new(OpCode::PresenceUpdate, presence)
    }
}
