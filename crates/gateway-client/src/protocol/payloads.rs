//! Handshake payload definitions
//!
//! Bodies of the frames that drive the session handshake.

use gateway_common::IdentifyConfig;
use serde::{Deserialize, Serialize};

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Payload for op 2 (Identify)
///
/// Sent by the client to authenticate a fresh session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyPayload {
    pub capabilities: u64,
    pub compress: bool,
    pub large_threshold: u32,
    pub properties: IdentifyProperties,
    /// Authentication token
    pub token: String,
}

impl IdentifyPayload {
    /// Build the request sent on every identify attempt
    #[must_use]
    pub fn new(token: impl Into<String>, config: &IdentifyConfig) -> Self {
        Self {
            capabilities: config.capabilities,
            compress: false,
            large_threshold: config.large_threshold,
            properties: IdentifyProperties {
                browser: config.browser.clone(),
                device: config.device.clone(),
                os: config.os.clone(),
            },
            token: token.into(),
        }
    }
}

/// Client connection properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyProperties {
    /// Browser or client name
    pub browser: String,
    /// Device type
    pub device: String,
    /// Operating system
    pub os: String,
}

/// Payload for op 6 (Resume)
///
/// Sent by the client to resume a disconnected session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumePayload {
    /// Authentication token
    pub token: String,

    /// Session ID to resume
    pub session_id: String,

    /// Last received sequence number
    pub seq: u64,
}

/// READY dispatch body, reduced to what the session needs
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyPayload {
    /// Session ID for resuming
    pub session_id: String,

    /// Gateway URL for resuming
    pub resume_gateway_url: String,
}
