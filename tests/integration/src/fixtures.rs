//! Test fixtures
//!
//! Canned gateway frames and API bodies shared by the integration tests.

use serde::Deserialize;
use serde_json::{json, Value};

pub const TEST_TOKEN: &str = "integration-token";
pub const SESSION_ID: &str = "sess-1";
pub const HEARTBEAT_INTERVAL_MS: u64 = 45_000;

pub const PLAIN_EMAIL: &str = "plain@example.com";
pub const MFA_EMAIL: &str = "mfa@example.com";
pub const PASSWORD: &str = "TestPass123!";
pub const MFA_TICKET: &str = "ticket-1";
pub const MFA_CODE: &str = "123456";
pub const PLAIN_TOKEN: &str = "token-plain";
pub const MFA_TOKEN: &str = "token-mfa";

pub fn hello() -> Value {
    json!({"op": 10, "d": {"heartbeat_interval": HEARTBEAT_INTERVAL_MS}})
}

/// READY pointing resumes at `resume_base`
pub fn ready(seq: u64, resume_base: &str) -> Value {
    json!({
        "op": 0,
        "t": "READY",
        "s": seq,
        "d": {
            "session_id": SESSION_ID,
            "resume_gateway_url": resume_base,
            "user": {"username": "tester"}
        }
    })
}

pub fn message_create(seq: u64, content: &str) -> Value {
    json!({"op": 0, "t": "MESSAGE_CREATE", "s": seq, "d": {"content": content}})
}

pub fn resumed(seq: u64) -> Value {
    json!({"op": 0, "t": "RESUMED", "s": seq, "d": {}})
}

pub fn heartbeat_ack() -> Value {
    json!({"op": 11})
}

/// Body posted to `/auth/login`
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// Body posted to `/auth/mfa/totp`
#[derive(Debug, Deserialize)]
pub struct MfaBody {
    pub ticket: String,
    pub code: String,
}
