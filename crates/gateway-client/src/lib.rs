//! # gateway-client
//!
//! Client-side session engine for the Discord real-time gateway: frame codec,
//! transport, heartbeat scheduling, resumable session state, and event dispatch.

pub mod auth;
pub mod client;
pub mod error;
pub mod events;
pub mod handlers;
pub mod protocol;
pub mod session;
pub mod transport;

pub use client::{CloseCallback, GatewayClient};
pub use error::{ClientError, ClientResult};
pub use events::GatewayEventType;
pub use protocol::{GatewayMessage, OpCode, Presence};
pub use session::SessionState;
