//! Session engine
//!
//! Lifecycle state, resumable identity, heartbeat scheduling, and the loop that
//! reads frames and reconnects.

mod connection;
mod heartbeat;
mod identity;
mod runner;
mod state;

pub use connection::Outbound;
pub use heartbeat::HeartbeatScheduler;
pub use identity::{IdentitySnapshot, SessionIdentity};
pub use state::SessionState;

pub(crate) use connection::ActiveConnection;
pub(crate) use runner::run;
