//! Reconnect request (op 7)

use super::Flow;

/// Handles Reconnect
pub struct ReconnectHandler;

impl ReconnectHandler {
    /// Hand the connection back to the session loop for a resume cycle
    #[must_use]
    pub fn handle() -> Flow {
        tracing::info!("Gateway requested reconnect");
        Flow::Reconnect
    }
}
