//! Hello handler (op 10)

use super::{HandlerError, HandlerResult, IdentifyHandler, ResumeHandler};
use crate::client::GatewayClient;
use crate::protocol::HelloPayload;
use std::time::Duration;

/// Handles Hello
pub struct HelloHandler;

impl HelloHandler {
    /// Resume if the identity allows it, otherwise identify; then (re)start heartbeating
    pub async fn handle(client: &GatewayClient, payload: HelloPayload) -> HandlerResult<()> {
        if payload.heartbeat_interval == 0 {
            return Err(HandlerError::InvalidPayload(
                "heartbeat_interval must be positive".to_string(),
            ));
        }

        tracing::debug!(
            heartbeat_interval = payload.heartbeat_interval,
            "Hello received"
        );

        let shared = client.shared();
        if shared.identity.can_resume() {
            ResumeHandler::send(client).await?;
        } else {
            IdentifyHandler::send(client).await?;
        }

        shared.heartbeat.start(
            Duration::from_millis(payload.heartbeat_interval),
            client.outbound()?,
            shared.identity.clone(),
        );
        Ok(())
    }
}
