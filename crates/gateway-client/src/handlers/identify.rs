//! Identify (op 2)

use super::HandlerResult;
use crate::client::GatewayClient;
use crate::protocol::{IdentifyPayload, OutboundMessage};
use crate::session::SessionState;

/// Sends Identify
pub struct IdentifyHandler;

impl IdentifyHandler {
    /// Send a fresh Identify and move to `Identifying`
    pub async fn send(client: &GatewayClient) -> HandlerResult<()> {
        let payload = IdentifyPayload::new(client.token(), &client.config().identify);
        client.set_state(SessionState::Identifying);
        client.send_message(&OutboundMessage::identify(payload)).await?;

        tracing::info!("Identify sent");
        Ok(())
    }
}
