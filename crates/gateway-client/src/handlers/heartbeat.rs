//! Heartbeat request (op 1) and acknowledgement (op 11)

use super::HandlerResult;
use crate::client::GatewayClient;
use crate::protocol::OutboundMessage;

/// Handles server-side heartbeat traffic
pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// The server asked for a heartbeat now
    pub async fn handle_request(client: &GatewayClient) -> HandlerResult<()> {
        let sequence = client.shared().identity.heartbeat_sequence();
        tracing::debug!(seq = ?sequence, "Heartbeat requested by server");

        client
            .send_message(&OutboundMessage::heartbeat(sequence))
            .await?;
        Ok(())
    }

    pub fn handle_ack(client: &GatewayClient) {
        tracing::trace!("Heartbeat acknowledged");
        client.shared().heartbeat.ack();
    }
}
