//! Resume (op 6)

use super::HandlerResult;
use crate::client::GatewayClient;
use crate::protocol::{OutboundMessage, ResumePayload};
use crate::session::SessionState;

/// Sends Resume
pub struct ResumeHandler;

impl ResumeHandler {
    /// Send Resume with the held session id and sequence, then move to `Resuming`
    pub async fn send(client: &GatewayClient) -> HandlerResult<()> {
        let identity = &client.shared().identity;
        let payload = ResumePayload {
            token: client.token().to_string(),
            session_id: identity.session_id(),
            seq: identity.last_sequence(),
        };

        tracing::info!(
            session_id = %payload.session_id,
            seq = payload.seq,
            "Resuming session"
        );

        client.set_state(SessionState::Resuming);
        client.send_message(&OutboundMessage::resume(payload)).await?;
        Ok(())
    }
}
