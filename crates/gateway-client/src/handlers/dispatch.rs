//! Dispatch handler (op 0)

use super::HandlerResult;
use crate::client::GatewayClient;
use crate::events::GatewayEventType;
use crate::protocol::GatewayMessage;
use crate::session::SessionState;
use gateway_common::GATEWAY_QUERY;

/// Handles dispatch events
pub struct DispatchHandler;

impl DispatchHandler {
    /// Apply session-level effects of READY / RESUMED, then notify subscribers
    ///
    /// Subscribers see the frame even when its READY body is malformed; the
    /// payload error is returned after they have run.
    pub async fn handle(client: &GatewayClient, message: GatewayMessage) -> HandlerResult<()> {
        let event = message.t.as_deref().and_then(GatewayEventType::parse);

        let outcome = match event {
            Some(GatewayEventType::Ready) => Self::establish(client, &message),
            Some(GatewayEventType::Resumed) => {
                tracing::info!(seq = ?message.s, "Session resumed");
                client.set_state(SessionState::Ready);
                Ok(())
            }
            _ => Ok(()),
        };

        let delivered = client.shared().events.dispatch(client, &message).await;
        tracing::trace!(event = ?message.t, delivered, "Dispatched");
        outcome
    }

    fn establish(client: &GatewayClient, message: &GatewayMessage) -> HandlerResult<()> {
        let ready = message.as_ready()?;
        let resume_url = resume_url_for(&ready.resume_gateway_url);
        tracing::info!(
            session_id = %ready.session_id,
            resume_url = %resume_url,
            "Session ready"
        );
        client
            .shared()
            .identity
            .establish(ready.session_id, resume_url);
        client.set_state(SessionState::Ready);
        Ok(())
    }
}

/// Resume URL with the gateway query appended
pub(crate) fn resume_url_for(base: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), GATEWAY_QUERY)
}
