//! Invalid session (op 9)

use super::{HandlerResult, IdentifyHandler};
use crate::client::GatewayClient;
use crate::protocol::GatewayMessage;

/// Handles Invalid Session
pub struct InvalidSessionHandler;

impl InvalidSessionHandler {
    /// Wait the reconnect delay, then identify from scratch
    ///
    /// The resumable flag is logged but not acted on, and the held identity is
    /// left untouched.
    pub async fn handle(client: &GatewayClient, message: &GatewayMessage) -> HandlerResult<()> {
        let resumable = message.d.as_bool().unwrap_or(false);
        tracing::warn!(resumable, "Session invalidated by gateway");

        if !client.backoff().await {
            tracing::debug!("Shutdown during invalid-session backoff");
            return Ok(());
        }

        IdentifyHandler::send(client).await
    }
}
