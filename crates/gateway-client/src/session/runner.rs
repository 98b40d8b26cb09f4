//! Session loop
//!
//! Owns the read half of the current connection. Frames are handled strictly in
//! arrival order. When the connection drops the loop either resumes on a new
//! connection or shuts the client down, depending on the close code.

use crate::client::GatewayClient;
use crate::handlers::{Flow, OpRouter};
use crate::protocol::{CloseCode, GatewayMessage, NORMAL_CLOSE};
use crate::session::SessionState;
use crate::transport::{FrameStream, Inbound};

/// Close code sent when we drop a connection we intend to resume
const RESUME_CLOSE: u16 = 4000;

#[derive(Debug, PartialEq, Eq)]
enum ReadOutcome {
    /// Local shutdown
    Shutdown,
    /// Server asked us to reconnect
    Reconnect,
    /// Connection ended with this close code
    Closed(Option<u16>),
}

/// Drive the session until shutdown
pub(crate) async fn run(client: GatewayClient, mut stream: Box<dyn FrameStream>) {
    loop {
        match read_frames(&client, stream.as_mut()).await {
            ReadOutcome::Shutdown => {
                client.teardown(NORMAL_CLOSE).await;
                break;
            }
            ReadOutcome::Reconnect => {
                client.teardown(RESUME_CLOSE).await;
                client.set_state(SessionState::Disconnected);
            }
            ReadOutcome::Closed(code) if CloseCode::is_resumable_code(code) => {
                tracing::info!(code = ?code, "Connection dropped, will resume");
                client.teardown(NORMAL_CLOSE).await;
                client.set_state(SessionState::Disconnected);
            }
            ReadOutcome::Closed(code) => {
                let reason = code
                    .and_then(CloseCode::from_u16)
                    .map_or("no close code", CloseCode::description);
                tracing::warn!(code = ?code, reason, "Connection closed, shutting down");
                client.teardown(NORMAL_CLOSE).await;
                client.shutdown_after_disconnect().await;
                break;
            }
        }

        match reconnect(&client).await {
            Some(next) => stream = next,
            None => break,
        }
    }

    tracing::debug!("Session loop finished");
}

/// Back off and reopen until a connection succeeds or shutdown begins
async fn reconnect(client: &GatewayClient) -> Option<Box<dyn FrameStream>> {
    loop {
        if !client.backoff().await {
            return None;
        }
        match client.open_transport().await {
            Ok(stream) => return Some(stream),
            Err(e) => {
                tracing::warn!(error = %e, "Reconnect failed, retrying");
                client.set_state(SessionState::Disconnected);
            }
        }
    }
}

async fn read_frames(client: &GatewayClient, stream: &mut dyn FrameStream) -> ReadOutcome {
    let mut shutdown = client.shared().shutdown.subscribe();

    loop {
        let inbound = tokio::select! {
            biased;
            _ = shutdown.wait_for(|done| *done) => return ReadOutcome::Shutdown,
            inbound = stream.receive() => inbound,
        };

        let text = match inbound {
            Inbound::Text(text) => text,
            Inbound::Closed(_) if client.is_closing() => return ReadOutcome::Shutdown,
            Inbound::Closed(code) => return ReadOutcome::Closed(code),
        };

        let message = match GatewayMessage::from_json(&text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping undecodable frame");
                continue;
            }
        };

        let op = message.op;
        match OpRouter::route(client, message).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Reconnect) => return ReadOutcome::Reconnect,
            Err(e) => tracing::warn!(op = %op, error = %e, "Handler failed"),
        }
    }
}
