//! Op code handlers
//!
//! Routes each decoded server frame to the handler for its opcode.

mod dispatch;
mod error;
mod heartbeat;
mod hello;
mod identify;
mod invalid_session;
mod reconnect;
mod resume;

pub use dispatch::DispatchHandler;
pub use error::{HandlerError, HandlerResult};
pub use heartbeat::HeartbeatHandler;
pub use hello::HelloHandler;
pub use identify::IdentifyHandler;
pub use invalid_session::InvalidSessionHandler;
pub use reconnect::ReconnectHandler;
pub use resume::ResumeHandler;

use crate::client::GatewayClient;
use crate::protocol::{GatewayMessage, OpCode};

/// What the read loop should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading
    Continue,
    /// Drop the connection and resume on a new one
    Reconnect,
}

/// Routes server frames to handlers
pub struct OpRouter;

impl OpRouter {
    /// Handle one frame, in arrival order
    pub async fn route(client: &GatewayClient, message: GatewayMessage) -> HandlerResult<Flow> {
        if let Some(seq) = message.s {
            client.shared().identity.observe_sequence(seq);
        }

        tracing::trace!(op = %message.op, t = ?message.t, s = ?message.s, "Frame received");

        match message.op {
            OpCode::Dispatch => DispatchHandler::handle(client, message).await?,
            OpCode::Hello => {
                let payload = message.as_hello()?;
                HelloHandler::handle(client, payload).await?;
            }
            OpCode::Heartbeat => HeartbeatHandler::handle_request(client).await?,
            OpCode::HeartbeatAck => HeartbeatHandler::handle_ack(client),
            OpCode::InvalidSession => InvalidSessionHandler::handle(client, &message).await?,
            OpCode::Reconnect => return Ok(ReconnectHandler::handle()),
            _ => client.forward_raw(message).await,
        }

        Ok(Flow::Continue)
    }
}
