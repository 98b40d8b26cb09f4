//! WebSocket transport over `tokio-tungstenite`

use super::{Connector, FrameSink, FrameStream, Inbound, TransportError, TransportResult};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, WebSocketConfig};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async_with_config, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens `ws://` / `wss://` connections
#[derive(Debug, Clone)]
pub struct WsConnector {
    max_message_size: usize,
}

impl WsConnector {
    #[must_use]
    pub fn new(max_message_size: usize) -> Self {
        Self { max_message_size }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> TransportResult<(Box<dyn FrameSink>, Box<dyn FrameStream>)> {
        let mut config = WebSocketConfig::default();
        config.max_message_size = Some(self.max_message_size);

        let (socket, response) = connect_async_with_config(url, Some(config), false)
            .await
            .map_err(|e| TransportError::Connect {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(url = %url, status = %response.status(), "WebSocket connected");

        let (sink, stream) = socket.split();
        Ok((Box::new(WsSink { sink }), Box::new(WsStream { stream })))
    }
}

struct WsSink {
    sink: SplitSink<Socket, Message>,
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send(&mut self, text: String) -> TransportResult<()> {
        self.sink.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn close(&mut self, code: u16) -> TransportResult<()> {
        let frame = CloseFrame {
            code: WsCloseCode::from(code),
            reason: "".into(),
        };
        // The peer may already be gone; shutting the sink is what matters
        if let Err(e) = self.sink.send(Message::Close(Some(frame))).await {
            tracing::trace!(error = %e, "Close frame not delivered");
        }
        self.sink.close().await?;
        Ok(())
    }
}

struct WsStream {
    stream: SplitStream<Socket>,
}

#[async_trait]
impl FrameStream for WsStream {
    async fn receive(&mut self) -> Inbound {
        while let Some(msg) = self.stream.next().await {
            match msg {
                Ok(Message::Text(text)) => return Inbound::Text(text),
                Ok(Message::Close(frame)) => {
                    return Inbound::Closed(frame.map(|f| u16::from(f.code)));
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!("Binary frames not supported, dropping");
                }
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "WebSocket error");
                    return Inbound::Closed(None);
                }
            }
        }
        Inbound::Closed(None)
    }
}
