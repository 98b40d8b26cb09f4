//! In-process transport
//!
//! Every `connect` hands a [`MemoryPeer`] to whoever holds the receiver returned
//! by [`MemoryConnector::new`]. The peer plays the server: it pushes inbound frames
//! and observes what the client sent. Connects can be refused on demand to
//! exercise reconnect retries.

use super::{Connector, FrameSink, FrameStream, Inbound, TransportError, TransportResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// Frame written by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentFrame {
    Text(String),
    Close(u16),
}

impl SentFrame {
    /// Parse a text frame as JSON
    #[must_use]
    pub fn json(&self) -> Option<Value> {
        match self {
            Self::Text(text) => serde_json::from_str(text).ok(),
            Self::Close(_) => None,
        }
    }

    /// Opcode of a text frame
    #[must_use]
    pub fn op(&self) -> Option<i64> {
        self.json().and_then(|v| v["op"].as_i64())
    }
}

/// Server side of one in-memory connection
#[derive(Debug)]
pub struct MemoryPeer {
    pub url: String,
    to_client: mpsc::UnboundedSender<Inbound>,
    from_client: mpsc::UnboundedReceiver<SentFrame>,
}

impl MemoryPeer {
    /// Deliver a text frame to the client
    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.to_client.send(Inbound::Text(text.into()));
    }

    /// Deliver a JSON frame to the client
    pub fn send_json(&self, value: &Value) {
        self.send_text(value.to_string());
    }

    /// Drop the connection from the server side
    pub fn close(&self, code: Option<u16>) {
        let _ = self.to_client.send(Inbound::Closed(code));
    }

    /// Next frame written by the client; `None` once the client side is gone
    pub async fn next_sent(&mut self) -> Option<SentFrame> {
        self.from_client.recv().await
    }

    /// Next client frame that is not a heartbeat
    pub async fn next_non_heartbeat(&mut self) -> Option<SentFrame> {
        loop {
            let frame = self.from_client.recv().await?;
            if frame.op() != Some(1) {
                return Some(frame);
            }
        }
    }

    /// Frames already written and not yet read
    pub fn drain_sent(&mut self) -> Vec<SentFrame> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.from_client.try_recv() {
            frames.push(frame);
        }
        frames
    }
}

/// Connector producing in-memory connections
#[derive(Debug)]
pub struct MemoryConnector {
    peers: mpsc::UnboundedSender<MemoryPeer>,
    urls: Mutex<Vec<String>>,
    /// Number of upcoming connects to refuse
    refusals: AtomicUsize,
}

impl MemoryConnector {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MemoryPeer>) {
        let (peers, rx) = mpsc::unbounded_channel();
        (
            Self {
                peers,
                urls: Mutex::new(Vec::new()),
                refusals: AtomicUsize::new(0),
            },
            rx,
        )
    }

    /// URLs of every connect attempt so far, refused ones included, in order
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }

    /// Refuse the next `count` connects
    pub fn refuse_next(&self, count: usize) {
        self.refusals.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, url: &str) -> TransportResult<(Box<dyn FrameSink>, Box<dyn FrameStream>)> {
        self.urls.lock().push(url.to_string());

        let refused = self
            .refusals
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(TransportError::Connect {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            });
        }

        let (to_client, inbound) = mpsc::unbounded_channel();
        let (sent, from_client) = mpsc::unbounded_channel();

        let peer = MemoryPeer {
            url: url.to_string(),
            to_client,
            from_client,
        };
        self.peers.send(peer).map_err(|_| TransportError::Connect {
            url: url.to_string(),
            reason: "no server listening".to_string(),
        })?;

        Ok((
            Box::new(MemorySink { sent: Some(sent) }),
            Box::new(MemoryStream { inbound }),
        ))
    }
}

struct MemorySink {
    sent: Option<mpsc::UnboundedSender<SentFrame>>,
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send(&mut self, text: String) -> TransportResult<()> {
        let sent = self.sent.as_ref().ok_or(TransportError::Closed)?;
        sent.send(SentFrame::Text(text))
            .map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self, code: u16) -> TransportResult<()> {
        // Dropping the sender ends the peer's `next_sent` stream
        let sent = self.sent.take().ok_or(TransportError::Closed)?;
        sent.send(SentFrame::Close(code))
            .map_err(|_| TransportError::Closed)
    }
}

struct MemoryStream {
    inbound: mpsc::UnboundedReceiver<Inbound>,
}

#[async_trait]
impl FrameStream for MemoryStream {
    async fn receive(&mut self) -> Inbound {
        self.inbound.recv().await.unwrap_or(Inbound::Closed(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_round_trip() {
        let (connector, mut peers) = MemoryConnector::new();
        let (mut sink, mut stream) = connector.connect("mem://one").await.unwrap();
        let mut peer = peers.recv().await.unwrap();

        assert_eq!(peer.url, "mem://one");
        assert_eq!(connector.urls(), vec!["mem://one".to_string()]);

        peer.send_text("hello");
        assert_eq!(stream.receive().await, Inbound::Text("hello".to_string()));

        sink.send(r#"{"op":1,"d":null}"#.to_string()).await.unwrap();
        let frame = peer.next_sent().await.unwrap();
        assert_eq!(frame.op(), Some(1));

        sink.close(1000).await.unwrap();
        assert_eq!(peer.next_sent().await, Some(SentFrame::Close(1000)));
        assert_eq!(peer.next_sent().await, None);
        assert!(sink.send("late".to_string()).await.is_err());
    }

    #[tokio::test]
    async fn test_peer_drop_ends_stream() {
        let (connector, mut peers) = MemoryConnector::new();
        let (_sink, mut stream) = connector.connect("mem://two").await.unwrap();
        let peer = peers.recv().await.unwrap();

        peer.close(Some(4000));
        assert_eq!(stream.receive().await, Inbound::Closed(Some(4000)));

        drop(peer);
        assert_eq!(stream.receive().await, Inbound::Closed(None));
    }

    #[tokio::test]
    async fn test_refused_connects() {
        let (connector, mut peers) = MemoryConnector::new();
        connector.refuse_next(2);

        for _ in 0..2 {
            assert!(matches!(
                connector.connect("mem://three").await,
                Err(TransportError::Connect { .. })
            ));
        }
        assert!(peers.try_recv().is_err());

        assert!(connector.connect("mem://three").await.is_ok());
        assert_eq!(peers.recv().await.unwrap().url, "mem://three");
        assert_eq!(connector.urls().len(), 3);
    }
}
