//! Active connection and its writer task
//!
//! One writer task per connection owns the sink. Every outbound frame, heartbeats
//! included, goes through its channel so writes are never interleaved.

use crate::transport::FrameSink;
use crate::protocol::NORMAL_CLOSE;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Outbound channel capacity
pub(crate) const OUTBOUND_BUFFER: usize = 100;

/// Work item for the writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    Close(u16),
}

/// Handle to the connection currently open
#[derive(Debug)]
pub(crate) struct ActiveConnection {
    pub(crate) outbound: mpsc::Sender<Outbound>,
    pub(crate) writer: JoinHandle<()>,
}

impl ActiveConnection {
    pub(crate) fn spawn(sink: Box<dyn FrameSink>) -> Self {
        let (outbound, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let writer = tokio::spawn(run_writer(sink, rx));
        Self { outbound, writer }
    }

    /// Close with `code` and wait for the writer to finish
    pub(crate) async fn shutdown(self, code: u16) {
        if self.outbound.send(Outbound::Close(code)).await.is_err() {
            tracing::trace!("Writer already gone");
        }
        drop(self.outbound);
        if let Err(e) = self.writer.await {
            tracing::warn!(error = %e, "Writer task failed");
        }
    }
}

async fn run_writer(mut sink: Box<dyn FrameSink>, mut rx: mpsc::Receiver<Outbound>) {
    while let Some(frame) = rx.recv().await {
        match frame {
            Outbound::Text(text) => {
                if let Err(e) = sink.send(text).await {
                    tracing::warn!(error = %e, "Failed to write frame");
                    break;
                }
            }
            Outbound::Close(code) => {
                if let Err(e) = sink.close(code).await {
                    tracing::debug!(error = %e, code, "Close did not complete cleanly");
                }
                return;
            }
        }
    }

    // Every sender dropped, or the sink failed
    if let Err(e) = sink.close(NORMAL_CLOSE).await {
        tracing::trace!(error = %e, "Sink already closed");
    }
}
