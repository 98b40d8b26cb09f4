//! Heartbeat scheduler
//!
//! At most one heartbeat task exists per client. Starting a new one aborts the
//! previous task first, so a reconnect never leaves two timers beating.

use super::connection::Outbound;
use super::identity::SessionIdentity;
use crate::protocol::OutboundMessage;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Owns the periodic heartbeat task
#[derive(Debug, Default)]
pub struct HeartbeatScheduler {
    task: Mutex<Option<JoinHandle<()>>>,
    acked: Arc<AtomicBool>,
}

impl HeartbeatScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start beating every `interval`, replacing any running task
    ///
    /// The first heartbeat goes out immediately. Each one carries the identity's
    /// latest sequence at the moment it is sent.
    pub fn start(
        &self,
        interval: Duration,
        outbound: mpsc::Sender<Outbound>,
        identity: Arc<SessionIdentity>,
    ) {
        let mut task = self.task.lock();
        if let Some(previous) = task.take() {
            previous.abort();
        }

        self.acked.store(true, Ordering::SeqCst);
        let acked = self.acked.clone();

        tracing::debug!(interval_ms = interval.as_millis(), "Starting heartbeat");

        *task = Some(tokio::spawn(async move {
            loop {
                if !acked.swap(false, Ordering::SeqCst) {
                    tracing::warn!("Previous heartbeat was not acknowledged");
                }

                let sequence = identity.heartbeat_sequence();
                match OutboundMessage::heartbeat(sequence).to_json() {
                    Ok(text) => {
                        if outbound.send(Outbound::Text(text)).await.is_err() {
                            tracing::debug!("Connection gone, heartbeat stopping");
                            return;
                        }
                        tracing::trace!(seq = ?sequence, "Heartbeat sent");
                    }
                    Err(e) => tracing::warn!(error = %e, "Failed to encode heartbeat"),
                }

                tokio::time::sleep(interval).await;
            }
        }));
    }

    /// Stop the running task, if any
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
            tracing::debug!("Heartbeat stopped");
        }
    }

    /// Whether a heartbeat task is live
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Record a heartbeat acknowledgement
    pub fn ack(&self) {
        self.acked.store(true, Ordering::SeqCst);
    }

    /// Whether the last heartbeat sent has been acknowledged
    #[must_use]
    pub fn is_acked(&self) -> bool {
        self.acked.load(Ordering::SeqCst)
    }
}

impl Drop for HeartbeatScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}
