//! Session identity
//!
//! The three values a dropped connection needs to resume: session id, resume URL,
//! last sequence. Written only from the read loop; the heartbeat task reads the
//! sequence concurrently, hence the atomic.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared, guarded session identity
#[derive(Debug, Default)]
pub struct SessionIdentity {
    session_id: RwLock<String>,
    resume_url: RwLock<String>,
    last_sequence: AtomicU64,
}

/// Point-in-time copy of [`SessionIdentity`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentitySnapshot {
    pub session_id: String,
    pub resume_url: String,
    pub last_sequence: u64,
}

impl SessionIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sequence number seen on any frame; returns the held value afterwards
    ///
    /// The held value never decreases.
    pub fn observe_sequence(&self, sequence: u64) -> u64 {
        self.last_sequence
            .fetch_max(sequence, Ordering::SeqCst)
            .max(sequence)
    }

    #[must_use]
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence.load(Ordering::SeqCst)
    }

    /// Sequence to put in a heartbeat, `None` before any sequenced frame
    #[must_use]
    pub fn heartbeat_sequence(&self) -> Option<u64> {
        match self.last_sequence() {
            0 => None,
            seq => Some(seq),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> String {
        self.session_id.read().clone()
    }

    /// Resume URL, if READY has handed one out
    #[must_use]
    pub fn resume_url(&self) -> Option<String> {
        let url = self.resume_url.read();
        (!url.is_empty()).then(|| url.clone())
    }

    /// Whether a Resume request is valid right now
    #[must_use]
    pub fn can_resume(&self) -> bool {
        !self.session_id.read().is_empty() && self.last_sequence() > 0
    }

    /// Store the identity handed out by READY
    pub(crate) fn establish(&self, session_id: String, resume_url: String) {
        *self.session_id.write() = session_id;
        *self.resume_url.write() = resume_url;
    }

    #[must_use]
    pub fn snapshot(&self) -> IdentitySnapshot {
        IdentitySnapshot {
            session_id: self.session_id(),
            resume_url: self.resume_url.read().clone(),
            last_sequence: self.last_sequence(),
        }
    }
}
