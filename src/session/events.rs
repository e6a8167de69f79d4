//! One-shot expired-session signal.
//!
//! The core never navigates; it only raises this signal. The presentation
//! layer (the CLI here, a router in a GUI) subscribes and owns what
//! "go back to login" means. The latch guarantees that a burst of
//! concurrent terminal failures produces a single observable transition.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

/// Broadcast point for the expired-session signal.
pub struct SessionEvents {
    fired: AtomicBool,
    tx: watch::Sender<bool>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            fired: AtomicBool::new(false),
            tx,
        }
    }

    /// Subscribe to the signal. The receiver observes `true` once the
    /// session has expired.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Raise the signal. Returns `true` only for the call that actually
    /// fired it; later (or concurrent) calls are no-ops.
    pub fn notify_expired(&self) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        let _ = self.tx.send(true);
        true
    }

    /// Whether the signal has fired.
    pub fn expired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
