//! Event bus implementation
//!
//! Fan-out is broadcast-based: every subscriber gets every event, and
//! emitting with no subscribers is a no-op rather than an error.

use crate::types::ErrorEvent;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Buffered events per subscriber before lagging drops the oldest
const CHANNEL_CAPACITY: usize = 32;

/// Process-wide event channel between the client and the embedding UI.
///
/// The client publishes two events: a structured error event for display,
/// and a payload-less logout event that is the only mechanism by which it
/// tears down a session. Clearing storage and navigating are reactions the
/// embedder wires up on the logout side.
#[derive(Debug, Clone)]
pub struct EventBus {
    errors: broadcast::Sender<ErrorEvent>,
    logout: broadcast::Sender<()>,
}

impl EventBus {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        let (errors, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (logout, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { errors, logout }
    }

    /// Whether anyone is listening for error events.
    ///
    /// Checked before emitting so an unobserved failure costs nothing.
    pub fn has_error_listeners(&self) -> bool {
        self.errors.receiver_count() > 0
    }

    /// Subscribe to error events
    pub fn subscribe_errors(&self) -> broadcast::Receiver<ErrorEvent> {
        self.errors.subscribe()
    }

    /// Subscribe to the logout event
    pub fn subscribe_logout(&self) -> broadcast::Receiver<()> {
        self.logout.subscribe()
    }

    /// Publish an error event to all current subscribers
    pub fn emit_error(&self, event: ErrorEvent) {
        if !self.has_error_listeners() {
            debug!(status = event.status, "error event dropped, no listeners");
            return;
        }
        let _ = self.errors.send(event);
    }

    /// Publish the logout event
    pub fn emit_logout(&self) {
        info!("logout event emitted");
        let _ = self.logout.send(());
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
