//! Single-flight token refresh gate
//!
//! At most one refresh call may be outstanding at a time. The first request
//! to classify a failure as session-expiry becomes the leader and performs
//! the refresh; requests failing while it runs enqueue a waiter and are
//! resolved, in FIFO order, when the refresh settles.
//!
//! Draining is enforced by the type system rather than by convention: the
//! leader holds a [`RefreshLease`] whose consuming `complete` publishes the
//! outcome exactly once, and whose `Drop` rejects the queue if the leader
//! never settled (panic, timeout bypass, or cancellation mid-refresh). Both
//! paths clear the queue and return the latch to idle.

use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::warn;

/// Outcome delivered to queued waiters: the fresh ID token, or the refresh
/// failure message.
pub(crate) type RefreshOutcome = std::result::Result<String, String>;

#[derive(Debug, Default)]
struct GateState {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// The IDLE/REFRESHING latch plus the pending-request queue
#[derive(Debug, Default)]
pub(crate) struct RefreshGate {
    state: Mutex<GateState>,
}

/// How a failing request enters the gate
pub(crate) enum Entry {
    /// Gate was idle: this request performs the refresh and settles the lease
    Leader(RefreshLease),
    /// A refresh is already in flight: await its outcome
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshGate {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn begin(self: &Arc<Self>) -> Entry {
        let mut state = self.state.lock().expect("refresh gate lock poisoned");
        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            Entry::Waiter(rx)
        } else {
            state.refreshing = true;
            Entry::Leader(RefreshLease {
                gate: Arc::clone(self),
                settled: false,
            })
        }
    }

    /// Publish the outcome: reset the latch, take the queue, resolve it in
    /// enqueue order. Waiters whose request was dropped meanwhile are skipped
    /// by the closed oneshot.
    fn settle(&self, outcome: &RefreshOutcome) {
        let waiters = {
            let mut state = self.state.lock().expect("refresh gate lock poisoned");
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }

    #[cfg(test)]
    fn is_refreshing(&self) -> bool {
        self.state.lock().expect("refresh gate lock poisoned").refreshing
    }

    #[cfg(test)]
    fn queued(&self) -> usize {
        self.state.lock().expect("refresh gate lock poisoned").waiters.len()
    }
}

/// Held by the leader for the duration of the refresh call
pub(crate) struct RefreshLease {
    gate: Arc<RefreshGate>,
    settled: bool,
}

impl RefreshLease {
    /// Settle the refresh: drains every queued waiter in FIFO order, clears
    /// the queue, and returns the gate to idle.
    pub(crate) fn complete(mut self, outcome: RefreshOutcome) {
        self.settled = true;
        self.gate.settle(&outcome);
    }
}

impl Drop for RefreshLease {
    fn drop(&mut self) {
        if !self.settled {
            warn!("refresh leader dropped before settling, rejecting queued requests");
            self.gate.settle(&Err("token refresh aborted".to_string()));
        }
    }
}
