//! Global request cancellation
//!
//! Exactly one cancellation token is live at any time; every request issued
//! through the client binds to the token that was current when it started.
//! There is no per-request cancel.

use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Cancellation controller shared by all outstanding requests.
///
/// `cancel_all` swaps in a fresh token under the lock before firing the old
/// group, so a request issued right after the call is unaffected even when
/// both happen on the same tick.
#[derive(Debug)]
pub(crate) struct CancelScope {
    current: Mutex<CancellationToken>,
}

impl CancelScope {
    pub(crate) fn new() -> Self {
        Self {
            current: Mutex::new(CancellationToken::new()),
        }
    }

    /// The token binding requests issued from this point on
    pub(crate) fn handle(&self) -> CancellationToken {
        self.current.lock().expect("cancel scope lock poisoned").clone()
    }

    /// Fail every request bound to the current token, then start a fresh group
    pub(crate) fn cancel_all(&self) {
        let previous = {
            let mut current = self.current.lock().expect("cancel scope lock poisoned");
            std::mem::replace(&mut *current, CancellationToken::new())
        };
        previous.cancel();
    }
}

#[cfg(test)]
mod cancel_tests {
    use super::*;

    #[test]
    fn test_handle_is_fresh_after_cancel() {
        let scope = CancelScope::new();
        let before = scope.handle();

        scope.cancel_all();

        assert!(before.is_cancelled());
        assert!(!scope.handle().is_cancelled());
    }

    #[test]
    fn test_repeated_cancel_is_safe() {
        let scope = CancelScope::new();
        scope.cancel_all();
        scope.cancel_all();
        assert!(!scope.handle().is_cancelled());
    }
}
