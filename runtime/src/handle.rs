//! Completion tracking for the effects started by one action.

use crate::StoreError;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;

/// Awaitable view of the effects started by one [`Store::send`](crate::Store::send)
///
/// An effect counts as settled once the action it produced (if any) has been
/// reduced. Clones observe the same effects.
#[derive(Clone)]
pub struct EffectHandle {
    pending: Arc<AtomicUsize>,
    settled: watch::Receiver<()>,
}

/// Write side of an [`EffectHandle`], carried into spawned effect tasks
#[derive(Clone)]
pub(crate) struct EffectTracker {
    pending: Arc<AtomicUsize>,
    settled: watch::Sender<()>,
}

impl EffectHandle {
    pub(crate) fn new() -> (Self, EffectTracker) {
        let pending = Arc::new(AtomicUsize::new(0));
        let (settled_tx, settled_rx) = watch::channel(());

        (
            Self {
                pending: Arc::clone(&pending),
                settled: settled_rx,
            },
            EffectTracker {
                pending,
                settled: settled_tx,
            },
        )
    }

    /// Effects that have not settled yet
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Wait until every effect has settled
    pub async fn wait(&mut self) {
        while self.pending() > 0 {
            // Err means every tracker is gone, so nothing is left to settle.
            if self.settled.changed().await.is_err() {
                break;
            }
        }
    }

    /// [`EffectHandle::wait`] with a deadline
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if effects are still pending after
    /// `timeout`.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Counts one spawned task against its action's handle and the store-wide
/// in-flight total for as long as it lives
///
/// Dropping the guard (normally or while unwinding) releases both counts.
pub(crate) struct TaskGuard {
    tracker: EffectTracker,
    in_flight: Arc<AtomicUsize>,
}

impl TaskGuard {
    pub(crate) fn enter(tracker: &EffectTracker, in_flight: &Arc<AtomicUsize>) -> Self {
        tracker.pending.fetch_add(1, Ordering::SeqCst);
        in_flight.fetch_add(1, Ordering::SeqCst);

        Self {
            tracker: tracker.clone(),
            in_flight: Arc::clone(in_flight),
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.tracker.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.tracker.settled.send(());
        }
    }
}
