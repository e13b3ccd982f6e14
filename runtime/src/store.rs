//! The [`Store`]: owns state, runs the reducer, executes effects.

use crate::StoreError;
use crate::handle::{EffectHandle, EffectTracker, TaskGuard};
use auth_store_core::{effect::Effect, reducer::Reducer};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{RwLock, oneshot};

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A caller of [`Store::send_and_wait_for`] still waiting for its answer
struct Waiter<A> {
    matches: Box<dyn Fn(&A) -> bool + Send>,
    reply: oneshot::Sender<A>,
}

/// Runtime for one reducer
///
/// - State sits behind a `RwLock`; the reducer runs under the write lock, so
///   concurrent `send` calls are applied one at a time.
/// - Each returned effect is spawned on tokio. Whatever action it yields is
///   reduced and then handed to the waiters it answers.
/// - Effects are never cancelled. Overlapping requests settle in whatever
///   order their futures complete.
///
/// Clones share state, environment and in-flight bookkeeping.
///
/// # Type Parameters
///
/// - `S`: State
/// - `A`: Action
/// - `E`: Environment handed to the reducer
/// - `R`: Reducer
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    closing: Arc<AtomicBool>,
    in_flight: Arc<AtomicUsize>,
    waiters: Arc<Mutex<Vec<Waiter<A>>>>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Clone + Send + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a store
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            closing: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            waiters: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Refuse new actions, then wait for running effects to settle
    ///
    /// Effects that were already running still feed their actions back.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] with the number of effects
    /// still running when `timeout` expires.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("Store shutting down");
        metrics::counter!("store.shutdown.initiated").increment(1);

        self.closing.store(true, Ordering::Release);

        let drained = tokio::time::timeout(timeout, async {
            while self.in_flight.load(Ordering::Acquire) > 0 {
                tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
            }
        })
        .await;

        if drained.is_err() {
            let pending = self.in_flight.load(Ordering::Acquire);
            tracing::error!(pending_effects = pending, "Shutdown timed out");
            metrics::counter!("store.shutdown.timeout").increment(1);
            return Err(StoreError::ShutdownTimeout(pending));
        }

        tracing::info!("All effects settled");
        Ok(())
    }

    /// Reduce `action` and start its effects
    ///
    /// Returns as soon as the effects are spawned. Await the returned
    /// [`EffectHandle`], or use [`Store::send_and_wait_for`], to observe
    /// their outcome.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once `shutdown` was called.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        if self.closing.load(Ordering::Acquire) {
            tracing::warn!("Rejected action: store is shutting down");
            metrics::counter!("store.shutdown.rejected_actions").increment(1);
            return Err(StoreError::ShutdownInProgress);
        }

        metrics::counter!("store.commands.total").increment(1);
        Ok(self.dispatch(action).await)
    }

    /// Send a request and wait for the fed-back action that answers it
    ///
    /// The waiter is registered before `action` is sent, so a fast effect
    /// cannot be missed, and each waiter gets its own reply channel, so any
    /// number of other outcomes may settle first. The returned action has
    /// already been reduced.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ShutdownInProgress`]: the store is shutting down
    /// - [`StoreError::Timeout`]: nothing matched `predicate` within `timeout`
    /// - [`StoreError::ChannelClosed`]: the store went away before answering
    pub async fn send_and_wait_for<F>(&self, action: A, predicate: F, timeout: Duration) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool + Send + 'static,
    {
        let (reply, answer) = oneshot::channel();
        self.lock_waiters().push(Waiter {
            matches: Box::new(predicate),
            reply,
        });

        // On error the receiver drops here and the waiter is pruned later.
        self.send(action).await?;

        match tokio::time::timeout(timeout, answer).await {
            Ok(Ok(action)) => Ok(action),
            Ok(Err(_)) => Err(StoreError::ChannelClosed),
            Err(_) => Err(StoreError::Timeout),
        }
    }

    /// Read state through a closure
    ///
    /// ```ignore
    /// let loading = store.state(|s| s.is_loading()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        f(&*self.state.read().await)
    }

    fn lock_waiters(&self) -> MutexGuard<'_, Vec<Waiter<A>>> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reduce and start effects regardless of shutdown
    async fn dispatch(&self, action: A) -> EffectHandle {
        let (handle, tracker) = EffectHandle::new();

        let effects = {
            let mut state = self.state.write().await;
            let _span = tracing::debug_span!("reducer_execution").entered();
            self.reducer.reduce(&mut state, action, &self.environment)
        };
        tracing::trace!(count = effects.len(), "Reducer returned effects");

        for effect in effects {
            self.run_effect(effect, &tracker);
        }
        handle
    }

    /// Feed an effect's action back into the reducer, then answer waiters
    ///
    /// Bypasses the shutdown check so effects that were already running
    /// still settle.
    async fn feed_back(&self, action: A) {
        let _ = self.dispatch(action.clone()).await;
        self.answer_waiters(&action);
    }

    fn answer_waiters(&self, action: &A) {
        let mut waiters = self.lock_waiters();
        let mut still_waiting = Vec::with_capacity(waiters.len());

        for waiter in waiters.drain(..) {
            if waiter.reply.is_closed() {
                continue;
            }
            if (waiter.matches)(action) {
                let _ = waiter.reply.send(action.clone());
            } else {
                still_waiting.push(waiter);
            }
        }
        *waiters = still_waiting;
    }

    fn spawn<F>(&self, tracker: &EffectTracker, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let guard = TaskGuard::enter(tracker, &self.in_flight);
        tokio::spawn(async move {
            let _guard = guard;
            task.await;
        });
    }

    fn run_effect(&self, effect: Effect<A>, tracker: &EffectTracker) {
        match effect {
            Effect::None => {
                metrics::counter!("store.effects.executed", "type" => "none").increment(1);
            },
            Effect::Future(fut) => {
                metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                let store = self.clone();
                self.spawn(tracker, async move {
                    match fut.await {
                        Some(action) => store.feed_back(action).await,
                        None => tracing::trace!("Effect::Future produced no action"),
                    }
                });
            },
        }
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            closing: Arc::clone(&self.closing),
            in_flight: Arc::clone(&self.in_flight),
            waiters: Arc::clone(&self.waiters),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use auth_store_core::{SmallVec, smallvec};

    /// Requests that settle after a delay, recorded in settle order
    #[derive(Debug, Default)]
    struct Ledger {
        started: u32,
        settled: Vec<&'static str>,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Msg {
        Start(&'static str, u64),
        Settle(&'static str),
        Silent,
        Quiet,
    }

    #[derive(Debug, Clone)]
    struct LedgerReducer;

    impl Reducer for LedgerReducer {
        type State = Ledger;
        type Action = Msg;
        type Environment = ();

        fn reduce(&self, state: &mut Ledger, action: Msg, _env: &()) -> SmallVec<[Effect<Msg>; 4]> {
            match action {
                Msg::Start(label, millis) => {
                    state.started += 1;
                    smallvec![Effect::future(async move {
                        tokio::time::sleep(Duration::from_millis(millis)).await;
                        Some(Msg::Settle(label))
                    })]
                },
                Msg::Settle(label) => {
                    state.settled.push(label);
                    smallvec![Effect::None]
                },
                Msg::Silent => smallvec![Effect::future(async { None })],
                Msg::Quiet => smallvec![Effect::None],
            }
        }
    }

    fn store() -> Store<Ledger, Msg, (), LedgerReducer> {
        Store::new(Ledger::default(), LedgerReducer, ())
    }

    #[tokio::test]
    async fn test_future_effect_feeds_back() {
        let store = store();

        let mut handle = store.send(Msg::Start("login", 0)).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        assert_eq!(store.state(|s| s.settled.clone()).await, vec!["login"]);
        assert_eq!(handle.pending(), 0);
    }

    #[tokio::test]
    async fn test_future_without_action_still_settles() {
        let store = store();

        let mut handle = store.send(Msg::Silent).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        assert!(store.state(|s| s.settled.is_empty()).await);
    }

    #[tokio::test]
    async fn test_overlapping_requests_settle_in_completion_order() {
        let store = store();

        let mut slow = store.send(Msg::Start("slow", 30)).await.unwrap();
        let mut fast = store.send(Msg::Start("fast", 0)).await.unwrap();
        slow.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        fast.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        assert_eq!(store.state(|s| s.settled.clone()).await, vec!["fast", "slow"]);
        assert_eq!(store.state(|s| s.started).await, 2);
    }

    #[tokio::test]
    async fn test_send_and_wait_for_sees_reduced_state() {
        let store = store();

        let outcome = store
            .send_and_wait_for(
                Msg::Start("profile", 5),
                |a| *a == Msg::Settle("profile"),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(outcome, Msg::Settle("profile"));
        assert_eq!(store.state(|s| s.settled.clone()).await, vec!["profile"]);
    }

    #[tokio::test]
    async fn test_send_and_wait_for_skips_other_requests() {
        let store = store();
        let _ = store.send(Msg::Start("other", 0)).await.unwrap();

        let outcome = store
            .send_and_wait_for(
                Msg::Start("mine", 10),
                |a| *a == Msg::Settle("mine"),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(outcome, Msg::Settle("mine"));
    }

    #[tokio::test]
    async fn test_waiter_answered_after_burst_of_other_outcomes() {
        let store = store();
        let waiter = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .send_and_wait_for(
                        Msg::Start("mine", 0),
                        |a| *a == Msg::Settle("mine"),
                        Duration::from_secs(1),
                    )
                    .await
            })
        };
        // Let the waiter register and send before the burst.
        tokio::task::yield_now().await;

        let mut handles = Vec::new();
        for _ in 0..200 {
            handles.push(store.send(Msg::Start("burst", 0)).await.unwrap());
        }
        for mut handle in handles {
            handle.wait().await;
        }

        assert_eq!(waiter.await.unwrap(), Ok(Msg::Settle("mine")));
        assert_eq!(store.state(|s| s.settled.len()).await, 201);
    }

    #[tokio::test]
    async fn test_send_and_wait_for_times_out() {
        let store = store();

        let result = store
            .send_and_wait_for(Msg::Quiet, |_| true, Duration::from_millis(20))
            .await;

        assert_eq!(result, Err(StoreError::Timeout));
    }

    #[tokio::test]
    async fn test_abandoned_waiters_are_pruned() {
        let store = store();

        let result = store
            .send_and_wait_for(Msg::Quiet, |_| false, Duration::from_millis(5))
            .await;
        assert_eq!(result, Err(StoreError::Timeout));

        let mut handle = store.send(Msg::Start("next", 0)).await.unwrap();
        handle.wait().await;

        assert!(store.lock_waiters().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_rejects_new_actions() {
        let store = store();
        store.shutdown(Duration::from_secs(1)).await.unwrap();

        let result = store.send(Msg::Quiet).await;

        assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
    }

    #[tokio::test]
    async fn test_in_flight_effects_settle_during_shutdown() {
        let store = store();

        let _ = store.send(Msg::Start("logout", 10)).await.unwrap();
        store.shutdown(Duration::from_secs(1)).await.unwrap();

        assert_eq!(store.state(|s| s.settled.clone()).await, vec!["logout"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_times_out_on_slow_effect() {
        let store = store();

        let _ = store.send(Msg::Start("stuck", 60_000)).await.unwrap();
        let result = store.shutdown(Duration::from_secs(1)).await;

        assert_eq!(result, Err(StoreError::ShutdownTimeout(1)));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = store();
        let other = store.clone();

        let mut handle = other.send(Msg::Start("login", 0)).await.unwrap();
        handle.wait().await;

        assert_eq!(store.state(|s| s.started).await, 1);
        assert_eq!(store.state(|s| s.settled.len()).await, 1);
    }
}
