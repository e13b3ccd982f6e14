//! # Auth Store Testing
//!
//! Testing utilities for reducers built on `auth-store-core`.
//!
//! This crate provides:
//! - [`ReducerTest`]: a Given-When-Then harness for a single reduction
//! - [`run_effects`]: drives returned effects to completion without a store
//!   and collects the actions they feed back
//! - [`init_test_tracing`]: installs a test-friendly tracing subscriber once
//!
//! ## Example
//!
//! ```ignore
//! use auth_store_testing::{run_effects, ReducerTest};
//!
//! #[tokio::test]
//! async fn login_feeds_back_fulfilled() {
//!     let mut state = SessionState::default();
//!     let effects = SessionReducer::new().reduce(&mut state, login_action(), &env);
//!
//!     let actions = run_effects(effects).await;
//!     assert!(matches!(actions[0], SessionAction::LoginFulfilled { .. }));
//! }
//! ```

#![allow(clippy::module_name_repetitions)]

use auth_store_core::effect::Effect;
use futures::future::join_all;
use std::sync::Once;

mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

static TRACING: Once = Once::new();

/// Install a `fmt` subscriber that writes through the test harness
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Execute effects the way the store would and collect the produced actions
///
/// Futures run concurrently, like the store's spawned tasks, but their
/// actions come back in the order the effects were listed. Nothing is fed
/// back into a reducer; the caller decides what to do with the actions.
pub async fn run_effects<A, I>(effects: I) -> Vec<A>
where
    A: Send + 'static,
    I: IntoIterator<Item = Effect<A>>,
{
    let futures = effects.into_iter().filter_map(|effect| match effect {
        Effect::None => None,
        Effect::Future(fut) => Some(fut),
    });

    join_all(futures).await.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Step {
        One,
        Two,
    }

    #[tokio::test]
    async fn test_run_effects_keeps_listed_order() {
        let effects = vec![
            Effect::future(async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Some(Step::One)
            }),
            Effect::None,
            Effect::future(async { None }),
            Effect::future(async { Some(Step::Two) }),
        ];

        let actions = run_effects(effects).await;

        assert_eq!(actions, vec![Step::One, Step::Two]);
    }

    #[tokio::test]
    async fn test_run_effects_empty() {
        let actions: Vec<Step> = run_effects(Vec::new()).await;
        assert!(actions.is_empty());
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
    }
}
