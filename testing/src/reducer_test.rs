//! Given/When/Then harness for a single reducer.
//!
//! [`ReducerTest::run`] reduces the actions and checks state plus the
//! effects of the final action. [`ReducerTest::run_async`] also drives those
//! effects with [`run_effects`](crate::run_effects) and checks the actions
//! they yield, without feeding them back.

use crate::run_effects;
use auth_store_core::{effect::Effect, reducer::Reducer};

type Check<T> = Box<dyn FnOnce(&T)>;
type SliceCheck<T> = Box<dyn FnOnce(&[T])>;

/// Fluent reducer test
///
/// ```ignore
/// ReducerTest::new(NotificationReducer)
///     .with_env(())
///     .given_state(NotificationState::default())
///     .when_action(NotificationAction::Hide)
///     .then_state(|state| assert!(!state.open))
///     .then_effects(assertions::assert_no_effects)
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    env: Option<E>,
    given: Option<S>,
    when: Vec<A>,
    state_checks: Vec<Check<S>>,
    effect_checks: Vec<SliceCheck<Effect<A>>>,
    feedback_checks: Vec<SliceCheck<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Start a test for `reducer`
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            env: None,
            given: None,
            when: Vec::new(),
            state_checks: Vec::new(),
            effect_checks: Vec::new(),
            feedback_checks: Vec::new(),
        }
    }

    /// Environment passed to every reduction
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.env = Some(env);
        self
    }

    /// Starting state
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.given = Some(state);
        self
    }

    /// Queue an action; repeated calls reduce in order
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.when.push(action);
        self
    }

    /// Check the state after the last action
    #[must_use]
    pub fn then_state(mut self, check: impl FnOnce(&S) + 'static) -> Self {
        self.state_checks.push(Box::new(check));
        self
    }

    /// Check the effects returned by the last action
    #[must_use]
    pub fn then_effects(mut self, check: impl FnOnce(&[Effect<A>]) + 'static) -> Self {
        self.effect_checks.push(Box::new(check));
        self
    }

    /// Check the actions the last action's effects yield
    ///
    /// Ignored by [`ReducerTest::run`].
    #[must_use]
    pub fn then_feedback(mut self, check: impl FnOnce(&[A]) + 'static) -> Self {
        self.feedback_checks.push(Box::new(check));
        self
    }

    #[allow(clippy::expect_used)] // a misconfigured test should fail loudly
    fn execute(&mut self) -> Vec<Effect<A>> {
        let env = self.env.take().expect("call with_env() before running");
        let mut state = self.given.take().expect("call given_state() before running");
        assert!(!self.when.is_empty(), "call when_action() before running");

        let mut last = Vec::new();
        for action in std::mem::take(&mut self.when) {
            last = self.reducer.reduce(&mut state, action, &env).into_vec();
        }

        for check in self.state_checks.drain(..) {
            check(&state);
        }
        for check in self.effect_checks.drain(..) {
            check(&last);
        }
        last
    }

    /// Reduce and run state and effect checks
    ///
    /// # Panics
    ///
    /// Panics if environment, state or action is missing, or a check fails.
    pub fn run(mut self) {
        let _ = self.execute();
    }

    /// [`ReducerTest::run`], then drive the effects and run feedback checks
    ///
    /// # Panics
    ///
    /// Panics if environment, state or action is missing, or a check fails.
    pub async fn run_async(mut self)
    where
        A: Send + 'static,
    {
        let effects = self.execute();
        let yielded = run_effects(effects).await;

        for check in self.feedback_checks {
            check(&yielded);
        }
    }
}

/// Reusable effect checks
pub mod assertions {
    use auth_store_core::effect::Effect;

    /// Every effect is a no-op
    ///
    /// # Panics
    ///
    /// Panics if any effect would do work.
    pub fn assert_no_effects<A>(effects: &[Effect<A>]) {
        assert!(effects.iter().all(Effect::is_none), "expected only no-op effects, got {effects:?}");
    }

    /// Exactly `expected` effects were returned
    ///
    /// # Panics
    ///
    /// Panics on a different count.
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(effects.len(), expected, "unexpected number of effects");
    }

    /// At least one effect is an [`Effect::Future`]
    ///
    /// # Panics
    ///
    /// Panics if none is.
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|effect| matches!(effect, Effect::Future(_))),
            "expected an Effect::Future"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_store_core::{SmallVec, smallvec};

    #[derive(Debug, Default)]
    struct Toggle {
        on: bool,
        flips: u32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum ToggleAction {
        Flip,
        FlipLater,
    }

    struct ToggleReducer;

    impl Reducer for ToggleReducer {
        type State = Toggle;
        type Action = ToggleAction;
        type Environment = ();

        fn reduce(&self, state: &mut Toggle, action: ToggleAction, _env: &()) -> SmallVec<[Effect<ToggleAction>; 4]> {
            match action {
                ToggleAction::Flip => {
                    state.on = !state.on;
                    state.flips += 1;
                    smallvec![Effect::None]
                },
                ToggleAction::FlipLater => smallvec![Effect::future(async { Some(ToggleAction::Flip) })],
            }
        }
    }

    #[test]
    fn test_single_action() {
        ReducerTest::new(ToggleReducer)
            .with_env(())
            .given_state(Toggle::default())
            .when_action(ToggleAction::Flip)
            .then_state(|state| assert!(state.on))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_actions_reduce_in_order() {
        ReducerTest::new(ToggleReducer)
            .with_env(())
            .given_state(Toggle::default())
            .when_action(ToggleAction::Flip)
            .when_action(ToggleAction::Flip)
            .then_state(|state| {
                assert!(!state.on);
                assert_eq!(state.flips, 2);
            })
            .run();
    }

    #[tokio::test]
    async fn test_feedback_is_collected_not_reduced() {
        ReducerTest::new(ToggleReducer)
            .with_env(())
            .given_state(Toggle::default())
            .when_action(ToggleAction::FlipLater)
            .then_state(|state| assert_eq!(state.flips, 0))
            .then_effects(assertions::assert_has_future_effect)
            .then_feedback(|actions| assert_eq!(actions, [ToggleAction::Flip]))
            .run_async()
            .await;
    }

    #[test]
    fn test_effect_count() {
        assertions::assert_effects_count(&[Effect::<ToggleAction>::None], 1);
        assertions::assert_effects_count::<ToggleAction>(&[], 0);
    }

    #[test]
    #[should_panic(expected = "call when_action()")]
    fn test_missing_action_fails() {
        ReducerTest::new(ToggleReducer)
            .with_env(())
            .given_state(Toggle::default())
            .run();
    }
}
