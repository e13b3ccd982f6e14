//! # Auth Store Core
//!
//! Core traits and types for the auth store state containers.
//!
//! Every piece of client state (the session, the notification banner) is
//! modelled the same way:
//!
//! - **State**: plain owned data describing what the view layer renders
//! - **Action**: every input the container reacts to, including the
//!   completions of asynchronous requests
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: a description of work to run later (usually a request to the
//!   API collaborator), never the work itself
//! - **Environment**: injected dependencies (API client, storage)
//!
//! ## Example
//!
//! ```
//! use auth_store_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Debug, Default)]
//! struct BannerState {
//!     visible: bool,
//! }
//!
//! #[derive(Debug, Clone)]
//! enum BannerAction {
//!     Show,
//!     Hide,
//! }
//!
//! struct BannerReducer;
//!
//! impl Reducer for BannerReducer {
//!     type State = BannerState;
//!     type Action = BannerAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut BannerState,
//!         action: BannerAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<BannerAction>; 4]> {
//!         state.visible = matches!(action, BannerAction::Show);
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = BannerState::default();
//! BannerReducer.reduce(&mut state, BannerAction::Show, &());
//! assert!(state.visible);
//! ```

pub use smallvec::{smallvec, SmallVec};

/// The [`Reducer`](reducer::Reducer) trait
///
/// A reducer applies an action to state synchronously and describes any I/O
/// it needs as effects for the runtime to execute.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// State transition function of one store
    ///
    /// ```ignore
    /// impl Reducer for SessionReducer {
    ///     type State = SessionState;
    ///     type Action = SessionAction;
    ///     type Environment = SessionEnvironment<HttpAuthApi, FileStorage>;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut SessionState,
    ///         action: SessionAction,
    ///         env: &Self::Environment,
    ///     ) -> SmallVec<[Effect<SessionAction>; 4]> {
    ///         match action {
    ///             SessionAction::LoginRequested { request_id, credentials } => {
    ///                 state.begin_request();
    ///                 let api = env.api.clone();
    ///                 smallvec![Effect::future(async move {
    ///                     let identity = api.login(&credentials).await.ok()?;
    ///                     Some(SessionAction::LoginFulfilled { request_id, identity })
    ///                 })]
    ///             }
    ///             _ => smallvec![Effect::None],
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// State owned by the store
        type State;

        /// Inputs, including the completions of asynchronous requests
        type Action;

        /// Collaborators the effects need (API client, storage)
        type Environment;

        /// Apply `action` to `state` and return the effects to run
        ///
        /// Must not block or perform I/O itself. Nearly every action yields
        /// at most one effect, hence the inline capacity.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// The [`Effect`](effect::Effect) description type
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Work for the runtime to perform after a reduction
    ///
    /// Effects are inert values. The store decides when to run them and feeds
    /// any action they yield back into the reducer.
    pub enum Effect<Action> {
        /// Nothing to do
        None,

        /// Async computation whose `Some` output is fed back
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::None => f.write_str("Effect::None"),
                Self::Future(_) => f.write_str("Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Box an async block that may yield a follow-up action
        #[must_use]
        pub fn future<F>(fut: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Self::Future(Box::pin(fut))
        }

        /// Whether running this effect would do nothing
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Self::None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;

    #[derive(Debug, Clone, PartialEq)]
    enum Ping {
        Pong,
    }

    #[test]
    fn test_is_none() {
        assert!(Effect::<Ping>::None.is_none());
        assert!(!Effect::future(async { Some(Ping::Pong) }).is_none());
        assert!(!Effect::<Ping>::future(async { None }).is_none());
    }

    #[test]
    fn test_debug_hides_future() {
        let effect = Effect::future(async { Some(Ping::Pong) });
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");
        assert_eq!(format!("{:?}", Effect::<Ping>::None), "Effect::None");
    }

    #[tokio::test]
    async fn test_future_constructor_preserves_output() {
        let Effect::Future(fut) = Effect::future(async { Some(Ping::Pong) }) else {
            unreachable!("Effect::future always builds a Future variant");
        };
        assert_eq!(fut.await, Some(Ping::Pong));
    }
}
