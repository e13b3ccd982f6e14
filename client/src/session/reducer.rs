//! Session reducer.
//!
//! # Flow
//!
//! ```text
//! XRequested ──► status = Loading, error = None ──► Effect::Future(API call)
//!                                                         │
//!                  ┌──────────────────────────────────────┴───────────────┐
//!                  ▼                                                      ▼
//!            XFulfilled: status = Idle, write field          XRejected: status = Failed, error = msg
//! ```
//!
//! Login and registration persist the identity inside the effect, before the
//! fulfilled action is produced, so the in-memory identity never runs ahead
//! of storage. Logout removes it the same way. A storage failure turns the
//! operation into a rejection with the operation's default message.
//!
//! Overlapping operations are not serialized: each settle overwrites
//! `status` and `error`, so the last one to finish wins.

use super::actions::{Operation, SessionAction};
use super::environment::SessionEnvironment;
use super::state::{SessionState, clear_identity, persist_identity};
use crate::error::{ApiError, StorageError};
use crate::providers::{AuthApi, LocalStorage};
use crate::types::BasicIdentity;
use auth_store_core::effect::Effect;
use auth_store_core::reducer::Reducer;
use auth_store_core::{SmallVec, smallvec};

/// Session reducer
///
/// Generic over the API and storage so tests can inject mocks.
#[derive(Debug, Clone)]
pub struct SessionReducer<A, S> {
    _phantom: std::marker::PhantomData<(A, S)>,
}

impl<A, S> SessionReducer<A, S> {
    /// Create a new session reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<A, S> Default for SessionReducer<A, S> {
    fn default() -> Self {
        Self::new()
    }
}

fn api_failure(operation: Operation, error: &ApiError) -> String {
    tracing::warn!(%operation, %error, "Session request failed");
    error
        .message()
        .unwrap_or(operation.default_error_message())
        .to_string()
}

fn storage_failure(operation: Operation, error: &StorageError) -> String {
    tracing::error!(%operation, %error, "Failed to update persisted session");
    operation.default_error_message().to_string()
}

/// Persist a freshly issued identity, folding both failure kinds into the
/// message the store will record
async fn establish<S: LocalStorage>(
    operation: Operation,
    result: Result<BasicIdentity, ApiError>,
    storage: &S,
) -> Result<BasicIdentity, String> {
    let identity = result.map_err(|e| api_failure(operation, &e))?;
    persist_identity(storage, &identity)
        .await
        .map_err(|e| storage_failure(operation, &e))?;
    Ok(identity)
}

impl<A, S> SessionReducer<A, S> {
    fn settle_identity(state: &mut SessionState, identity: BasicIdentity) {
        let same_user = state
            .basic_identity
            .as_ref()
            .is_some_and(|current| current.id == identity.id);
        if !same_user {
            state.profile = None;
        }
        state.basic_identity = Some(identity);
        state.succeed();
    }

    fn settle_failure(state: &mut SessionState, operation: Operation, message: String) {
        let message = if message.trim().is_empty() {
            operation.default_error_message().to_string()
        } else {
            message
        };
        state.fail(message);
    }
}

impl<A, S> Reducer for SessionReducer<A, S>
where
    A: AuthApi + Clone + 'static,
    S: LocalStorage + Clone + 'static,
{
    type State = SessionState;
    type Action = SessionAction;
    type Environment = SessionEnvironment<A, S>;

    #[allow(clippy::too_many_lines)] // one arm per phase of four operations
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Login
            // ═══════════════════════════════════════════════════════════════
            SessionAction::LoginRequested {
                request_id,
                credentials,
            } => {
                tracing::info!(%request_id, phone_number = %credentials.phone_number, "Login requested");
                state.begin_request();

                let api = env.api.clone();
                let storage = env.storage.clone();

                smallvec![Effect::future(async move {
                    let result = api.login(&credentials).await;
                    Some(match establish(Operation::Login, result, &storage).await {
                        Ok(identity) => SessionAction::LoginFulfilled {
                            request_id,
                            identity,
                        },
                        Err(message) => SessionAction::LoginRejected {
                            request_id,
                            message,
                        },
                    })
                })]
            },
            SessionAction::LoginFulfilled { request_id, identity }
            | SessionAction::RegisterFulfilled { request_id, identity } => {
                tracing::info!(%request_id, user_id = %identity.id, "Session established");
                Self::settle_identity(state, identity);
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Registration
            // ═══════════════════════════════════════════════════════════════
            SessionAction::RegisterRequested {
                request_id,
                new_user,
            } => {
                tracing::info!(%request_id, phone_number = %new_user.phone_number, "Registration requested");
                state.begin_request();

                let api = env.api.clone();
                let storage = env.storage.clone();

                smallvec![Effect::future(async move {
                    let result = api.register(&new_user).await;
                    Some(match establish(Operation::Register, result, &storage).await {
                        Ok(identity) => SessionAction::RegisterFulfilled {
                            request_id,
                            identity,
                        },
                        Err(message) => SessionAction::RegisterRejected {
                            request_id,
                            message,
                        },
                    })
                })]
            },

            // ═══════════════════════════════════════════════════════════════
            // Logout: identity is only dropped once the API confirms
            // ═══════════════════════════════════════════════════════════════
            SessionAction::LogoutRequested { request_id } => {
                tracing::info!(%request_id, "Logout requested");
                state.begin_request();

                let api = env.api.clone();
                let storage = env.storage.clone();

                smallvec![Effect::future(async move {
                    let outcome = match api.logout().await {
                        Ok(()) => clear_identity(&storage)
                            .await
                            .map_err(|e| storage_failure(Operation::Logout, &e)),
                        Err(e) => Err(api_failure(Operation::Logout, &e)),
                    };
                    Some(match outcome {
                        Ok(()) => SessionAction::LogoutFulfilled { request_id },
                        Err(message) => SessionAction::LogoutRejected {
                            request_id,
                            message,
                        },
                    })
                })]
            },
            SessionAction::LogoutFulfilled { request_id } => {
                tracing::info!(%request_id, "Session ended");
                state.basic_identity = None;
                state.profile = None;
                state.succeed();
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Profile
            // ═══════════════════════════════════════════════════════════════
            SessionAction::ProfileRequested {
                request_id,
                user_id,
            } => {
                tracing::debug!(%request_id, %user_id, "Profile requested");
                state.begin_request();

                let api = env.api.clone();

                smallvec![Effect::future(async move {
                    Some(match api.get_user(&user_id).await {
                        Ok(profile) => SessionAction::ProfileFulfilled {
                            request_id,
                            profile,
                        },
                        Err(e) => SessionAction::ProfileRejected {
                            request_id,
                            message: api_failure(Operation::FetchProfile, &e),
                        },
                    })
                })]
            },
            SessionAction::ProfileFulfilled { request_id, profile } => {
                tracing::debug!(%request_id, "Profile loaded");
                state.profile = Some(profile);
                state.succeed();
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Failures share one transition
            // ═══════════════════════════════════════════════════════════════
            rejected @ (SessionAction::LoginRejected { .. }
            | SessionAction::RegisterRejected { .. }
            | SessionAction::LogoutRejected { .. }
            | SessionAction::ProfileRejected { .. }) => {
                let operation = rejected.operation();
                let message = rejected.rejection_message().unwrap_or_default().to_string();
                tracing::debug!(request_id = %rejected.request_id(), %operation, "Request rejected");
                Self::settle_failure(state, operation, message);
                smallvec![Effect::None]
            },
        }
    }
}
