//! High-level client facade over the session and notification stores.
//!
//! ```ignore
//! let client = AuthClient::from_env()?;
//!
//! match client.login(Credentials::new("+7(999) 123-45-67", "Passw0rd1")).await {
//!     Ok(identity) => client.show_notification(format!("Welcome, {}", identity.name), NotificationKind::Success).await?,
//!     Err(err) => client.show_notification(err.to_string(), NotificationKind::Error).await?,
//! }
//! ```

use crate::config::ClientConfig;
use crate::error::{ClientError, ConfigError, OperationFailed};
use crate::file_storage::FileStorage;
use crate::http::HttpAuthApi;
use crate::notification::{NotificationAction, NotificationKind, NotificationReducer, NotificationState};
use crate::providers::{AuthApi, LocalStorage};
use crate::session::{Operation, SessionAction, SessionEnvironment, SessionReducer, SessionState};
use crate::types::{BasicIdentity, Credentials, NewUser, RequestId, UserId, UserProfile};
use auth_store_runtime::Store;
use std::time::Duration;

/// Store running the session reducer
pub type SessionStore<A, S> =
    Store<SessionState, SessionAction, SessionEnvironment<A, S>, SessionReducer<A, S>>;

/// Store running the notification reducer
pub type NotificationStore = Store<NotificationState, NotificationAction, (), NotificationReducer>;

/// Session and notification stores behind one handle
///
/// Each operation sends its request action and waits for the action that
/// settles it. The outcome is both applied to session state and returned,
/// so callers can react locally or simply re-read state.
///
/// Cloning is cheap; clones share both stores.
pub struct AuthClient<A, S>
where
    A: AuthApi + Clone + 'static,
    S: LocalStorage + Clone + 'static,
{
    session: SessionStore<A, S>,
    notifications: NotificationStore,
    operation_timeout: Duration,
}

impl<A, S> Clone for AuthClient<A, S>
where
    A: AuthApi + Clone + 'static,
    S: LocalStorage + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            notifications: self.notifications.clone(),
            operation_timeout: self.operation_timeout,
        }
    }
}

impl AuthClient<HttpAuthApi, FileStorage> {
    /// Build a client talking HTTP and persisting to files, per `config`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let api = HttpAuthApi::from_config(config)?;
        let storage = FileStorage::new(&config.storage_dir);

        tracing::debug!(
            base_url = %config.base_url,
            storage_dir = %config.storage_dir.display(),
            "Building auth client"
        );

        Ok(Self::new(api, storage).with_operation_timeout(config.operation_timeout))
    }

    /// Build a client from `AUTH_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is invalid or the HTTP client
    /// cannot be built.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_config(&ClientConfig::from_env()?)
    }
}

impl<A, S> AuthClient<A, S>
where
    A: AuthApi + Clone + 'static,
    S: LocalStorage + Clone + 'static,
{
    /// Create both stores, seeding the session from persisted identity
    #[must_use]
    pub fn new(api: A, storage: S) -> Self {
        let initial = SessionState::rehydrate(&storage);

        Self {
            session: Store::new(
                initial,
                SessionReducer::new(),
                SessionEnvironment::new(api, storage),
            ),
            notifications: Store::new(NotificationState::default(), NotificationReducer, ()),
            operation_timeout: ClientConfig::default().operation_timeout,
        }
    }

    /// Set how long operations are awaited before giving up
    ///
    /// An operation that outlives the timeout still settles in the store.
    #[must_use]
    pub const fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Send `action` and wait for the action that settles it
    async fn run(&self, action: SessionAction) -> Result<SessionAction, ClientError> {
        let request_id = action.request_id();
        let operation = action.operation();

        let settled = self
            .session
            .send_and_wait_for(action, move |a| a.settles(request_id), self.operation_timeout)
            .await?;

        if let Some(message) = settled.rejection_message() {
            return Err(OperationFailed {
                operation,
                message: message.to_string(),
            }
            .into());
        }
        Ok(settled)
    }

    /// Log in with a phone number and password
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Operation`] with the recorded message if the
    /// API or storage fails, or [`ClientError::Store`] if the outcome could
    /// not be awaited.
    pub async fn login(&self, credentials: Credentials) -> Result<BasicIdentity, ClientError> {
        let action = SessionAction::LoginRequested {
            request_id: RequestId::next(),
            credentials,
        };
        match self.run(action).await? {
            SessionAction::LoginFulfilled { identity, .. } => Ok(identity),
            _ => Err(ClientError::UnexpectedOutcome(Operation::Login)),
        }
    }

    /// Register a new user, who is logged in on success
    ///
    /// # Errors
    ///
    /// Same as [`AuthClient::login`].
    pub async fn register(&self, new_user: NewUser) -> Result<BasicIdentity, ClientError> {
        let action = SessionAction::RegisterRequested {
            request_id: RequestId::next(),
            new_user,
        };
        match self.run(action).await? {
            SessionAction::RegisterFulfilled { identity, .. } => Ok(identity),
            _ => Err(ClientError::UnexpectedOutcome(Operation::Register)),
        }
    }

    /// Log out
    ///
    /// The session is only cleared once the API confirms.
    ///
    /// # Errors
    ///
    /// Same as [`AuthClient::login`]. On error the session is kept.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let action = SessionAction::LogoutRequested {
            request_id: RequestId::next(),
        };
        match self.run(action).await? {
            SessionAction::LogoutFulfilled { .. } => Ok(()),
            _ => Err(ClientError::UnexpectedOutcome(Operation::Logout)),
        }
    }

    /// Fetch the profile of `user_id`
    ///
    /// # Errors
    ///
    /// Same as [`AuthClient::login`].
    pub async fn fetch_profile(&self, user_id: UserId) -> Result<UserProfile, ClientError> {
        let action = SessionAction::ProfileRequested {
            request_id: RequestId::next(),
            user_id,
        };
        match self.run(action).await? {
            SessionAction::ProfileFulfilled { profile, .. } => Ok(profile),
            _ => Err(ClientError::UnexpectedOutcome(Operation::FetchProfile)),
        }
    }

    /// Display a notification, replacing the current one
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Store`] if the store is shutting down.
    pub async fn show_notification(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> Result<(), ClientError> {
        self.notifications
            .send(NotificationAction::Show {
                message: message.into(),
                kind,
            })
            .await?;
        Ok(())
    }

    /// Close the notification
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Store`] if the store is shutting down.
    pub async fn hide_notification(&self) -> Result<(), ClientError> {
        self.notifications.send(NotificationAction::Hide).await?;
        Ok(())
    }

    /// Snapshot of session state
    pub async fn session(&self) -> SessionState {
        self.session.state(Clone::clone).await
    }

    /// Snapshot of notification state
    pub async fn notification(&self) -> NotificationState {
        self.notifications.state(Clone::clone).await
    }

    /// Stop accepting operations and wait for in-flight ones to settle
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Store`] if effects are still pending after
    /// `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), ClientError> {
        self.session.shutdown(timeout).await?;
        self.notifications.shutdown(timeout).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::mocks::{MemoryStorage, MockAuthApi};
    use crate::session::persist_identity;
    use crate::types::RequestStatus;

    fn jane() -> BasicIdentity {
        BasicIdentity {
            id: UserId::new("u1"),
            name: "Jane".to_string(),
            phone_number: "+7(999) 123-45-67".to_string(),
        }
    }

    #[tokio::test]
    async fn test_new_rehydrates_identity() {
        let storage = MemoryStorage::new();
        persist_identity(&storage, &jane()).await.unwrap();

        let client = AuthClient::new(MockAuthApi::new(), storage);

        let session = client.session().await;
        assert_eq!(session.basic_identity, Some(jane()));
        assert_eq!(session.status, RequestStatus::Idle);
    }

    #[tokio::test]
    async fn test_login_returns_identity_and_updates_state() {
        let api = MockAuthApi::new();
        api.set_login(Ok(jane()));
        let client = AuthClient::new(api, MemoryStorage::new());

        let identity = client
            .login(Credentials::new("+7(999) 123-45-67", "Passw0rd1"))
            .await
            .unwrap();

        assert_eq!(identity, jane());
        assert_eq!(client.session().await.basic_identity, Some(jane()));
    }

    #[tokio::test]
    async fn test_failure_is_returned_and_recorded() {
        let api = MockAuthApi::new();
        api.set_get_user(Err(ApiError::RequestFailed("connection reset".to_string())));
        let client = AuthClient::new(api, MemoryStorage::new());

        let err = client.fetch_profile(UserId::new("u1")).await.unwrap_err();

        assert_eq!(
            err,
            ClientError::Operation(OperationFailed {
                operation: Operation::FetchProfile,
                message: "Get user profile data failed".to_string(),
            })
        );
        let session = client.session().await;
        assert_eq!(session.status, RequestStatus::Failed);
        assert_eq!(session.error.as_deref(), Some("Get user profile data failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_but_operation_still_settles() {
        let api = MockAuthApi::new();
        api.set_login(Ok(jane()));
        api.set_delay(Operation::Login, Duration::from_secs(60));
        let client = AuthClient::new(api, MemoryStorage::new())
            .with_operation_timeout(Duration::from_secs(1));

        let err = client
            .login(Credentials::new("+7(999) 123-45-67", "Passw0rd1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Store(_)));
        assert!(client.session().await.is_loading());

        client.shutdown(Duration::from_secs(120)).await.unwrap();
        assert_eq!(client.session().await.basic_identity, Some(jane()));
    }

    #[tokio::test]
    async fn test_notifications() {
        let client = AuthClient::new(MockAuthApi::new(), MemoryStorage::new());

        client
            .show_notification("Registered", NotificationKind::Success)
            .await
            .unwrap();
        assert!(client.notification().await.open);

        client.hide_notification().await.unwrap();
        let notification = client.notification().await;
        assert!(!notification.open);
        assert!(notification.message.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_rejects_new_operations() {
        let client = AuthClient::new(MockAuthApi::new(), MemoryStorage::new());
        client.shutdown(Duration::from_secs(1)).await.unwrap();

        let err = client.logout().await.unwrap_err();
        assert!(matches!(err, ClientError::Store(_)));
    }
}
