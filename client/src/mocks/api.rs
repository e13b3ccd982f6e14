//! Scriptable auth API.

use crate::error::ApiError;
use crate::providers::AuthApi;
use crate::session::Operation;
use crate::types::{BasicIdentity, Credentials, NewUser, UserId, UserProfile};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct Script {
    login: Option<Result<BasicIdentity, ApiError>>,
    register: Option<Result<BasicIdentity, ApiError>>,
    logout: Option<Result<(), ApiError>>,
    get_user: Option<Result<UserProfile, ApiError>>,
    delays: HashMap<Operation, Duration>,

    logins: Vec<Credentials>,
    registrations: Vec<NewUser>,
    logouts: usize,
    profiles: Vec<UserId>,
}

/// Mock [`AuthApi`]
///
/// Each endpoint answers with the last response scripted for it, or a
/// [`ApiError::RequestFailed`] when none was. Calls are recorded. Clones
/// share the script, so a test can reconfigure the API after handing it to
/// a store.
#[derive(Debug, Clone, Default)]
pub struct MockAuthApi {
    script: Arc<Mutex<Script>>,
}

fn unscripted(operation: Operation) -> ApiError {
    ApiError::RequestFailed(format!("no response scripted for {operation}"))
}

async fn respond<T>(delay: Option<Duration>, response: Result<T, ApiError>) -> Result<T, ApiError> {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    response
}

impl MockAuthApi {
    /// Create a mock with nothing scripted
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Script the `POST /login` response
    pub fn set_login(&self, response: Result<BasicIdentity, ApiError>) {
        self.script().login = Some(response);
    }

    /// Script the `POST /register` response
    pub fn set_register(&self, response: Result<BasicIdentity, ApiError>) {
        self.script().register = Some(response);
    }

    /// Script the `POST /logout` response
    pub fn set_logout(&self, response: Result<(), ApiError>) {
        self.script().logout = Some(response);
    }

    /// Script the `GET /users/{id}` response
    pub fn set_get_user(&self, response: Result<UserProfile, ApiError>) {
        self.script().get_user = Some(response);
    }

    /// Delay every response of `operation`
    pub fn set_delay(&self, operation: Operation, delay: Duration) {
        self.script().delays.insert(operation, delay);
    }

    /// Credentials passed to `login`, in call order
    #[must_use]
    pub fn logins(&self) -> Vec<Credentials> {
        self.script().logins.clone()
    }

    /// Payloads passed to `register`, in call order
    #[must_use]
    pub fn registrations(&self) -> Vec<NewUser> {
        self.script().registrations.clone()
    }

    /// Number of `logout` calls
    #[must_use]
    pub fn logout_count(&self) -> usize {
        self.script().logouts
    }

    /// User ids passed to `get_user`, in call order
    #[must_use]
    pub fn requested_profiles(&self) -> Vec<UserId> {
        self.script().profiles.clone()
    }
}

impl AuthApi for MockAuthApi {
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<BasicIdentity, ApiError>> + Send {
        let mut script = self.script();
        script.logins.push(credentials.clone());
        let response = script
            .login
            .clone()
            .unwrap_or_else(|| Err(unscripted(Operation::Login)));
        let delay = script.delays.get(&Operation::Login).copied();
        drop(script);

        respond(delay, response)
    }

    fn register(
        &self,
        new_user: &NewUser,
    ) -> impl Future<Output = Result<BasicIdentity, ApiError>> + Send {
        let mut script = self.script();
        script.registrations.push(new_user.clone());
        let response = script
            .register
            .clone()
            .unwrap_or_else(|| Err(unscripted(Operation::Register)));
        let delay = script.delays.get(&Operation::Register).copied();
        drop(script);

        respond(delay, response)
    }

    fn logout(&self) -> impl Future<Output = Result<(), ApiError>> + Send {
        let mut script = self.script();
        script.logouts += 1;
        let response = script
            .logout
            .clone()
            .unwrap_or_else(|| Err(unscripted(Operation::Logout)));
        let delay = script.delays.get(&Operation::Logout).copied();
        drop(script);

        respond(delay, response)
    }

    fn get_user(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<UserProfile, ApiError>> + Send {
        let mut script = self.script();
        script.profiles.push(user_id.clone());
        let response = script
            .get_user
            .clone()
            .unwrap_or_else(|| Err(unscripted(Operation::FetchProfile)));
        let delay = script.delays.get(&Operation::FetchProfile).copied();
        drop(script);

        respond(delay, response)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unscripted_endpoint_fails() {
        let api = MockAuthApi::new();

        let err = api.logout().await.unwrap_err();

        assert!(matches!(err, ApiError::RequestFailed(_)));
        assert_eq!(api.logout_count(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_script_and_calls() {
        let api = MockAuthApi::new();
        let handle = api.clone();
        handle.set_get_user(Ok(UserProfile {
            name: "Jane".to_string(),
            phone_number: "+7(999) 123-45-67".to_string(),
        }));

        let profile = api.get_user(&UserId::new("u1")).await.unwrap();

        assert_eq!(profile.name, "Jane");
        assert_eq!(handle.requested_profiles(), vec![UserId::new("u1")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_applies_to_operation() {
        let api = MockAuthApi::new();
        api.set_logout(Ok(()));
        api.set_delay(Operation::Logout, Duration::from_secs(5));

        let started = tokio::time::Instant::now();
        api.logout().await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
