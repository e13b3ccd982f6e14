//! REST API collaborator trait.

use crate::error::ApiError;
use crate::types::{BasicIdentity, Credentials, NewUser, UserId, UserProfile};
use std::future::Future;

/// The four endpoints the session store talks to.
///
/// Implementations own transport concerns (headers, timeouts, TLS). Every
/// method resolves to success or an [`ApiError`]; the store does not look at
/// status codes.
pub trait AuthApi: Send + Sync {
    /// `POST /login` with `{phoneNumber, password}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects the
    /// credentials.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<BasicIdentity, ApiError>> + Send;

    /// `POST /register` with `{name, phoneNumber, password}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API refuses the
    /// registration.
    fn register(
        &self,
        new_user: &NewUser,
    ) -> impl Future<Output = Result<BasicIdentity, ApiError>> + Send;

    /// `POST /logout` with an empty object. The response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    fn logout(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `GET /users/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the user is unknown, or the
    /// body is not a profile record.
    fn get_user(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<UserProfile, ApiError>> + Send;
}
