//! `reqwest` implementation of [`AuthApi`].

use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};
use crate::providers::AuthApi;
use crate::types::{BasicIdentity, Credentials, NewUser, UserId, UserProfile};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Error body shapes the API may send with a failure status
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// HTTP client for the auth REST API
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: Client,
    base_url: Url,
}

impl HttpAuthApi {
    /// Create a client for `base_url` with a per-request timeout
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the TLS backend cannot be
    /// initialised.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self::with_client(client, base_url))
    }

    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Self::new(config.base_url.clone(), config.request_timeout)
    }

    /// Wrap an existing `reqwest` client
    #[must_use]
    pub const fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Base URL endpoints are resolved against
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint below the base URL, one path segment per item
    ///
    /// Segments are percent-encoded, so user ids cannot escape the
    /// `/users/` prefix.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "POST");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        decode(response).await
    }

    async fn get_json<T>(&self, segments: &[&str]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();

    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ApiError::ResponseParseFailed(e.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    let message = parsed.message.or(parsed.error);

    tracing::debug!(status = status.as_u16(), ?message, "API rejected request");

    Err(ApiError::Rejected {
        status: status.as_u16(),
        message,
    })
}

impl AuthApi for HttpAuthApi {
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<BasicIdentity, ApiError>> + Send {
        let credentials = credentials.clone();
        async move { self.post_json(&["login"], &credentials).await }
    }

    fn register(
        &self,
        new_user: &NewUser,
    ) -> impl Future<Output = Result<BasicIdentity, ApiError>> + Send {
        let new_user = new_user.clone();
        async move { self.post_json(&["register"], &new_user).await }
    }

    fn logout(&self) -> impl Future<Output = Result<(), ApiError>> + Send {
        async move {
            let _: serde_json::Value = self
                .post_json(&["logout"], &serde_json::json!({}))
                .await
                .or_else(|err| match err {
                    // Opaque success payload; an empty body is still success.
                    ApiError::ResponseParseFailed(_) => Ok(serde_json::Value::Null),
                    other => Err(other),
                })?;
            Ok(())
        }
    }

    fn get_user(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<UserProfile, ApiError>> + Send {
        let user_id = user_id.clone();
        async move { self.get_json(&["users", user_id.as_str()]).await }
    }
}
