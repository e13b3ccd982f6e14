//! Client configuration.
//!
//! Values come from the application or the environment; nothing here is read
//! implicitly by the stores.

use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default directory for persisted client state
pub const DEFAULT_STORAGE_DIR: &str = ".auth-store";

/// Environment variable holding the API base URL
pub const ENV_API_URL: &str = "AUTH_API_URL";

/// Environment variable holding the storage directory
pub const ENV_STORAGE_DIR: &str = "AUTH_STORAGE_DIR";

/// Environment variable holding the HTTP request timeout in seconds
pub const ENV_REQUEST_TIMEOUT: &str = "AUTH_REQUEST_TIMEOUT_SECS";

/// Configuration for [`AuthClient`](crate::client::AuthClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST API. Endpoints are resolved below it.
    pub base_url: Url,

    /// Directory holding the persisted `userInfo` entry.
    pub storage_dir: PathBuf,

    /// Timeout applied by the HTTP client to each request.
    ///
    /// Default: 10 seconds
    pub request_timeout: Duration,

    /// How long the facade waits for an operation to settle.
    ///
    /// The operation itself is not cancelled when this expires.
    ///
    /// Default: 30 seconds
    pub operation_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for the given API base URL
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            ..Self::default()
        }
    }

    /// Read configuration from `AUTH_API_URL`, `AUTH_STORAGE_DIR` and
    /// `AUTH_REQUEST_TIMEOUT_SECS`, falling back to defaults for unset
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_API_URL) {
            config.base_url = parse_base_url(&value)?;
        }
        if let Some(value) = lookup(ENV_STORAGE_DIR) {
            config.storage_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_REQUEST_TIMEOUT) {
            config.request_timeout = parse_timeout(&value)?;
        }

        Ok(config)
    }

    /// Set the storage directory
    #[must_use]
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    /// Set the HTTP request timeout
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set how long the facade waits for an operation to settle
    #[must_use]
    pub const fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    #[allow(clippy::expect_used)] // constant URL
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            request_timeout: Duration::from_secs(10),
            operation_timeout: Duration::from_secs(30),
        }
    }
}

/// Parse an API base URL, rejecting URLs that cannot carry a path
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] for unparsable or non-base URLs.
pub fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::InvalidUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl {
            value: value.to_string(),
            reason: "URL cannot be a base".to_string(),
        });
    }

    Ok(url)
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            value: value.to_string(),
        }),
    }
}
