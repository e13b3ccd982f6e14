//! Error types for the API collaborator, storage, configuration and the
//! client facade.

use crate::session::Operation;
use auth_store_runtime::StoreError;
use thiserror::Error;

/// Errors returned by an [`AuthApi`](crate::providers::AuthApi) implementation.
///
/// The session store only distinguishes success from failure; the variants
/// exist for logging and for callers that talk to the API directly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (connection, timeout, TLS)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// A success response carried a body that could not be decoded
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// The API answered with a non-success status
    #[error("API rejected request (status {status})")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Human-readable message from the response body, if any
        message: Option<String>,
    },

    /// The endpoint URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Human-readable message supplied by the API, if it sent one
    ///
    /// Transport failures never carry a user-facing message, so callers fall
    /// back to their own default.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Errors from the client-side key/value storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be encoded or decoded
    #[error("Stored value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// In-memory storage mutex was poisoned
    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Errors raised while reading [`ClientConfig`](crate::config::ClientConfig).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Base URL did not parse or cannot be a base
    #[error("Invalid API base URL {value:?}: {reason}")]
    InvalidUrl {
        /// Offending value
        value: String,
        /// Parser message
        reason: String,
    },

    /// Timeout was not a positive whole number of seconds
    #[error("Invalid timeout {value:?}: expected a positive number of seconds")]
    InvalidTimeout {
        /// Offending value
        value: String,
    },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// A session operation settled as a failure.
///
/// `message` is exactly what the session store recorded in its `error` field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct OperationFailed {
    /// Which operation failed
    pub operation: Operation,
    /// Message recorded in session state
    pub message: String,
}

/// Errors returned by the [`AuthClient`](crate::client::AuthClient) facade.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The operation reached the API and failed
    #[error(transparent)]
    Operation(#[from] OperationFailed),

    /// The store could not run or report the operation
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The settling action did not belong to the requested operation
    #[error("Unexpected outcome for {0}")]
    UnexpectedOutcome(Operation),
}
