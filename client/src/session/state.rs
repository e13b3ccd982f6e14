//! Session state and its persisted identity record.

use crate::error::StorageError;
use crate::providers::LocalStorage;
use crate::types::{BasicIdentity, RequestStatus, UserProfile};
use serde::{Deserialize, Serialize};

/// Fixed storage key of the persisted identity
pub const USER_INFO_KEY: &str = "userInfo";

/// State owned by the session store
///
/// Invariants kept by the reducer:
/// - `status == Loading` implies `error == None`
/// - `status == Failed` implies `error` is a non-empty message
/// - `basic_identity == Some(x)` implies storage holds `x` under
///   [`USER_INFO_KEY`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Authenticated principal, absent when logged out
    pub basic_identity: Option<BasicIdentity>,
    /// Profile of the principal, absent until fetched
    pub profile: Option<UserProfile>,
    /// Lifecycle of the most recently settled or started request
    pub status: RequestStatus,
    /// Message of the last failure
    pub error: Option<String>,
}

impl SessionState {
    /// State seeded with a known identity
    #[must_use]
    pub fn with_identity(identity: Option<BasicIdentity>) -> Self {
        Self {
            basic_identity: identity,
            ..Self::default()
        }
    }

    /// Initial state for a new process: identity rehydrated from storage
    ///
    /// An unreadable or corrupt entry is logged and treated as logged out.
    #[must_use]
    pub fn rehydrate<S: LocalStorage + ?Sized>(storage: &S) -> Self {
        match load_identity(storage) {
            Ok(identity) => {
                if let Some(identity) = &identity {
                    tracing::info!(user_id = %identity.id, "Rehydrated session from storage");
                }
                Self::with_identity(identity)
            },
            Err(error) => {
                tracing::warn!(%error, "Ignoring unreadable persisted session");
                Self::default()
            },
        }
    }

    /// Whether a principal is logged in
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.basic_identity.is_some()
    }

    /// Whether a request is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == RequestStatus::Loading
    }

    /// Transition applied when any operation starts
    pub fn begin_request(&mut self) {
        self.status = RequestStatus::Loading;
        self.error = None;
    }

    /// Transition applied when any operation succeeds
    pub fn succeed(&mut self) {
        self.status = RequestStatus::Idle;
    }

    /// Transition applied when any operation fails
    pub fn fail(&mut self, message: String) {
        self.status = RequestStatus::Failed;
        self.error = Some(message);
    }
}

/// Read the persisted identity
///
/// # Errors
///
/// Returns an error if storage cannot be read or the entry is not valid JSON.
pub fn load_identity<S: LocalStorage + ?Sized>(storage: &S) -> Result<Option<BasicIdentity>, StorageError> {
    storage
        .get_item(USER_INFO_KEY)?
        .map(|raw| serde_json::from_str::<BasicIdentity>(&raw))
        .transpose()
        .map_err(StorageError::from)
}

/// Persist the identity under [`USER_INFO_KEY`]
///
/// # Errors
///
/// Returns an error if the identity cannot be encoded or written.
pub async fn persist_identity<S: LocalStorage + ?Sized>(
    storage: &S,
    identity: &BasicIdentity,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(identity)?;
    storage.set_item(USER_INFO_KEY, &raw).await
}

/// Remove the persisted identity
///
/// # Errors
///
/// Returns an error if storage cannot be written.
pub async fn clear_identity<S: LocalStorage + ?Sized>(storage: &S) -> Result<(), StorageError> {
    storage.remove_item(USER_INFO_KEY).await
}
