//! Domain types shared by the session store, the API client and storage.
//!
//! Field names are camelCase on the wire to match the REST API and the
//! persisted `userInfo` record.

use serde::{Deserialize, Deserializer, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of a user as issued by the API
///
/// Decodes from a JSON string or number; a numeric id is kept in its decimal
/// form and written back as a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Text(id) => Self(id),
            Wire::Number(id) => Self(id.to_string()),
        })
    }
}

impl UserId {
    /// Wrap an identifier returned by the API
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Minimal identity of the authenticated principal
///
/// Returned by login and registration, and persisted as the durable signal
/// that a session is active.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicIdentity {
    /// User identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Phone number in `+7(XXX) XXX-XX-XX` form
    pub phone_number: String,
}

/// Profile data fetched on demand from `GET /users/{id}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name
    pub name: String,
    /// Phone number
    pub phone_number: String,
}

/// Login payload
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Phone number
    pub phone_number: String,
    /// Plain-text password, sent to the API only
    pub password: String,
}

impl Credentials {
    /// Build a login payload
    #[must_use]
    pub fn new(phone_number: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("phone_number", &self.phone_number)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration payload
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// Phone number
    pub phone_number: String,
    /// Plain-text password, sent to the API only
    pub password: String,
}

impl NewUser {
    /// Build a registration payload
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        phone_number: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone_number: phone_number.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("phone_number", &self.phone_number)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Lifecycle of the most recently started request
///
/// One flag is shared by every session operation, so when two operations
/// overlap it reflects whichever settled last.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Nothing in flight, last request (if any) succeeded
    #[default]
    Idle,
    /// A request is in flight
    Loading,
    /// The last request to settle failed
    Failed,
}

/// Correlates a request action with the action that settles it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

impl RequestId {
    /// Allocate a process-unique request id
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The numeric value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}
