//! # Auth Store
//!
//! Client-side state for a phone-number login flow.
//!
//! Two independent stores run on `auth-store-runtime`:
//!
//! - **Session store** ([`session`]): the authenticated identity, the user's
//!   profile, and the lifecycle of the last request. Login, registration,
//!   logout and profile fetch each go through an [`AuthApi`]; the identity is
//!   persisted through [`LocalStorage`] under the `userInfo` key and
//!   rehydrated on startup.
//! - **Notification store** ([`notification`]): one transient message with
//!   a severity.
//!
//! [`AuthClient`] bundles both stores behind async methods that return the
//! outcome of each operation. Production collaborators are
//! [`HttpAuthApi`] (`reqwest`) and [`FileStorage`]; in-memory doubles live in
//! [`mocks`].
//!
//! ## Example
//!
//! ```ignore
//! use auth_store::{AuthClient, Credentials};
//!
//! let client = AuthClient::from_env()?;
//! let identity = client
//!     .login(Credentials::new("+7(999) 123-45-67", "Passw0rd1"))
//!     .await?;
//! let profile = client.fetch_profile(identity.id).await?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod client;
pub mod config;
pub mod error;
pub mod file_storage;
pub mod http;
pub mod notification;
pub mod providers;
pub mod session;
pub mod types;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use client::{AuthClient, NotificationStore, SessionStore};
pub use config::ClientConfig;
pub use error::{ApiError, ClientError, ConfigError, OperationFailed, StorageError};
pub use file_storage::FileStorage;
pub use http::HttpAuthApi;
pub use notification::{NotificationAction, NotificationKind, NotificationReducer, NotificationState};
pub use providers::{AuthApi, LocalStorage};
pub use session::{Operation, SessionAction, SessionEnvironment, SessionReducer, SessionState};
pub use types::{BasicIdentity, Credentials, NewUser, RequestId, RequestStatus, UserId, UserProfile};
pub use validation::ValidationError;
