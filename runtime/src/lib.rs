//! # Auth Store Runtime
//!
//! Executes reducers from `auth-store-core`.
//!
//! A [`Store`] owns one piece of state. `send` runs the reducer under a write
//! lock and spawns the returned effects on tokio. An effect's resulting
//! action is reduced in turn and then handed to any caller of
//! [`Store::send_and_wait_for`] whose predicate it matches, which is how a
//! caller awaits the outcome of its own request.
//!
//! ```ignore
//! use auth_store_runtime::Store;
//!
//! let store = Store::new(SessionState::default(), SessionReducer::new(), env);
//! store.send(SessionAction::LogoutRequested { request_id }).await?;
//! let loading = store.state(|s| s.is_loading()).await;
//! ```

mod error;
mod handle;
pub mod store;

pub use error::StoreError;
pub use handle::EffectHandle;
pub use store::Store;
