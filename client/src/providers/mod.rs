//! Provider traits for the session store's external collaborators.
//!
//! The session reducer only sees these traits; production implementations
//! live in [`crate::http`] and [`crate::file_storage`], test doubles in
//! [`crate::mocks`].

pub mod api;
pub mod storage;

pub use api::AuthApi;
pub use storage::LocalStorage;
