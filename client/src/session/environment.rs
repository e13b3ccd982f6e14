//! Session environment.

use crate::providers::{AuthApi, LocalStorage};

/// External dependencies of the session reducer
///
/// # Type Parameters
///
/// - `A`: REST API collaborator
/// - `S`: Client-side storage for the persisted identity
#[derive(Debug, Clone)]
pub struct SessionEnvironment<A, S>
where
    A: AuthApi + Clone,
    S: LocalStorage + Clone,
{
    /// REST API collaborator
    pub api: A,

    /// Client-side storage
    pub storage: S,
}

impl<A, S> SessionEnvironment<A, S>
where
    A: AuthApi + Clone,
    S: LocalStorage + Clone,
{
    /// Create a session environment
    #[must_use]
    pub const fn new(api: A, storage: S) -> Self {
        Self { api, storage }
    }
}
