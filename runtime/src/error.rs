//! Store errors.

use thiserror::Error;

/// Errors returned by [`Store`](crate::Store) operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// `shutdown` was called; new actions are refused
    #[error("Store is shutting down")]
    ShutdownInProgress,

    /// Effects were still running when the shutdown deadline passed
    #[error("Shutdown timed out with {0} effects still running")]
    ShutdownTimeout(usize),

    /// No matching action arrived in time
    #[error("Timeout waiting for action")]
    Timeout,

    /// The store was dropped before the awaited action arrived
    #[error("Store closed before answering")]
    ChannelClosed,
}
