//! Client-side key/value storage trait.

use crate::error::StorageError;
use std::future::Future;

/// String key/value storage that survives restarts.
///
/// Shaped like browser local storage: values are opaque strings and the
/// caller owns their encoding. Reads are synchronous because they only
/// happen once, while the store is being built; writes run inside effects
/// and are async.
pub trait LocalStorage: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set_item(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete a value. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove_item(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}
