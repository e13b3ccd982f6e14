//! In-memory local storage.

use crate::error::StorageError;
use crate::providers::LocalStorage;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// `HashMap`-backed [`LocalStorage`]
///
/// Clones share the same map, so a test can keep a handle and inspect what
/// the store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    /// Create empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `set_item` and `remove_item` fail with an I/O error
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    /// Whether nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("storage is read-only").into());
        }
        Ok(())
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set_item(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        let result = self.check_writable().and_then(|()| {
            let mut entries = self.entries.lock().map_err(|_| StorageError::LockPoisoned)?;
            entries.insert(key.to_string(), value.to_string());
            Ok(())
        });
        std::future::ready(result)
    }

    fn remove_item(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send {
        let result = self.check_writable().and_then(|()| {
            let mut entries = self.entries.lock().map_err(|_| StorageError::LockPoisoned)?;
            entries.remove(key);
            Ok(())
        });
        std::future::ready(result)
    }
}
