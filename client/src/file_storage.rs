//! File-backed [`LocalStorage`].
//!
//! Each key is stored as `<dir>/<key>.json`. Writes go through a temporary
//! file and a rename so a crash never leaves a half-written entry. Writes use
//! `tokio::fs` so they never block a runtime worker.

use crate::error::StorageError;
use crate::providers::LocalStorage;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory of one-file-per-key entries
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Store entries under `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the entries
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are fixed identifiers; strip anything that could leave `dir`.
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        let path = self.path_for(key);
        let value = value.to_owned();

        async move {
            tokio::fs::create_dir_all(&self.dir).await?;

            let tmp = path.with_extension("json.tmp");
            tokio::fs::write(&tmp, value).await?;
            tokio::fs::rename(&tmp, &path).await?;

            tracing::trace!(path = %path.display(), "Stored entry");
            Ok(())
        }
    }

    fn remove_item(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send {
        let path = self.path_for(key);

        async move {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        }
    }
}
