//! Token persistence.
//!
//! The client keeps exactly one persisted value: the bearer token under a
//! fixed key. [`TokenStorage`] is the key/value interface to wherever that
//! lives. Two backends are provided:
//!
//! - [`MemoryStorage`]: process-local, gone on exit (tests, embedding)
//! - [`FileStorage`]: a small JSON object on disk, so a CLI stays logged
//!   in between runs
//!
//! A [`SessionManager`](crate::SessionManager) built WITHOUT storage
//! never persists anything and never reads anything back.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use crate::StorageError;

/// Key/value string storage for the session token.
///
/// Every call hits the backend. Nothing is cached, so a token written by
/// another process (or removed by hand) is seen on the next read.
pub trait TokenStorage: Send + Sync + 'static {
    /// Returns the value under `key`, or `None` if there is none.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn store(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// In-memory [`TokenStorage`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding this lock can't leave the map half-written,
        // so a poisoned lock is still safe to use.
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values().get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// [`TokenStorage`] backed by a JSON file: `{ "token": "eyJ..." }`.
///
/// A missing file reads as empty. Parent directories are created on the
/// first write, and every write replaces the file atomically.
///
/// A file that isn't valid JSON fails `load` with
/// [`StorageError::Corrupt`], but `store` and `remove` overwrite it, so a
/// damaged file can always be purged or replaced by a fresh login.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Uses the file at `path`. Nothing is touched until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StorageError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(HashMap::new());
            }
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_slice(&content).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(
        &self,
        values: &HashMap<String, String>,
    ) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let content = serde_json::to_vec_pretty(values).map_err(|source| {
            StorageError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        // Same-directory temp file renamed over the target: readers see the
        // old file or the new one, never a partial write.
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
        file.write_all(&content).map_err(io_err)?;
        file.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    /// Like `read_all`, but a corrupt file reads as empty so the caller
    /// can overwrite it.
    fn read_for_update(&self) -> Result<HashMap<String, String>, StorageError> {
        match self.read_all() {
            Err(StorageError::Corrupt { path, source }) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %source,
                    "token storage file is corrupt, overwriting"
                );
                Ok(HashMap::new())
            }
            other => other,
        }
    }
}

impl TokenStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.read_for_update()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let values = match self.read_all() {
            Ok(mut values) => {
                if values.remove(key).is_none() {
                    return Ok(());
                }
                values
            }
            Err(StorageError::Corrupt { .. }) => self.read_for_update()?,
            Err(e) => return Err(e),
        };
        self.write_all(&values)
    }
}
