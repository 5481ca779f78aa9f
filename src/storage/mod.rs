//! Persistent key-value storage for conversation state
//!
//! The controller only needs a synchronous get/set/remove surface keyed by
//! string, with last-writer-wins semantics. [`SledStore`] backs it with an
//! embedded `sled` database on disk; [`MemoryStore`] keeps everything in
//! process and is used for ephemeral sessions and tests.

use crate::error::{ChatWidgetError, Result};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub mod records;
pub use records::{decode_history, encode_history_window, StorageKeys};

/// Synchronous string key-value surface
///
/// Implementations are not expected to coordinate between processes; two
/// writers to the same key simply overwrite each other.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    /// Reads the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Key-value store backed by an embedded `sled` database
pub struct SledStore {
    db: sled::Db,
    path: PathBuf,
}

impl SledStore {
    /// Open or create a store at `path`
    ///
    /// # Errors
    ///
    /// Returns `ChatWidgetError::Storage` if the database cannot be opened
    ///
    /// # Examples
    ///
    /// ```
    /// use chatwidget::storage::{KeyValueStore, SledStore};
    ///
    /// # fn main() -> chatwidget::error::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let store = SledStore::open(dir.path().join("state"))?;
    /// store.set("greeting", "hello")?;
    /// assert_eq!(store.get("greeting")?.as_deref(), Some("hello"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ChatWidgetError::Storage(format!("Failed to create storage directory: {}", e))
            })?;
        }

        let db = sled::open(&path)
            .map_err(|e| ChatWidgetError::Storage(format!("Failed to open database: {}", e)))?;

        tracing::debug!("Opened conversation store at {}", path.display());
        Ok(Self { db, path })
    }

    /// Open the store in the platform data directory
    ///
    /// # Errors
    ///
    /// Returns `ChatWidgetError::Storage` if the data directory cannot be
    /// determined or the database cannot be opened
    pub fn open_default() -> Result<Self> {
        Self::open(default_store_path()?)
    }

    /// Location of the database on disk
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self
            .db
            .get(key.as_bytes())
            .map_err(|e| ChatWidgetError::Storage(format!("Get failed: {}", e)))?
        {
            Some(bytes) => {
                let value = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    ChatWidgetError::Storage(format!("Value for {} is not UTF-8: {}", key, e))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| ChatWidgetError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| ChatWidgetError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| ChatWidgetError::Storage(format!("Remove failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| ChatWidgetError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }
}

/// In-process key-value store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| ChatWidgetError::Storage("Memory store lock poisoned".to_string()).into())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Default on-disk location of the sled database
pub fn default_store_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "chatwidget", "chatwidget").ok_or_else(|| {
        ChatWidgetError::Storage("Could not determine data directory".to_string())
    })?;
    Ok(proj_dirs.data_dir().join("state"))
}
