//! Persistent key-value storage.
//!
//! Values are JSON documents stored under fixed keys, mirroring the layout
//! the browser front end keeps in local storage. `SledStore` persists to
//! disk; `MemoryStore` is for tests and throwaway sessions.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, TeaCalError};

/// Storage keys
pub mod keys {
    /// List of every registered `UserProfile`
    pub const USERS: &str = "users";
    /// The signed-in `UserProfile`
    pub const CURRENT_USER: &str = "currentUser";
    /// User id bridging registration and onboarding
    pub const TEMP_USER_ID: &str = "tempUserId";
    /// List of every `ConsumptionRecord`
    pub const RECORDS: &str = "milkTeaRecords";
    /// Daily and weekly budget settings
    pub const BUDGET_SETTINGS: &str = "budgetSettings";
    /// Number of journal shares
    pub const SHARE_COUNT: &str = "shareCount";
}

/// Raw string key-value store
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Write `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Delete `key`; missing keys are not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read and decode a JSON value
pub fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value
pub fn set_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Store backed by an embedded sled database
pub struct SledStore {
    db: sled::Db,
    flush_on_write: bool,
}

impl SledStore {
    /// Open or create the database directory at `path`
    pub fn open(path: &Path, flush_on_write: bool) -> Result<Self> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        debug!(path = %path.display(), "Opened sled store");
        Ok(Self { db, flush_on_write })
    }

    fn maybe_flush(&self) -> Result<()> {
        if self.flush_on_write {
            self.db.flush()?;
        }
        Ok(())
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| TeaCalError::IncompatibleStoredData(format!("{key}: {e}"))),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.maybe_flush()
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db.remove(key.as_bytes())?;
        self.maybe_flush()
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| TeaCalError::Storage(format!("memory store poisoned: {e}")))
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
