//! Persisted Client Storage
//!
//! A small string key-value store standing in for the browser's
//! `localStorage`. Only two keys are ever written by the client:
//!
//! - [`ACCESS_TOKEN_KEY`]: bearer token of the signed-in session
//! - [`ACTIVE_TENANT_ID_KEY`]: id of the last selected workspace
//!
//! [`FileStorage`] keeps the map in a JSON file so a restarted shell comes
//! back to the same workspace; [`MemoryStorage`] is used by tests.

mod error;
mod file;

pub use error::{StorageError, StorageResult};
pub use file::FileStorage;

use std::collections::BTreeMap;
use std::sync::Mutex;

/// Storage key holding the access token
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key holding the active tenant id
pub const ACTIVE_TENANT_ID_KEY: &str = "active_tenant_id";

/// String key-value storage with `localStorage` semantics
pub trait KeyValueStorage: Send + Sync {
    /// Read a value, `None` when the key is absent
    fn get_item(&self, key: &str) -> Option<String>;

    /// Insert or replace a value
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key; removing an absent key is not an error
    fn remove_item(&self, key: &str) -> StorageResult<()>;
}

/// Volatile storage backed by a map
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-populated with entries
    pub fn with_items<I, K, V>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let items = items
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            items: Mutex::new(items),
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        items.remove(key);
        Ok(())
    }
}
