//! JSON file backed storage

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::error::{StorageError, StorageResult};
use super::KeyValueStorage;

/// Key-value storage persisted as a single JSON object on disk
///
/// Every mutation rewrites the whole file through a temporary sibling and
/// a rename, so a crash never leaves a half-written map behind.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the storage file, creating an empty map if it does not exist
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();

        let items = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        tracing::debug!(path = ?path, entries = items.len(), "Opened client storage");

        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let json = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("json.tmp");

        std::fs::write(&tmp, json).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;

        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        let mut next = items.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *items = next;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        if !items.contains_key(key) {
            return Ok(());
        }
        let mut next = items.clone();
        next.remove(key);
        self.persist(&next)?;
        *items = next;
        Ok(())
    }
}
