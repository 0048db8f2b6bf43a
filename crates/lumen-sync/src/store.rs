//! # Persisted Sync State
//!
//! The pipeline persists exactly one record: the last successful push. It is
//! stored through an injected key/value seam rather than ambient global
//! state, so tests and different hosts can supply their own backing.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// Storage key of the last-sync record.
pub const LAST_SYNC_KEY: &str = "last-sync";

// =============================================================================
// State Store Seam
// =============================================================================

/// Host-provided key/value storage.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> SyncResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> SyncResult<()>;
}

// =============================================================================
// Last-Sync Record
// =============================================================================

/// Record of the last successful push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastSyncRecord {
    /// When the push completed.
    pub timestamp: DateTime<Utc>,

    /// `owner/name` of the repository pushed to.
    pub repository: String,

    /// sha256 digest of the pushed canonical export, for local-change
    /// detection.
    pub content_digest: String,

    /// Base-branch head sha at push time, for remote-change detection.
    pub remote_head: Option<String>,
}

impl LastSyncRecord {
    /// Loads the record, if one was ever written.
    pub fn load(store: &dyn StateStore) -> SyncResult<Option<LastSyncRecord>> {
        match store.get(LAST_SYNC_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Persists the record.
    pub fn save(&self, store: &dyn StateStore) -> SyncResult<()> {
        store.set(LAST_SYNC_KEY, &serde_json::to_string(self)?)
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Volatile store for tests and one-shot CLI runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> SyncResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| SyncError::StateStore("store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> SyncResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| SyncError::StateStore("store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// =============================================================================
// File-Backed Store
// =============================================================================

/// JSON-file-backed store under the host config directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> FileStore {
        FileStore { path }
    }

    /// Store at the platform default location (`<config dir>/state.json`).
    pub fn default_location() -> Option<FileStore> {
        directories::ProjectDirs::from("com", "lumen", "lumen-tokens")
            .map(|dirs| FileStore::new(dirs.config_dir().join("state.json")))
    }

    fn read_entries(&self) -> SyncResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| SyncError::StateStore(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| SyncError::StateStore(e.to_string()))
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> SyncResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SyncError::StateStore(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| SyncError::StateStore(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| SyncError::StateStore(e.to_string()))
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> SyncResult<Option<String>> {
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> SyncResult<()> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("key", "value").unwrap();
        assert_eq!(store.get("key").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_last_sync_record_round_trip() {
        let store = MemoryStore::new();
        assert!(LastSyncRecord::load(&store).unwrap().is_none());

        let record = LastSyncRecord {
            timestamp: Utc::now(),
            repository: "acme/design-tokens".to_string(),
            content_digest: "abc123".to_string(),
            remote_head: Some("deadbeef".to_string()),
        };
        record.save(&store).unwrap();

        let loaded = LastSyncRecord::load(&store).unwrap().unwrap();
        assert_eq!(loaded, record);
    }
}
