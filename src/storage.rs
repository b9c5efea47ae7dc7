// Persistence collaborator. The store reads one snapshot at startup and
// writes back the persisted subset of state after each mutation; everything
// else (tabs, active tab) deliberately starts fresh every launch.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::state::{default_bookmarks, default_quick_links, Bookmark, HistoryEntry, QuickLink, Theme};

/// Namespace key for the persisted snapshot.
pub const STORAGE_KEY: &str = "atom-browser-storage";

/// The subset of browser state that survives restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub bookmarks: Vec<Bookmark>,
    pub history: Vec<HistoryEntry>,
    pub quick_links: Vec<QuickLink>,
    pub theme: Theme,
    pub has_completed_onboarding: bool,
}

impl Default for Snapshot {
    /// First-launch state: seed bookmarks and quick links, empty visit log.
    fn default() -> Self {
        Self {
            bookmarks: default_bookmarks(),
            history: Vec::new(),
            quick_links: default_quick_links(),
            theme: Theme::default(),
            has_completed_onboarding: false,
        }
    }
}

/// Injected key-value persistence. `load` returns `None` when no usable
/// snapshot exists (first launch, or an unreadable file).
pub trait StorageBackend: Send + Sync {
    fn load(&self) -> Result<Option<Snapshot>, StoreError>;
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// JSON-file storage under an application data directory.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join(format!("{}.json", STORAGE_KEY)),
        }
    }
}

impl StorageBackend for JsonFileStorage {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(snapshot) => Ok(Some(snapshot)),
                Err(e) => {
                    log::warn!("[Storage] Failed to parse {:?}: {}, using defaults", self.path, e);
                    Ok(None)
                }
            },
            Err(e) => {
                log::warn!("[Storage] Failed to read {:?}: {}, using defaults", self.path, e);
                Ok(None)
            }
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let tmp_path = self.path.with_extension("tmp");
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;

        // Atomic write strategy: write to tmp, then rename.
        // This ensures we never have a half-written file if the app crashes.
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}

/// In-memory storage for tests and embedders that manage persistence
/// themselves.
#[derive(Default)]
pub struct MemoryStorage {
    snapshot: Mutex<Option<Snapshot>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-load a snapshot, as if a previous session had saved it.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.snapshot.lock().unwrap().clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        *self.snapshot.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().to_path_buf());
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().to_path_buf());

        let mut snapshot = Snapshot::default();
        snapshot.theme = Theme::Dark;
        snapshot.has_completed_onboarding = true;
        storage.save(&snapshot).unwrap();

        let loaded = storage.load().unwrap().expect("snapshot should exist");
        assert_eq!(loaded.theme, Theme::Dark);
        assert!(loaded.has_completed_onboarding);
        assert_eq!(loaded.bookmarks.len(), snapshot.bookmarks.len());
        assert_eq!(loaded.quick_links.len(), snapshot.quick_links.len());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("{}.json", STORAGE_KEY));
        fs::write(&path, "{ not json").unwrap();

        let storage = JsonFileStorage::new(dir.path().to_path_buf());
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_snapshot_wire_format_is_camel_case() {
        let json = serde_json::to_string(&Snapshot::default()).unwrap();
        assert!(json.contains("\"quickLinks\""));
        assert!(json.contains("\"hasCompletedOnboarding\""));
        assert!(json.contains("\"createdAt\""));
    }

    #[test]
    fn test_memory_storage_round_trips() {
        let storage = MemoryStorage::new();
        assert!(storage.load().unwrap().is_none());

        storage.save(&Snapshot::default()).unwrap();
        assert!(storage.load().unwrap().is_some());
    }

    #[test]
    fn test_default_snapshot_carries_seed_data() {
        let snapshot = Snapshot::default();
        assert_eq!(snapshot.bookmarks.len(), 2);
        assert_eq!(snapshot.quick_links.len(), 6);
        assert!(snapshot.history.is_empty());
        assert_eq!(snapshot.theme, Theme::System);
        assert!(!snapshot.has_completed_onboarding);
    }
}
