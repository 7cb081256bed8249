//! The persisted key-value store - the only coupling surface between the
//! clue tracker and the ending gate.
//!
//! The store is localStorage-shaped: string keys, string values, synchronous
//! access. Every value under [`keys`] is a JSON array of strings except
//! [`keys::FINAL_CHOICE`], which is a single JSON string. Readers fail open:
//! missing or malformed data decodes to the empty default, never an error.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Stable keys of the save format.
pub mod keys {
    /// JSON array of discovered clue id strings.
    pub const CLUE_PROGRESS: &str = "clueTrackerProgress";

    /// JSON array of clue ids queued by pages with no live tracker.
    pub const PENDING_UNLOCKS: &str = "pendingClueUnlocks";

    /// JSON array of visited page paths, deduplicated.
    pub const VISITED_PAGES: &str = "visitedPages";

    /// JSON array of viewed ending keys. Earlier builds wrote the viewed
    /// list here; it is read as a fallback when `ENDING_CHOICES` is empty.
    pub const PLAYER_CHOICES: &str = "playerChoices";

    /// JSON array of viewed ending keys, append-only.
    pub const ENDING_CHOICES: &str = "playerEndingChoices";

    /// Single JSON string: the most recently selected ending key.
    pub const FINAL_CHOICE: &str = "finalEndingChoice";

    /// JSON array of achievement ids of the form `ending_<key>`.
    pub const ACHIEVEMENTS: &str = "achievements";
}

/// The persistence seam injected into both runtime components.
pub trait ProgressStore {
    /// Fetch the raw value for a key.
    fn get(&self, key: &str) -> Option<String>;

    /// Write the raw value for a key.
    fn set(&mut self, key: &str, value: String);

    /// Delete a key.
    fn remove(&mut self, key: &str);
}

/// In-memory store for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ProgressStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Errors from opening or flushing a [`FileStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write-through JSON-file-backed store, for running the game outside a
/// browser-like host.
///
/// A missing file opens as an empty store; a corrupt file does too. Write
/// failures after open are dropped: persistence trouble must not halt the
/// host.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    /// Open a store backed by the given file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_default(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, entries })
    }

    /// Write the current contents to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

impl ProgressStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
        let _ = self.flush();
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        let _ = self.flush();
    }
}

/// Read a JSON string-array value. Missing or malformed data decodes to an
/// empty list so a damaged save can never block the story.
pub fn read_list(store: &dyn ProgressStore, key: &str) -> Vec<String> {
    store
        .get(key)
        .map(|text| serde_json::from_str(&text).unwrap_or_default())
        .unwrap_or_default()
}

/// Write a JSON string-array value.
pub fn write_list(store: &mut dyn ProgressStore, key: &str, items: &[String]) {
    if let Ok(text) = serde_json::to_string(items) {
        store.set(key, text);
    }
}

/// Append a value to a JSON string-array if absent. Returns true when the
/// list changed.
pub fn append_unique(store: &mut dyn ProgressStore, key: &str, value: &str) -> bool {
    let mut items = read_list(store, key);
    if items.iter().any(|item| item == value) {
        return false;
    }
    items.push(value.to_string());
    write_list(store, key, &items);
    true
}

/// Read a single JSON string value.
pub fn read_string(store: &dyn ProgressStore, key: &str) -> Option<String> {
    let text = store.get(key)?;
    serde_json::from_str(&text).ok()
}

/// Write a single JSON string value.
pub fn write_string(store: &mut dyn ProgressStore, key: &str, value: &str) {
    if let Ok(text) = serde_json::to_string(value) {
        store.set(key, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("k", "v".to_string());
        assert_eq!(store.get("k").as_deref(), Some("v"));
        assert!(store.contains("k"));
        assert_eq!(store.len(), 1);

        store.remove("k");
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_list_round_trip() {
        let mut store = MemoryStore::new();
        let items = vec!["a".to_string(), "b".to_string()];

        write_list(&mut store, keys::CLUE_PROGRESS, &items);
        assert_eq!(read_list(&store, keys::CLUE_PROGRESS), items);
    }

    #[test]
    fn test_missing_list_is_empty() {
        let store = MemoryStore::new();
        assert!(read_list(&store, keys::CLUE_PROGRESS).is_empty());
    }

    #[test]
    fn test_malformed_list_fails_open() {
        let mut store = MemoryStore::new();
        store.set(keys::CLUE_PROGRESS, "{not json".to_string());
        assert!(read_list(&store, keys::CLUE_PROGRESS).is_empty());

        // Valid JSON of the wrong shape fails open too.
        store.set(keys::CLUE_PROGRESS, "{\"a\": 1}".to_string());
        assert!(read_list(&store, keys::CLUE_PROGRESS).is_empty());
    }

    #[test]
    fn test_append_unique() {
        let mut store = MemoryStore::new();

        assert!(append_unique(&mut store, keys::VISITED_PAGES, "index.html"));
        assert!(!append_unique(&mut store, keys::VISITED_PAGES, "index.html"));
        assert!(append_unique(&mut store, keys::VISITED_PAGES, "about.html"));

        assert_eq!(
            read_list(&store, keys::VISITED_PAGES),
            vec!["index.html".to_string(), "about.html".to_string()]
        );
    }

    #[test]
    fn test_string_round_trip() {
        let mut store = MemoryStore::new();

        write_string(&mut store, keys::FINAL_CHOICE, "meta");
        assert_eq!(
            read_string(&store, keys::FINAL_CHOICE).as_deref(),
            Some("meta")
        );

        // The raw value is JSON-quoted.
        assert_eq!(store.get(keys::FINAL_CHOICE).as_deref(), Some("\"meta\""));
    }

    #[test]
    fn test_malformed_string_is_none() {
        let mut store = MemoryStore::new();
        store.set(keys::FINAL_CHOICE, "[1, 2]".to_string());
        assert_eq!(read_string(&store, keys::FINAL_CHOICE), None);
    }

    #[test]
    fn test_file_store_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("save.json")).unwrap();
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn test_file_store_corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn test_file_store_write_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set("k", "v".to_string());
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_file_store_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set("k", "v".to_string());
        store.remove("k");
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("k"), None);
    }
}
