//! Named persisted entries backing the client-side models.
//!
//! Every collection lives under one key and is read and written wholesale as
//! a JSON document on each mutation. [`MemoryStore`] is used by tests;
//! [`FileStore`] keeps one file per key in a data directory. Neither guards
//! against concurrent writers: the last write wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::Result;

/// Entry holding the serialized dog list.
pub const DOGS_KEY: &str = "pupmatch.dogs";
/// Entry holding the serialized adoption records.
pub const ADOPTIONS_KEY: &str = "pupmatch.adoptions";
/// Entry holding the uploaded image map.
pub const UPLOADED_IMAGES_KEY: &str = "pupmatch.uploaded_images";

/// Key/value persistence for serialized collections.
pub trait LocalStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

pub type SharedStore = Arc<dyn LocalStore>;

/// Read `key` and parse it, treating absence and corruption alike as `None`.
///
/// Failures are logged, never returned.
pub fn load_json<T: DeserializeOwned>(store: &dyn LocalStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "failed to read persisted entry; starting empty");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "persisted entry is corrupt; starting empty");
            None
        }
    }
}

/// Serialize `value` and overwrite `key`.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn LocalStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

// ── In-memory ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().ok().and_then(|m| m.get(key).cloned()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Ok(mut map) = self.entries.lock() {
            map.insert(key.to_owned(), value.to_owned());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        if let Ok(mut map) = self.entries.lock() {
            map.remove(key);
        }
        Ok(())
    }
}

// ── File-backed ──────────────────────────────────────────────────────────────

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open `dir`, creating it if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // Write to a sibling file then rename so a crash never leaves half a document.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) fn temp_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pupmatch-{label}-{}", uuid::Uuid::new_v4()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn memory_store_round_trips_and_removes() {
        let store = MemoryStore::new();
        assert_eq!(store.get(DOGS_KEY).unwrap(), None);
        store.set(DOGS_KEY, "[]").unwrap();
        assert_eq!(store.get(DOGS_KEY).unwrap().as_deref(), Some("[]"));
        store.remove(DOGS_KEY).unwrap();
        assert_eq!(store.get(DOGS_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = temp_dir("filestore");
        let first = FileStore::open(&dir).unwrap();
        first.set(ADOPTIONS_KEY, r#"[{"id":"a"}]"#).unwrap();

        let second = FileStore::open(&dir).unwrap();
        assert_eq!(
            second.get(ADOPTIONS_KEY).unwrap().as_deref(),
            Some(r#"[{"id":"a"}]"#)
        );
        second.remove(ADOPTIONS_KEY).unwrap();
        // Removing twice is not an error.
        second.remove(ADOPTIONS_KEY).unwrap();
        assert_eq!(first.get(ADOPTIONS_KEY).unwrap(), None);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn corrupt_entry_loads_as_none() {
        let store = MemoryStore::new();
        store.set(DOGS_KEY, "{not json").unwrap();
        let loaded: Option<Vec<serde_json::Value>> = load_json(&store, DOGS_KEY);
        assert!(loaded.is_none());
    }
}
