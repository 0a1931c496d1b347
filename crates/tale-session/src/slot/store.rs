//! Key-value backends for save slots.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// A string-keyed persistence facility.
///
/// Every write replaces the whole value; there are no partial updates.
pub trait SlotStore {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// An in-memory store, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
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

impl SlotStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A directory-backed store: one file per key.
///
/// Writes go to a temporary file that is then renamed over the target, so a
/// reader never observes a half-written save.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!(path = %dir.display(), "Opened slot directory");
        Ok(Self { dir })
    }

    /// The directory holding the files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::Unavailable(format!("invalid key \"{key}\"")));
        }
        Ok(self.dir.join(format!("{key}.sav")))
    }
}

impl SlotStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("sav.tmp");
        fs::write(&tmp, value)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.get("a").unwrap().is_none());

        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn dir_store_round_trip() {
        let tmp = TempDir::new().unwrap();
        let mut store = DirStore::open(tmp.path().join("saves")).unwrap();

        assert!(store.get("tale_save_1").unwrap().is_none());
        store.set("tale_save_1", "{\"x\":1}").unwrap();
        assert_eq!(
            store.get("tale_save_1").unwrap().as_deref(),
            Some("{\"x\":1}")
        );
        assert!(store.dir().join("tale_save_1.sav").exists());
        assert!(!store.dir().join("tale_save_1.sav.tmp").exists());

        store.remove("tale_save_1").unwrap();
        store.remove("tale_save_1").unwrap();
        assert!(store.get("tale_save_1").unwrap().is_none());
    }

    #[test]
    fn dir_store_persists_across_handles() {
        let tmp = TempDir::new().unwrap();
        DirStore::open(tmp.path())
            .unwrap()
            .set("tale_active_slot", "2")
            .unwrap();
        let reopened = DirStore::open(tmp.path()).unwrap();
        assert_eq!(
            reopened.get("tale_active_slot").unwrap().as_deref(),
            Some("2")
        );
    }

    #[test]
    fn dir_store_rejects_path_keys() {
        let tmp = TempDir::new().unwrap();
        let mut store = DirStore::open(tmp.path()).unwrap();
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[test]
    fn dir_store_cleans_up_failed_write() {
        let tmp = TempDir::new().unwrap();
        let mut store = DirStore::open(tmp.path()).unwrap();
        // A directory in the way makes the final rename fail.
        fs::create_dir(tmp.path().join("tale_save_1.sav")).unwrap();

        assert!(matches!(
            store.set("tale_save_1", "x"),
            Err(StoreError::Io(_))
        ));
        assert!(!tmp.path().join("tale_save_1.sav.tmp").exists());
    }
}
