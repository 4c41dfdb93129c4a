//! The persistence port shared by every store.
//!
//! A [`Storage`] maps validated keys to JSON documents. Stores never talk to a
//! backend directly; they go through [`Backing`], which turns backend failures
//! into a one-time notice and keeps the session running from memory.

use crate::error::{CycleError, Result};
use crate::notice::{NoticeKind, Notifier};
use crate::paths;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub trait Storage: Send + Sync {
    /// Read the document stored under `key`. Absent and corrupt documents are
    /// both `Ok(None)`; `Err` means the medium itself is unavailable.
    fn load(&self, key: &str) -> Result<Option<Value>>;

    fn save(&self, key: &str, value: &Value) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// One pretty-printed JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage rooted at `<root>/.rethread/state`.
    pub fn for_root(root: &Path) -> Self {
        Self::new(paths::state_dir(root))
    }
}

fn unavailable(key: &str, err: impl std::fmt::Display) -> CycleError {
    CycleError::PersistenceUnavailable(format!("{key}: {err}"))
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        paths::validate_key(key)?;
        let path = paths::key_path(&self.dir, key);
        // Bytes, not a String: invalid UTF-8 is corrupt content, not a dead medium.
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(unavailable(key, e)),
        };
        match serde_json::from_slice(&data) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, path = %path.display(), error = %e, "discarding corrupt document");
                Ok(None)
            }
        }
    }

    fn save(&self, key: &str, value: &Value) -> Result<()> {
        paths::validate_key(key)?;
        let path = paths::key_path(&self.dir, key);
        let data = serde_json::to_string_pretty(value)?;
        crate::io::atomic_write(&path, data.as_bytes()).map_err(|e| unavailable(key, e))?;
        tracing::debug!(key, path = %path.display(), "saved document");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        paths::validate_key(key)?;
        match std::fs::remove_file(paths::key_path(&self.dir, key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(unavailable(key, e)),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// Process-local storage. Clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    docs: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn docs(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Value>> {
        self.docs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        paths::validate_key(key)?;
        Ok(self.docs().get(key).cloned())
    }

    fn save(&self, key: &str, value: &Value) -> Result<()> {
        paths::validate_key(key)?;
        self.docs().insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        paths::validate_key(key)?;
        self.docs().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Backing
// ---------------------------------------------------------------------------

/// A store's connection to the persistence port.
///
/// The first failed read or write flips the backing into degraded mode: a
/// single `PersistenceUnavailable` notice is sent and later writes are
/// skipped, leaving the in-memory state authoritative for the session.
#[derive(Clone)]
pub struct Backing {
    storage: Arc<dyn Storage>,
    notifier: Notifier,
    degraded: bool,
}

impl Backing {
    pub fn new(storage: Arc<dyn Storage>, notifier: Notifier) -> Self {
        Self {
            storage,
            notifier,
            degraded: false,
        }
    }

    /// In-memory backing with no listener, for callers that don't persist.
    pub fn ephemeral() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Notifier::silent())
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Load and decode `key`. Anything unusable yields `None`.
    pub fn hydrate<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = match self.storage.load(key) {
            Ok(Some(value)) => value,
            Ok(None) => {
                tracing::debug!(key, "no stored document, starting empty");
                return None;
            }
            Err(e) => {
                self.degrade(key, &e);
                return None;
            }
        };
        match serde_json::from_value(value) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored document has the wrong shape, discarding");
                None
            }
        }
    }

    /// Write `state` under `key` unless the backing is already degraded.
    /// Returns whether the write reached the storage.
    pub fn persist<T: Serialize>(&mut self, key: &str, state: &T) -> bool {
        if self.degraded {
            return false;
        }
        let result = serde_json::to_value(state)
            .map_err(CycleError::from)
            .and_then(|value| self.storage.save(key, &value));
        match result {
            Ok(()) => true,
            Err(e) => {
                self.degrade(key, &e);
                false
            }
        }
    }

    fn degrade(&mut self, key: &str, err: &CycleError) {
        tracing::warn!(key, error = %err, "persistence unavailable, continuing in memory");
        if !self.degraded {
            self.degraded = true;
            self.notifier.warn(
                NoticeKind::PersistenceUnavailable,
                format!("{err}; changes may not survive a reload"),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::notice;
    use serde_json::json;
    use tempfile::TempDir;

    /// Storage whose medium is always unavailable.
    pub(crate) struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn load(&self, key: &str) -> Result<Option<Value>> {
            Err(unavailable(key, "medium offline"))
        }
        fn save(&self, key: &str, _value: &Value) -> Result<()> {
            Err(unavailable(key, "quota exceeded"))
        }
        fn remove(&self, key: &str) -> Result<()> {
            Err(unavailable(key, "medium offline"))
        }
    }

    #[test]
    fn file_roundtrip_on_fresh_instance() {
        let dir = TempDir::new().unwrap();
        let doc = json!({ "p1": { "c1": true } });
        FileStorage::new(dir.path()).save("checklist", &doc).unwrap();

        let loaded = FileStorage::new(dir.path()).load("checklist").unwrap();
        assert_eq!(loaded, Some(doc));
    }

    #[test]
    fn file_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(FileStorage::new(dir.path()).load("rotation").unwrap(), None);
    }

    #[test]
    fn file_corrupt_is_none() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("checklist.json"), "{not json").unwrap();
        assert_eq!(FileStorage::new(dir.path()).load("checklist").unwrap(), None);
    }

    #[test]
    fn file_invalid_utf8_is_none() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("checklist.json"), [0xff, 0xfe]).unwrap();
        assert_eq!(FileStorage::new(dir.path()).load("checklist").unwrap(), None);
    }

    #[test]
    fn file_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.save("home", &json!({})).unwrap();
        storage.remove("home").unwrap();
        storage.remove("home").unwrap();
        assert_eq!(storage.load("home").unwrap(), None);
    }

    #[test]
    fn invalid_key_rejected() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.save("../etc", &json!(1)),
            Err(CycleError::InvalidKey(_))
        ));
    }

    #[test]
    fn memory_clones_share_documents() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.save("navigator", &json!({ "current": "p2" })).unwrap();
        assert_eq!(b.load("navigator").unwrap(), Some(json!({ "current": "p2" })));
    }

    #[test]
    fn backing_degrades_once_on_write_failure() {
        let (notifier, rx) = notice::channel();
        let mut backing = Backing::new(Arc::new(BrokenStorage), notifier);

        assert!(!backing.persist("checklist", &json!({})));
        assert!(!backing.persist("checklist", &json!({})));
        assert!(backing.is_degraded());

        let notices: Vec<_> = rx.try_iter().collect();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::PersistenceUnavailable);
    }

    #[test]
    fn backing_hydrate_wrong_shape_is_none() {
        let storage = MemoryStorage::new();
        storage.save("rotation", &json!([1, 2, 3])).unwrap();
        let mut backing = Backing::new(Arc::new(storage), Notifier::silent());
        let loaded: Option<BTreeMap<String, String>> = backing.hydrate("rotation");
        assert!(loaded.is_none());
        assert!(!backing.is_degraded());
    }

    #[test]
    fn backing_hydrate_unavailable_degrades() {
        let mut backing = Backing::new(Arc::new(BrokenStorage), Notifier::silent());
        let loaded: Option<Value> = backing.hydrate("checklist");
        assert!(loaded.is_none());
        assert!(backing.is_degraded());
    }
}
