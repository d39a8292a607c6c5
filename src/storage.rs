//! Durable local storage: keyed string entries, each rewritten in full.
//!
//! The eligibility profile and the list of started applications live under
//! the keys below; contact details keep their own keys in `contact`. No entry
//! is patched; every mutation rewrites it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::StorageError;

/// Well-known storage keys.
pub mod keys {
    pub const PROFILE: &str = "hulpwijzer_eligibility_data";
    pub const APPLICATIONS: &str = "hulpwijzer_applications";
}

/// Synchronous key/value storage with full-overwrite semantics.
pub trait LocalStorage: Send + Sync {
    /// Read an entry. A missing entry is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite an entry.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete an entry. Deleting a missing entry is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Serialize `value` as JSON and overwrite `key`.
pub fn write_json<T: serde::Serialize + ?Sized>(
    storage: &dyn LocalStorage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value).map_err(|source| StorageError::Serialization {
        key: key.to_string(),
        source,
    })?;
    storage.set(key, &json)
}

/// One JSON file per key inside a data directory.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file store rooted at `base_path`. The directory is created on first write.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.json"))
    }

    fn io_err(key: &str) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
        move |source| StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl LocalStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.entry_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_err(key)(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.base_path).map_err(Self::io_err(key))?;
        std::fs::write(self.entry_path(key), value).map_err(Self::io_err(key))?;
        tracing::debug!(key, bytes = value.len(), "Storage entry written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_err(key)(e)),
        }
    }
}

/// In-memory storage for tests and throwaway runs.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds whole entries; writes are single inserts.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LocalStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_storage_roundtrip() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));
        assert_eq!(storage.get(keys::PROFILE).unwrap(), None);

        storage.set(keys::PROFILE, "{\"a\":1}").unwrap();
        assert_eq!(storage.get(keys::PROFILE).unwrap().as_deref(), Some("{\"a\":1}"));

        storage.set(keys::PROFILE, "{}").unwrap();
        assert_eq!(storage.get(keys::PROFILE).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn file_storage_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set(keys::APPLICATIONS, "[]").unwrap();
        storage.remove(keys::APPLICATIONS).unwrap();
        storage.remove(keys::APPLICATIONS).unwrap();
        assert_eq!(storage.get(keys::APPLICATIONS).unwrap(), None);
    }

    #[test]
    fn entries_are_independent() {
        let storage = MemoryStorage::new();
        storage.set(keys::PROFILE, "p").unwrap();
        storage.set(keys::APPLICATIONS, "a").unwrap();
        storage.remove(keys::PROFILE).unwrap();
        assert_eq!(storage.get(keys::PROFILE).unwrap(), None);
        assert_eq!(storage.get(keys::APPLICATIONS).unwrap().as_deref(), Some("a"));
    }

    #[test]
    fn write_json_serializes() {
        let storage = MemoryStorage::new();
        write_json(&storage, "k", &vec![1, 2, 3]).unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("[1,2,3]"));
    }
}
