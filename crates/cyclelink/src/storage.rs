//! Key-value storage for ride session state.
//!
//! A single trait `StorageBackend` over string keys and values, with one
//! concrete implementation: `FileStorage`, a JSON file holding a map of
//! key -> value in a per-user configuration directory. The file is read into
//! memory on init; mutations update memory and flush back to disk
//! synchronously. Session bookkeeping goes through the trait so tests can
//! point it at a scratch directory.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Platform storage error: {0}")]
    Platform(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Simple generic storage backend trait.
///
/// Keys and values are UTF-8 strings; anything structured is encoded by the
/// caller.
pub trait StorageBackend: Send + Sync {
    /// Store a string value for a key.
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Read a string value for a key. Returns Ok(None) when key is missing.
    fn get_string(&self, key: &str) -> StorageResult<Option<String>>;

    /// Remove a key (no-op if key does not exist).
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Try to obtain all stored keys (optional optimization).
    fn keys(&self) -> StorageResult<Vec<String>> {
        // Default implementation: not required for all backends.
        Ok(Vec::new())
    }
}

/// File-based storage: a single JSON file holding a map of key -> string value.
pub struct FileStorage {
    /// Path to the backing JSON file.
    path: PathBuf,
    /// In-memory copy of key -> value
    inner: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Determine a good default storage file path for the current user.
    /// Uses environment variables when available:
    /// - On Windows: %APPDATA%/CycleLink/storage.json
    /// - Else: $HOME/.config/cyclelink/storage.json
    fn default_storage_path() -> PathBuf {
        // Prefer APPDATA on Windows
        if cfg!(windows)
            && let Ok(appdata) = std::env::var("APPDATA")
        {
            return Path::new(&appdata).join("CycleLink").join("storage.json");
        }

        if let Ok(home) = std::env::var("HOME") {
            return Path::new(&home)
                .join(".config")
                .join("cyclelink")
                .join("storage.json");
        }

        // Fallback to current directory
        Path::new(".").join("cyclelink-storage.json")
    }

    pub fn new_with_path(path: Option<PathBuf>) -> Result<Self, StorageError> {
        let path = path.unwrap_or_else(Self::default_storage_path);

        // Ensure parent directory exists
        if let Some(parent) = path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            return Err(StorageError::Io(format!(
                "Failed to create storage parent directory: {}",
                e
            )));
        }

        // Read file if present
        let mut map: HashMap<String, String> = HashMap::new();
        if path.exists() {
            let mut file = fs::File::open(&path)
                .map_err(|e| StorageError::Io(format!("Failed to open storage file: {}", e)))?;
            let mut s = String::new();
            file.read_to_string(&mut s)
                .map_err(|e| StorageError::Io(format!("Failed to read storage file: {}", e)))?;
            if !s.trim().is_empty() {
                match serde_json::from_str::<HashMap<String, String>>(&s) {
                    Ok(m) => map = m,
                    Err(e) => {
                        return Err(StorageError::Json(format!(
                            "Failed to parse storage JSON: {}",
                            e
                        )));
                    }
                }
            }
        } else {
            let _ = fs::File::create(&path)
                .map_err(|e| StorageError::Io(format!("Failed to create storage file: {}", e)))?;
        }

        Ok(FileStorage {
            path,
            inner: Mutex::new(map),
        })
    }

    fn flush_locked(&self, locked: &HashMap<String, String>) -> StorageResult<()> {
        let s = serde_json::to_string_pretty(locked)
            .map_err(|e| StorageError::Json(e.to_string()))?;
        fs::write(&self.path, s).map_err(|e| StorageError::Io(format!("write failed: {}", e)))
    }
}

impl StorageBackend for FileStorage {
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| StorageError::Platform(format!("mutex poisoned: {:?}", e)))?;
        guard.insert(key.to_string(), value.to_string());
        self.flush_locked(&guard)
    }

    fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        let guard = self
            .inner
            .lock()
            .map_err(|e| StorageError::Platform(format!("mutex poisoned: {:?}", e)))?;
        Ok(guard.get(key).cloned())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| StorageError::Platform(format!("mutex poisoned: {:?}", e)))?;
        guard.remove(key);
        self.flush_locked(&guard)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let guard = self
            .inner
            .lock()
            .map_err(|e| StorageError::Platform(format!("mutex poisoned: {:?}", e)))?;
        Ok(guard.keys().cloned().collect())
    }
}

/// The default backend for the current user: file storage under the
/// per-user configuration directory.
pub fn default_backend() -> StorageResult<Arc<dyn StorageBackend>> {
    Ok(Arc::new(FileStorage::new_with_path(None)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage(dir: &TempDir) -> FileStorage {
        FileStorage::new_with_path(Some(dir.path().join("storage.json"))).unwrap()
    }

    #[test]
    fn test_set_get_remove_roundtrip() {
        let dir = TempDir::new().unwrap();
        let storage = create_test_storage(&dir);

        assert_eq!(storage.get_string("k").unwrap(), None);
        storage.set_string("k", "v").unwrap();
        assert_eq!(storage.get_string("k").unwrap(), Some("v".to_string()));
        storage.remove("k").unwrap();
        assert_eq!(storage.get_string("k").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");

        let storage = FileStorage::new_with_path(Some(path.clone())).unwrap();
        storage.set_string("session", "abc-123").unwrap();
        drop(storage);

        let reopened = FileStorage::new_with_path(Some(path)).unwrap();
        assert_eq!(
            reopened.get_string("session").unwrap(),
            Some("abc-123".to_string())
        );
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let dir = TempDir::new().unwrap();
        let storage = create_test_storage(&dir);
        storage.remove("never-set").unwrap();
    }

    #[test]
    fn test_keys_lists_stored_entries() {
        let dir = TempDir::new().unwrap();
        let storage = create_test_storage(&dir);
        storage.set_string("a", "1").unwrap();
        storage.set_string("b", "2").unwrap();

        let mut keys = storage.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_corrupted_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            FileStorage::new_with_path(Some(path)),
            Err(StorageError::Json(_))
        ));
    }

    #[test]
    fn test_missing_parent_directory_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deep").join("storage.json");
        let storage = FileStorage::new_with_path(Some(path.clone())).unwrap();
        storage.set_string("k", "v").unwrap();
        assert!(path.exists());
    }
}
