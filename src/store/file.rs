//! JSON-file backed store
//!
//! The whole namespace lives in one JSON object file. Every write rewrites the
//! file; reads are served from the in-memory copy loaded at open.

use super::PreferenceStore;
use crate::error::StoreError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const APP_DIR: &str = "meow-brush-favorites";
const FILE_NAME: &str = "preferences.json";

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl FileStore {
    /// Default location under the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(FILE_NAME))
    }

    /// Open the store at `path`
    ///
    /// A missing file opens as an empty store. A corrupt file also opens
    /// empty (and is overwritten on the next write) rather than failing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(
                        "[Store] {} is corrupt, starting empty: {}",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!("[Store] Opened {} ({} keys)", path.display(), entries.len());

        Ok(Self {
            path,
            entries: Arc::new(Mutex::new(entries)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush(&entries) {
            // Keep memory and disk consistent
            match previous {
                Some(previous) => entries.insert(key.to_string(), previous),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        if let Some(previous) = entries.remove(key) {
            if let Err(e) = self.flush(&entries) {
                entries.insert(key.to_string(), previous);
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let store = FileStore::open(&path).unwrap();
        store.set("brush_view_mode", "detail").unwrap();
        store.set("user_language", "ja").unwrap();
        store.remove("user_language").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("brush_view_mode").as_deref(), Some("detail"));
        assert_eq!(reopened.get("user_language"), None);
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("anything"), None);
    }

    /// Put a directory where the file goes so every flush fails
    fn block_file(path: &Path) {
        fs::remove_file(path).unwrap();
        fs::create_dir(path).unwrap();
    }

    #[test]
    fn test_failed_set_keeps_previous_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        let store = FileStore::open(&path).unwrap();
        store.set("brush_view_mode", "minimal").unwrap();
        block_file(&path);

        assert!(store.set("brush_view_mode", "detail").is_err());
        assert_eq!(store.get("brush_view_mode").as_deref(), Some("minimal"));

        assert!(store.set("user_language", "ja").is_err());
        assert_eq!(store.get("user_language"), None);
    }

    #[test]
    fn test_failed_remove_keeps_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        let store = FileStore::open(&path).unwrap();
        store.set("user_language", "ja").unwrap();
        block_file(&path);

        assert!(matches!(store.remove("user_language"), Err(StoreError::Io(_))));
        assert_eq!(store.get("user_language").as_deref(), Some("ja"));
    }
}
