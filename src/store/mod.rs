//! Local preference store
//!
//! A flat string-keyed store holding JSON blobs. The store has no authority of
//! its own: registries read it once on load and write through on every change.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Well-known keys in the store's flat namespace
pub mod keys {
    pub const TOOLS: &str = "user_custom_tools";
    pub const FAVORITES: &str = "brush_favorites";
    pub const DISPLAY_SETTINGS: &str = "display_settings";
    pub const VIEW_MODE: &str = "brush_view_mode";
    pub const LANGUAGE: &str = "user_language";
}

/// Durable key-value storage
///
/// Implementations are cheap handles onto shared storage, so registries can
/// each hold a clone of the same store.
pub trait PreferenceStore: Clone + Send + Sync {
    /// Read the raw value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Outcome of decoding a stored JSON blob
#[derive(Debug, Clone, PartialEq)]
pub enum Stored<T> {
    Missing,
    Corrupt,
    Value(T),
}

/// Read and decode the JSON blob under `key`, never failing
pub fn read_json<S: PreferenceStore, T: DeserializeOwned>(store: &S, key: &str) -> Stored<T> {
    let Some(raw) = store.get(key) else {
        return Stored::Missing;
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Stored::Value(value),
        Err(e) => {
            tracing::warn!("[Store] Ignoring corrupt value under `{}`: {}", key, e);
            Stored::Corrupt
        }
    }
}

/// Encode `value` and write it under `key`, logging instead of failing
///
/// Returns whether the write reached the store.
pub fn write_json<S: PreferenceStore, T: Serialize + ?Sized>(
    store: &S,
    key: &str,
    value: &T,
) -> bool {
    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(e) => {
            tracing::error!("[Store] Failed to encode `{}`: {}", key, e);
            return false;
        }
    };

    match store.set(key, &encoded) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("[Store] Failed to persist `{}`: {}", key, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_json_states() {
        let store = MemoryStore::new();
        assert_eq!(read_json::<_, Vec<u32>>(&store, "k"), Stored::Missing);

        store.set("k", "[1,2").unwrap();
        assert_eq!(read_json::<_, Vec<u32>>(&store, "k"), Stored::Corrupt);

        store.set("k", "[1,2]").unwrap();
        assert_eq!(read_json::<_, Vec<u32>>(&store, "k"), Stored::Value(vec![1, 2]));
    }

    #[test]
    fn test_write_json_swallows_store_failure() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        assert!(!write_json(&store, "k", &[1, 2, 3]));
        assert_eq!(store.get("k"), None);
    }
}
