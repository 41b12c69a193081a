//! Storage port for persisted application state.
//!
//! All durable state (session, registered accounts, posts) lives in a single
//! key-value backend addressed by logical string keys. The backend is
//! deliberately tiny so the rest of the crate can be tested against an
//! in-memory fake:
//!
//! - `FileStorage`: one `<key>.json` file per key under a data directory
//! - `MemoryStorage`: in-memory map, used in tests and ephemeral runs
//!
//! Typed access goes through `StorageExt::get_json`/`set_json`, which layer
//! validated serde deserialization on top of the raw string port. A value
//! that fails to deserialize surfaces as `StorageError::Malformed` with the
//! offending key.

pub mod file;
pub mod memory;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to read key '{key}'")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write key '{key}'")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data for key '{key}'")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value for key '{key}'")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The persistence boundary: logical string keys mapped to string values.
///
/// Implementations must be safe to share across tasks; callers serialize
/// read-modify-write sequences on their own state, so the backend itself only
/// needs per-call consistency.
pub trait StorageBackend: Send + Sync {
    /// Fetch the raw value for a key, or `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write the raw value for a key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Typed JSON accessors over the raw string port.
pub trait StorageExt: StorageBackend {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get(key)? {
            Some(raw) => {
                let value =
                    serde_json::from_str(&raw).map_err(|source| StorageError::Malformed {
                        key: key.to_string(),
                        source,
                    })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let contents =
            serde_json::to_string_pretty(value).map_err(|source| StorageError::Encode {
                key: key.to_string(),
                source,
            })?;
        self.set(key, &contents)
    }
}

impl<S: StorageBackend + ?Sized> StorageExt for S {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_json_missing_key_is_none() {
        let storage = MemoryStorage::new();
        let value: Option<Vec<String>> = storage.get_json("posts").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let storage = MemoryStorage::new();
        storage
            .set_json("posts", &vec!["a".to_string(), "b".to_string()])
            .unwrap();
        let value: Vec<String> = storage.get_json("posts").unwrap().unwrap();
        assert_eq!(value, vec!["a", "b"]);
    }

    #[test]
    fn test_malformed_value_reports_key() {
        let storage = MemoryStorage::new();
        storage.set("user", "{not json").unwrap();

        let err = storage.get_json::<Vec<String>>("user").unwrap_err();
        match err {
            StorageError::Malformed { key, .. } => assert_eq!(key, "user"),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_remove_clears_key() {
        let storage = MemoryStorage::new();
        storage.set("user", "{}").unwrap();
        storage.remove("user").unwrap();
        assert!(storage.get("user").unwrap().is_none());

        // Removing again is a no-op
        storage.remove("user").unwrap();
    }
}
