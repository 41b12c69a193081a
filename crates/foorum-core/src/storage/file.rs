use std::path::PathBuf;

use tracing::debug;

use super::{StorageBackend, StorageError};

/// File-backed storage: each logical key is stored as `<key>.json` inside a
/// single directory. Values are written whole on every `set`, so a crash
/// never leaves a key half-updated across files.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::Write {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| StorageError::Read {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key);
        std::fs::write(&path, value).map_err(|source| StorageError::Write {
            key: key.to_string(),
            source,
        })?;
        debug!(key, bytes = value.len(), "wrote storage key");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|source| StorageError::Write {
                key: key.to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageExt;

    #[test]
    fn test_set_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.set("posts", "[]").unwrap();
        assert_eq!(storage.get("posts").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert!(storage.get("user").unwrap().is_none());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
            storage.set_json("registeredUsers", &vec!["x".to_string()]).unwrap();
        }

        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let users: Vec<String> = storage.get_json("registeredUsers").unwrap().unwrap();
        assert_eq!(users, vec!["x"]);
    }

    #[test]
    fn test_remove_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.set("user", "{}").unwrap();
        storage.remove("user").unwrap();
        assert!(storage.get("user").unwrap().is_none());
        assert!(!dir.path().join("user.json").exists());
    }
}
