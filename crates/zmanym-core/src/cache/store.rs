//! Storage backends for the cache and preferences.
//!
//! A backend is a flat string-to-string map. `MemoryStore` is used in tests
//! and for throwaway sessions; `FileStore` keeps one JSON file per key.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    async fn keys(&self) -> Result<Vec<String>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.lock().await.keys().cloned().collect())
    }
}

/// One `<key>.json` file per entry under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

const FILE_EXTENSION: &str = "json";

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keys become file names, so only a conservative character set is allowed.
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", key, FILE_EXTENSION)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write atomically via temp file
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, value).await?;
        tokio::fs::rename(&temp_path, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(keys),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.read("zmanym_location").await.unwrap(), None);

        store.write("zmanym_location", "{\"a\":1}").await.unwrap();
        store.write("zmanym_cache_daily_zmanim_281184_2026-10-16", "{}").await.unwrap();
        assert_eq!(
            store.read("zmanym_location").await.unwrap().as_deref(),
            Some("{\"a\":1}")
        );

        // Overwrite wins
        store.write("zmanym_location", "{\"a\":2}").await.unwrap();
        assert_eq!(
            store.read("zmanym_location").await.unwrap().as_deref(),
            Some("{\"a\":2}")
        );

        let mut keys = store.keys().await.unwrap();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "zmanym_cache_daily_zmanim_281184_2026-10-16".to_string(),
                "zmanym_location".to_string()
            ]
        );

        store.remove("zmanym_location").await.unwrap();
        store.remove("zmanym_location").await.unwrap();
        assert_eq!(store.read("zmanym_location").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store() {
        exercise(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("cache")).unwrap();
        exercise(&store).await;
        assert!(store.dir().ends_with("cache"));
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        assert!(matches!(
            store.write("../escape", "x").await,
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.read("").await, Err(StoreError::InvalidKey(_))));
        assert!(matches!(
            store.read("zip 10001").await,
            Err(StoreError::InvalidKey(_))
        ));
    }
}
