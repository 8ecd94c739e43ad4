//! Key-value store backed by a single JSON file

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::application::ports::{KeyValueStore, StorageError};

/// Key-value store persisted as one JSON object of string values.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// original, so a crash mid-write leaves the previous contents intact.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StorageError::ReadFailed(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            StorageError::ReadFailed(format!("{} is not a valid store: {}", self.path.display(), e))
        })
    }

    async fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let write_err = |e: std::io::Error| {
            StorageError::WriteFailed(format!("{}: {}", self.path.display(), e))
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let content = serde_json::to_string_pretty(values)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, content).await.map_err(write_err)?;
        fs::rename(&tmp, &self.path).await.map_err(write_err)?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut values = self.read_all().await?;
        Ok(values.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.read_all().await?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values).await?;
        debug!(key, path = %self.path.display(), "Store updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = JsonFileStore::new(&path);
        store.set("a", "1").await.unwrap();
        store.set("b", "[2]").await.unwrap();
        store.set("a", "3").await.unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("a").await.unwrap().as_deref(), Some("3"));
        assert_eq!(reopened.get("b").await.unwrap().as_deref(), Some("[2]"));
        assert!(!dir.path().join("nested").join("store.json.tmp").exists());
    }

    #[tokio::test]
    async fn malformed_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.get("k").await,
            Err(StorageError::ReadFailed(_))
        ));
        // A broken store is never overwritten
        assert!(store.set("k", "v").await.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");
    }
}
