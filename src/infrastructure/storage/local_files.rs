//! Local filesystem file store

use std::io::ErrorKind;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::application::ports::{FileStore, StorageError};
use crate::domain::recording::FileUri;

/// Deletes takes from the local filesystem.
///
/// A file that is already gone counts as deleted, so index entries whose
/// file went missing can still be removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn delete(&self, uri: &FileUri) -> Result<(), StorageError> {
        let path = uri.to_path().ok_or_else(|| StorageError::DeleteFailed {
            uri: uri.clone(),
            message: "not a local file".to_string(),
        })?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Deleted recording file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "Recording file already missing");
                Ok(())
            }
            Err(e) => Err(StorageError::DeleteFailed {
                uri: uri.clone(),
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deletes_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.wav");
        std::fs::write(&path, b"RIFF").unwrap();

        LocalFileStore::new()
            .delete(&FileUri::from_path(&path).unwrap())
            .await
            .unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn missing_file_counts_as_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let uri = FileUri::from_path(dir.path().join("gone.wav")).unwrap();
        assert!(LocalFileStore::new().delete(&uri).await.is_ok());
    }

    #[tokio::test]
    async fn directory_cannot_be_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let uri = FileUri::from_path(dir.path()).unwrap();
        assert!(matches!(
            LocalFileStore::new().delete(&uri).await,
            Err(StorageError::DeleteFailed { .. })
        ));
        assert!(dir.path().exists());
    }

    #[tokio::test]
    async fn non_local_uri_is_rejected() {
        let uri = FileUri::new("content://media/1");
        assert!(LocalFileStore::new().delete(&uri).await.is_err());
    }
}
