//! Durable storage port interfaces

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::FileUri;

/// Storage errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Failed to read from storage: {0}")]
    ReadFailed(String),

    #[error("Failed to write to storage: {0}")]
    WriteFailed(String),

    #[error("Failed to delete {uri}: {message}")]
    DeleteFailed { uri: FileUri, message: String },
}

/// Port for durable string key-value storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Returns
    /// `None` when the key has never been written
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Port for deleting recording files
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Delete the file behind `uri`.
    async fn delete(&self, uri: &FileUri) -> Result<(), StorageError>;
}

/// Blanket implementation for boxed key-value store types
#[async_trait]
impl KeyValueStore for Box<dyn KeyValueStore> {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.as_ref().get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.as_ref().set(key, value).await
    }
}

/// Blanket implementation for boxed file store types
#[async_trait]
impl FileStore for Box<dyn FileStore> {
    async fn delete(&self, uri: &FileUri) -> Result<(), StorageError> {
        self.as_ref().delete(uri).await
    }
}
