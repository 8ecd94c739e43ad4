//! Persisted recording index
//!
//! The index is an ordered list of [`RecordingEntry`] values stored as one
//! JSON document under [`INDEX_KEY`]. Every mutation rewrites the whole
//! document; the list is expected to stay small.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::recording::{Duration, FileUri, RecordingEntry};

use super::ports::{FileStore, KeyValueStore, StorageError};

/// Key holding the serialized index in the key-value store
pub const INDEX_KEY: &str = "locallyStoredAudio";

/// Recording index errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Recording index is corrupt: {0}")]
    Corrupt(String),

    #[error("No recording with uri {0}")]
    NotFound(FileUri),
}

/// On-disk shape of one entry.
///
/// `durationMillis` is written. The `M:SS` string under `duration` is the
/// older format and is only read.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    file: FileUri,
    #[serde(rename = "durationMillis", skip_serializing_if = "Option::is_none")]
    duration_millis: Option<u64>,
    #[serde(default, skip_serializing)]
    duration: Option<String>,
}

impl StoredEntry {
    fn from_entry(entry: &RecordingEntry) -> Self {
        Self {
            file: entry.file_uri().clone(),
            duration_millis: Some(entry.duration_millis()),
            duration: None,
        }
    }

    fn into_entry(self, position: usize) -> Result<RecordingEntry, IndexError> {
        let duration_millis = match (self.duration_millis, self.duration) {
            (Some(millis), _) => millis,
            (None, Some(clock)) => clock
                .parse::<Duration>()
                .map_err(|e| IndexError::Corrupt(format!("entry {}: {}", position, e)))?
                .as_millis(),
            (None, None) => {
                return Err(IndexError::Corrupt(format!(
                    "entry {} has no duration",
                    position
                )))
            }
        };

        Ok(RecordingEntry::new(self.file, duration_millis))
    }
}

fn decode(json: &str) -> Result<Vec<RecordingEntry>, IndexError> {
    let stored: Vec<StoredEntry> =
        serde_json::from_str(json).map_err(|e| IndexError::Corrupt(e.to_string()))?;

    stored
        .into_iter()
        .enumerate()
        .map(|(position, entry)| entry.into_entry(position))
        .collect()
}

fn encode(entries: &[RecordingEntry]) -> Result<String, IndexError> {
    let stored: Vec<StoredEntry> = entries.iter().map(StoredEntry::from_entry).collect();
    serde_json::to_string(&stored).map_err(|e| StorageError::WriteFailed(e.to_string()).into())
}

/// Ordered, persisted list of recordings.
///
/// Callers serialize `append` and `remove`; the index has no internal locking.
pub struct RecordingIndex<S, F>
where
    S: KeyValueStore,
    F: FileStore,
{
    store: S,
    files: F,
    entries: Vec<RecordingEntry>,
}

impl<S, F> RecordingIndex<S, F>
where
    S: KeyValueStore,
    F: FileStore,
{
    /// Create an index with no entries. Call [`load`](Self::load) to read
    /// the persisted state.
    pub fn new(store: S, files: F) -> Self {
        Self {
            store,
            files,
            entries: Vec::new(),
        }
    }

    /// Create an index and load the persisted state
    pub async fn open(store: S, files: F) -> Result<Self, IndexError> {
        let mut index = Self::new(store, files);
        index.load().await?;
        Ok(index)
    }

    pub fn entries(&self) -> &[RecordingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, uri: &FileUri) -> Option<&RecordingEntry> {
        self.entries.iter().find(|entry| entry.file_uri() == uri)
    }

    /// Entry by 1-based take number
    pub fn find_take(&self, take: usize) -> Option<&RecordingEntry> {
        take.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Replace the in-memory list with the persisted one.
    ///
    /// A missing key is a first run and yields no entries. A malformed
    /// document is an error and leaves the current entries untouched.
    pub async fn load(&mut self) -> Result<&[RecordingEntry], IndexError> {
        let entries = match self.store.get(INDEX_KEY).await? {
            Some(json) => decode(&json)?,
            None => {
                debug!("No persisted index, starting empty");
                Vec::new()
            }
        };

        debug!(count = entries.len(), "Index loaded");
        self.entries = entries;
        Ok(&self.entries)
    }

    /// Add an entry at the end and persist.
    ///
    /// If persisting fails the entry is dropped again, so memory matches
    /// the last successful write.
    pub async fn append(&mut self, entry: RecordingEntry) -> Result<(), IndexError> {
        self.entries.push(entry);

        if let Err(err) = self.persist().await {
            if let Some(entry) = self.entries.pop() {
                warn!(uri = %entry.file_uri(), error = %err, "Append not persisted");
            }
            return Err(err);
        }

        info!(count = self.entries.len(), "Recording added to index");
        Ok(())
    }

    /// Delete a recording's file and drop it from the index.
    ///
    /// The file is deleted first. If that fails nothing else changes and
    /// the entry stays listed. If the rewrite fails afterwards the
    /// in-memory list is restored and the error returned.
    ///
    /// # Returns
    /// The number of entries removed
    pub async fn remove(&mut self, uri: &FileUri) -> Result<usize, IndexError> {
        if self.get(uri).is_none() {
            return Err(IndexError::NotFound(uri.clone()));
        }

        self.files.delete(uri).await?;

        let previous = self.entries.clone();
        self.entries.retain(|entry| entry.file_uri() != uri);
        let removed = previous.len() - self.entries.len();

        if let Err(err) = self.persist().await {
            warn!(uri = %uri, error = %err, "File deleted but index not rewritten");
            self.entries = previous;
            return Err(err);
        }

        info!(uri = %uri, removed, "Recording removed from index");
        Ok(removed)
    }

    async fn persist(&self) -> Result<(), IndexError> {
        let json = encode(&self.entries)?;
        self.store.set(INDEX_KEY, &json).await?;
        Ok(())
    }
}
