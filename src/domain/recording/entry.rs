//! Recording entry and file handle value objects

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::duration::{format_duration, Duration};

const FILE_SCHEME: &str = "file://";

/// Opaque handle to an audio file.
///
/// Local adapters produce `file://` URIs; bare paths are accepted too so
/// that hand-edited or older index files keep working.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileUri(String);

impl FileUri {
    /// Wrap an existing URI string
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Build a `file://` URI from a local path.
    ///
    /// Returns None for a path that is not valid UTF-8, since the URI
    /// could not be turned back into the same path.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref().to_str()?;
        Some(Self(format!("{}{}", FILE_SCHEME, path)))
    }

    /// The raw URI string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Local filesystem path, if this URI points at one
    pub fn to_path(&self) -> Option<PathBuf> {
        if let Some(rest) = self.0.strip_prefix(FILE_SCHEME) {
            return (!rest.is_empty()).then(|| PathBuf::from(rest));
        }
        if self.0.is_empty() || self.0.contains("://") {
            return None;
        }
        Some(PathBuf::from(&self.0))
    }
}

impl fmt::Display for FileUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileUri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A persisted record of one completed recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingEntry {
    file_uri: FileUri,
    duration_millis: u64,
}

impl RecordingEntry {
    pub fn new(file_uri: FileUri, duration_millis: u64) -> Self {
        Self {
            file_uri,
            duration_millis,
        }
    }

    pub fn file_uri(&self) -> &FileUri {
        &self.file_uri
    }

    pub fn duration_millis(&self) -> u64 {
        self.duration_millis
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_millis)
    }

    /// Length formatted as `M:SS`
    pub fn display_duration(&self) -> String {
        format_duration(self.duration_millis)
    }
}

/// Opaque reference to an in-progress capture owned by the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureHandle(u64);

impl CaptureHandle {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(&self) -> u64 {
        self.0
    }
}

/// Opaque reference to a loaded, replayable sound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayableHandle {
    uri: FileUri,
}

impl PlayableHandle {
    pub fn new(uri: FileUri) -> Self {
        Self { uri }
    }

    /// The file this sound was loaded from
    pub fn uri(&self) -> &FileUri {
        &self.uri
    }
}
