//! Playback port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::{FileUri, PlayableHandle};

/// Playback errors
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("Audio file not found: {0}")]
    FileMissing(FileUri),

    #[error("Failed to load audio file: {0}")]
    LoadFailed(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),
}

/// A sound loaded and ready to replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSound {
    pub handle: PlayableHandle,
    pub duration_millis: u64,
}

/// Port for the platform audio player
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Load a file into a playback-capable handle and read its duration.
    async fn load_for_playback(&self, uri: &FileUri) -> Result<LoadedSound, PlaybackError>;

    /// Play a loaded sound from the beginning until it ends.
    async fn replay(&self, handle: &PlayableHandle) -> Result<(), PlaybackError>;
}

/// Blanket implementation for boxed player types
#[async_trait]
impl AudioPlayer for Box<dyn AudioPlayer> {
    async fn load_for_playback(&self, uri: &FileUri) -> Result<LoadedSound, PlaybackError> {
        self.as_ref().load_for_playback(uri).await
    }

    async fn replay(&self, handle: &PlayableHandle) -> Result<(), PlaybackError> {
        self.as_ref().replay(handle).await
    }
}
