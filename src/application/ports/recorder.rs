//! Recording port interfaces

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::{CaptureHandle, FileUri, QualityPreset};

/// Recording errors
#[derive(Debug, Clone, Error)]
pub enum RecordingError {
    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("Recording failed: {0}")]
    RecordingFailed(String),

    #[error("Failed to write audio file: {0}")]
    WriteFailed(String),

    #[error("Unknown capture handle: {0}")]
    UnknownCapture(u64),

    #[error("No audio device available")]
    NoAudioDevice,
}

/// Audio subsystem settings applied before capture begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Put the audio subsystem into a recording-capable mode
    pub allows_recording: bool,
    /// Keep playback audible while the device silent switch is engaged
    pub plays_in_silent_mode: bool,
    /// Quality preset for the captured file
    pub quality: QualityPreset,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            allows_recording: true,
            plays_in_silent_mode: true,
            quality: QualityPreset::High,
        }
    }
}

/// Port for the platform audio recorder
#[async_trait]
pub trait AudioRecorder: Send + Sync {
    /// Configure the audio subsystem and begin capturing.
    ///
    /// # Returns
    /// A handle identifying the in-progress capture
    async fn begin_capture(&self, config: &CaptureConfig) -> Result<CaptureHandle, RecordingError>;

    /// Stop and release the capture, writing it to durable storage.
    ///
    /// # Returns
    /// The URI of the captured file
    async fn end_capture(&self, handle: CaptureHandle) -> Result<FileUri, RecordingError>;
}

/// Blanket implementation for boxed recorder types
#[async_trait]
impl AudioRecorder for Box<dyn AudioRecorder> {
    async fn begin_capture(&self, config: &CaptureConfig) -> Result<CaptureHandle, RecordingError> {
        self.as_ref().begin_capture(config).await
    }

    async fn end_capture(&self, handle: CaptureHandle) -> Result<FileUri, RecordingError> {
        self.as_ref().end_capture(handle).await
    }
}
