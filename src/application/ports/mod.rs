//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod permission;
pub mod player;
pub mod recorder;
pub mod share;
pub mod storage;

// Re-export common types
pub use config::ConfigStore;
pub use permission::{MicrophonePermission, Permission};
pub use player::{AudioPlayer, LoadedSound, PlaybackError};
pub use recorder::{AudioRecorder, CaptureConfig, RecordingError};
pub use share::{ShareError, ShareTarget};
pub use storage::{FileStore, KeyValueStore, StorageError};
