//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::recording::QualityPreset;

/// Directory name used under the platform data and config directories
pub const APP_DIR_NAME: &str = "voice-memos";

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory new takes are written to
    pub recordings_dir: Option<String>,
    /// JSON file backing the key-value store that holds the recording index
    pub storage_file: Option<String>,
    /// Capture quality preset ("high" or "low")
    pub quality: Option<String>,
    /// Keep playback audible when the device is in silent mode
    pub silent_mode_playback: Option<bool>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            recordings_dir: Some(default_data_dir().join("recordings").display().to_string()),
            storage_file: Some(default_data_dir().join("storage.json").display().to_string()),
            quality: Some(QualityPreset::default().to_string()),
            silent_mode_playback: Some(true),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            recordings_dir: other.recordings_dir.or(self.recordings_dir),
            storage_file: other.storage_file.or(self.storage_file),
            quality: other.quality.or(self.quality),
            silent_mode_playback: other.silent_mode_playback.or(self.silent_mode_playback),
        }
    }

    /// Get the recordings directory, or the platform default if not set
    pub fn recordings_dir_or_default(&self) -> PathBuf {
        self.recordings_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_dir().join("recordings"))
    }

    /// Get the storage file, or the platform default if not set
    pub fn storage_file_or_default(&self) -> PathBuf {
        self.storage_file
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_dir().join("storage.json"))
    }

    /// Get quality as parsed preset, or default if not set/invalid
    pub fn quality_or_default(&self) -> QualityPreset {
        self.quality
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get silent mode playback setting, or true if not set
    pub fn silent_mode_playback_or_default(&self) -> bool {
        self.silent_mode_playback.unwrap_or(true)
    }
}

/// Platform data directory for this application
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join(APP_DIR_NAME)
}
