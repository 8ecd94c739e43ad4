//! Rodio-based playback adapter
//!
//! Loads takes from local files and plays them on the default output device.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, Sink, Source};
use tracing::debug;

use crate::application::ports::{AudioPlayer, LoadedSound, PlaybackError};
use crate::domain::recording::{FileUri, PlayableHandle};

/// Audio player implementation using rodio
pub struct RodioPlayer;

impl RodioPlayer {
    /// Create a new rodio-based player
    pub fn new() -> Self {
        Self
    }

    fn local_path(uri: &FileUri) -> Result<PathBuf, PlaybackError> {
        let path = uri
            .to_path()
            .ok_or_else(|| PlaybackError::LoadFailed(format!("Not a local file: {}", uri)))?;
        if !path.is_file() {
            return Err(PlaybackError::FileMissing(uri.clone()));
        }
        Ok(path)
    }
}

impl Default for RodioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the length of a WAV file from its header
fn wav_duration_millis(path: &Path) -> Option<u64> {
    let reader = hound::WavReader::open(path).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    Some(u64::from(reader.duration()) * 1000 / u64::from(spec.sample_rate))
}

/// Ask the decoder for the length of any other supported format
fn decoded_duration_millis(path: &Path) -> Result<u64, PlaybackError> {
    let file = File::open(path).map_err(|e| PlaybackError::LoadFailed(e.to_string()))?;
    let decoder =
        Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::LoadFailed(e.to_string()))?;

    match decoder.total_duration() {
        Some(duration) => Ok(duration.as_millis() as u64),
        None => {
            // Fall back to counting samples
            let sample_rate = u64::from(decoder.sample_rate());
            let channels = u64::from(decoder.channels());
            if sample_rate == 0 || channels == 0 {
                return Err(PlaybackError::LoadFailed("Unknown stream layout".to_string()));
            }
            let samples = decoder.count() as u64;
            Ok(samples / channels * 1000 / sample_rate)
        }
    }
}

fn load_sync(uri: FileUri) -> Result<LoadedSound, PlaybackError> {
    let path = RodioPlayer::local_path(&uri)?;
    let duration_millis = match wav_duration_millis(&path) {
        Some(millis) => millis,
        None => decoded_duration_millis(&path)?,
    };

    debug!(uri = %uri, duration_millis, "Loaded sound");
    Ok(LoadedSound {
        handle: PlayableHandle::new(uri),
        duration_millis,
    })
}

/// Play a file synchronously (called from spawn_blocking)
fn replay_sync(uri: FileUri) -> Result<(), PlaybackError> {
    let path = RodioPlayer::local_path(&uri)?;
    let file = File::open(&path).map_err(|e| PlaybackError::LoadFailed(e.to_string()))?;
    let source =
        Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::LoadFailed(e.to_string()))?;

    let (_stream, stream_handle) = OutputStream::try_default()
        .map_err(|e| PlaybackError::DeviceNotAvailable(e.to_string()))?;
    let sink =
        Sink::try_new(&stream_handle).map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))?;

    sink.append(source);
    sink.sleep_until_end();

    Ok(())
}

#[async_trait]
impl AudioPlayer for RodioPlayer {
    async fn load_for_playback(&self, uri: &FileUri) -> Result<LoadedSound, PlaybackError> {
        let uri = uri.clone();
        tokio::task::spawn_blocking(move || load_sync(uri))
            .await
            .map_err(|e| PlaybackError::LoadFailed(format!("Task join error: {}", e)))?
    }

    async fn replay(&self, handle: &PlayableHandle) -> Result<(), PlaybackError> {
        let uri = handle.uri().clone();
        tokio::task::spawn_blocking(move || replay_sync(uri))
            .await
            .map_err(|e| PlaybackError::PlaybackFailed(format!("Task join error: {}", e)))?
    }
}
