//! Cross-platform audio recorder using cpal
//!
//! Each capture runs on its own thread: cpal::Stream is not Send, so the
//! stream is built, played and dropped there. Samples are collected as
//! interleaved i16 at the device sample rate and written out as WAV when
//! the capture ends.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::thread::JoinHandle;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Local;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::wav::{take_file_name, write_wav};
use crate::application::ports::{AudioRecorder, CaptureConfig, RecordingError};
use crate::domain::recording::{CaptureHandle, FileUri};

/// How often the capture thread checks for a stop request
const STOP_POLL_INTERVAL: StdDuration = StdDuration::from_millis(20);

/// Stream layout as written to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CaptureFormat {
    sample_rate: u32,
    channels: u16,
}

/// Book-keeping for one in-progress capture
struct ActiveCapture {
    stop: Arc<AtomicBool>,
    samples: Arc<StdMutex<Vec<i16>>>,
    format: CaptureFormat,
    thread: JoinHandle<()>,
}

/// Audio recorder using the default cpal input device
pub struct CpalRecorder {
    /// Directory takes are written to
    output_dir: PathBuf,
    next_id: AtomicU64,
    captures: StdMutex<HashMap<u64, ActiveCapture>>,
}

impl CpalRecorder {
    /// Create a recorder writing takes into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            next_id: AtomicU64::new(0),
            captures: StdMutex::new(HashMap::new()),
        }
    }

    /// Get the default input device
    fn get_input_device() -> Result<cpal::Device, RecordingError> {
        let host = cpal::default_host();
        host.default_input_device()
            .ok_or(RecordingError::NoAudioDevice)
    }

    /// Reduce interleaved frames of `channels` to `keep` channels.
    /// Mono output averages all channels; otherwise the first `keep` are kept.
    fn downmix(samples: &[i16], channels: u16, keep: u16) -> Vec<i16> {
        if channels == keep || channels == 0 {
            return samples.to_vec();
        }

        let frame = usize::from(channels);
        if keep == 1 {
            return samples
                .chunks(frame)
                .map(|chunk| {
                    let sum: i32 = chunk.iter().map(|&s| i32::from(s)).sum();
                    (sum / chunk.len() as i32) as i16
                })
                .collect();
        }

        samples
            .chunks(frame)
            .flat_map(|chunk| chunk.iter().take(usize::from(keep)).copied())
            .collect()
    }

    fn f32_to_i16(sample: f32) -> i16 {
        (sample.clamp(-1.0, 1.0) * 32767.0) as i16
    }

    fn build_stream(
        device: &cpal::Device,
        config: &StreamConfig,
        sample_format: SampleFormat,
        keep: u16,
        samples: Arc<StdMutex<Vec<i16>>>,
    ) -> Result<cpal::Stream, RecordingError> {
        let channels = config.channels;
        let on_error = |err: cpal::StreamError| warn!(error = %err, "Audio stream error");

        let stream = match sample_format {
            SampleFormat::I16 => device.build_input_stream(
                config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let frames = CpalRecorder::downmix(data, channels, keep);
                    if let Ok(mut buffer) = samples.lock() {
                        buffer.extend_from_slice(&frames);
                    }
                },
                on_error,
                None,
            ),
            SampleFormat::F32 => device.build_input_stream(
                config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let converted: Vec<i16> =
                        data.iter().map(|&s| CpalRecorder::f32_to_i16(s)).collect();
                    let frames = CpalRecorder::downmix(&converted, channels, keep);
                    if let Ok(mut buffer) = samples.lock() {
                        buffer.extend_from_slice(&frames);
                    }
                },
                on_error,
                None,
            ),
            other => {
                return Err(RecordingError::StartFailed(format!(
                    "Unsupported sample format: {:?}",
                    other
                )))
            }
        };

        stream.map_err(|e| RecordingError::StartFailed(e.to_string()))
    }

    /// Body of the capture thread. Reports the stream format (or the start
    /// error) through `ready`, then keeps the stream alive until `stop`.
    fn run_capture(
        capture: CaptureConfig,
        stop: Arc<AtomicBool>,
        samples: Arc<StdMutex<Vec<i16>>>,
        ready: oneshot::Sender<Result<CaptureFormat, RecordingError>>,
    ) {
        let started = (|| {
            let device = Self::get_input_device()?;
            let supported = device
                .default_input_config()
                .map_err(|e| RecordingError::StartFailed(format!("Failed to get config: {}", e)))?;

            let sample_format = supported.sample_format();
            let config: StreamConfig = supported.config();
            let keep = capture.quality.output_channels(config.channels);

            let stream = Self::build_stream(&device, &config, sample_format, keep, samples)?;
            stream
                .play()
                .map_err(|e| RecordingError::StartFailed(e.to_string()))?;

            let format = CaptureFormat {
                sample_rate: config.sample_rate.0,
                channels: keep,
            };
            Ok::<_, RecordingError>((stream, format))
        })();

        let stream = match started {
            Ok((stream, format)) => {
                if ready.send(Ok(format)).is_err() {
                    return;
                }
                stream
            }
            Err(err) => {
                let _ = ready.send(Err(err));
                return;
            }
        };

        while !stop.load(Ordering::SeqCst) {
            std::thread::sleep(STOP_POLL_INTERVAL);
        }

        drop(stream);
    }

    fn lock_captures(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<u64, ActiveCapture>>, RecordingError> {
        self.captures
            .lock()
            .map_err(|e| RecordingError::RecordingFailed(format!("Capture table poisoned: {}", e)))
    }

    /// Track a started capture. The capture thread is told to stop if it
    /// cannot be tracked.
    fn register(&self, capture: ActiveCapture) -> Result<u64, RecordingError> {
        let mut captures = match self.lock_captures() {
            Ok(captures) => captures,
            Err(err) => {
                capture.stop.store(true, Ordering::SeqCst);
                return Err(err);
            }
        };
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        captures.insert(id, capture);
        Ok(id)
    }

    /// Takes are addressed by `file://` uri, so the directory must be UTF-8
    fn check_output_dir(&self) -> Result<(), RecordingError> {
        match self.output_dir.to_str() {
            Some(_) => Ok(()),
            None => Err(RecordingError::StartFailed(format!(
                "Recordings directory is not valid UTF-8: {}",
                self.output_dir.display()
            ))),
        }
    }
}

#[async_trait]
impl AudioRecorder for CpalRecorder {
    async fn begin_capture(&self, config: &CaptureConfig) -> Result<CaptureHandle, RecordingError> {
        if !config.allows_recording {
            return Err(RecordingError::StartFailed(
                "Audio mode does not allow recording".to_string(),
            ));
        }
        self.check_output_dir()?;
        // Desktop audio has no silent switch, so the flag needs no setup here
        debug!(
            quality = %config.quality,
            plays_in_silent_mode = config.plays_in_silent_mode,
            "Configuring audio input"
        );

        let stop = Arc::new(AtomicBool::new(false));
        let samples = Arc::new(StdMutex::new(Vec::new()));
        let (ready_tx, ready_rx) = oneshot::channel();

        let thread = {
            let capture = *config;
            let stop = Arc::clone(&stop);
            let samples = Arc::clone(&samples);
            std::thread::Builder::new()
                .name("voice-memos-capture".to_string())
                .spawn(move || CpalRecorder::run_capture(capture, stop, samples, ready_tx))
                .map_err(|e| RecordingError::StartFailed(e.to_string()))?
        };

        let format = match ready_rx.await {
            Ok(Ok(format)) => format,
            Ok(Err(err)) => return Err(err),
            Err(_) => {
                return Err(RecordingError::StartFailed(
                    "Capture thread exited before starting".to_string(),
                ))
            }
        };

        let id = self.register(ActiveCapture {
            stop,
            samples,
            format,
            thread,
        })?;

        info!(
            capture = id,
            sample_rate = format.sample_rate,
            channels = format.channels,
            "Capture started"
        );
        Ok(CaptureHandle::new(id))
    }

    async fn end_capture(&self, handle: CaptureHandle) -> Result<FileUri, RecordingError> {
        let capture = self
            .lock_captures()?
            .remove(&handle.id())
            .ok_or(RecordingError::UnknownCapture(handle.id()))?;

        capture.stop.store(true, Ordering::SeqCst);
        let path = self.output_dir.join(take_file_name(Local::now()));
        let uri = FileUri::from_path(&path).ok_or_else(|| {
            RecordingError::RecordingFailed(format!(
                "Take path is not valid UTF-8: {}",
                path.display()
            ))
        })?;
        let format = capture.format;

        let written = tokio::task::spawn_blocking(move || {
            capture
                .thread
                .join()
                .map_err(|_| RecordingError::RecordingFailed("Capture thread panicked".into()))?;

            let samples = {
                let mut buffer = capture.samples.lock().map_err(|e| {
                    RecordingError::RecordingFailed(format!("Sample buffer poisoned: {}", e))
                })?;
                std::mem::take(&mut *buffer)
            };

            if samples.is_empty() {
                return Err(RecordingError::RecordingFailed(
                    "No audio data captured".to_string(),
                ));
            }

            let frames = write_wav(&path, &samples, format.sample_rate, format.channels)?;
            Ok::<_, RecordingError>((path, frames))
        })
        .await
        .map_err(|e| RecordingError::RecordingFailed(format!("Task join error: {}", e)))??;

        let (path, frames) = written;
        debug!(path = %path.display(), frames, "Take written");
        Ok(uri)
    }
}
