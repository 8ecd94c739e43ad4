//! WAV output for captured takes

use std::path::Path;

use chrono::{DateTime, Local};
use hound::{SampleFormat, WavSpec, WavWriter};

use crate::application::ports::RecordingError;

/// File name for a take started at `at`, e.g. `take_2024-03-01_09-30-12-345.wav`
pub fn take_file_name(at: DateTime<Local>) -> String {
    format!("take_{}.wav", at.format("%Y-%m-%d_%H-%M-%S-%3f"))
}

/// Write interleaved 16-bit samples to a WAV file.
///
/// # Returns
/// The number of frames written
pub fn write_wav(
    path: &Path,
    samples: &[i16],
    sample_rate: u32,
    channels: u16,
) -> Result<u64, RecordingError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            RecordingError::WriteFailed(format!("{}: {}", parent.display(), e))
        })?;
    }

    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)
        .map_err(|e| RecordingError::WriteFailed(format!("{}: {}", path.display(), e)))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| RecordingError::WriteFailed(e.to_string()))?;
    }

    writer
        .finalize()
        .map_err(|e| RecordingError::WriteFailed(e.to_string()))?;

    Ok(samples.len() as u64 / u64::from(channels.max(1)))
}
