//! Recording infrastructure module
//!
//! Captures from the default input device with cpal and writes each take
//! as a 16-bit PCM WAV file.

mod cpal_recorder;
mod wav;

pub use cpal_recorder::CpalRecorder;
pub use wav::{take_file_name, write_wav};
