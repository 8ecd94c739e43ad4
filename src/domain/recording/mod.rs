//! Recording value objects

pub mod duration;
pub mod entry;
pub mod quality;

pub use duration::{format_duration, Duration};
pub use entry::{CaptureHandle, FileUri, PlayableHandle, RecordingEntry};
pub use quality::QualityPreset;
