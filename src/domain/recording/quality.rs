//! Recording quality presets

use std::fmt;
use std::str::FromStr;

/// Capture quality preset handed to the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualityPreset {
    /// Device sample rate, up to two channels
    #[default]
    High,
    /// Device sample rate, mixed down to mono
    Low,
}

impl QualityPreset {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }

    /// Number of channels to keep for a device offering `device_channels`
    pub fn output_channels(&self, device_channels: u16) -> u16 {
        match self {
            Self::High => device_channels.clamp(1, 2),
            Self::Low => 1,
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            other => Err(format!(
                "Invalid quality preset: \"{}\". Valid presets are: high, low",
                other
            )),
        }
    }
}
