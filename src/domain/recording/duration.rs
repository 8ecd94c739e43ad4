//! Duration value object and `M:SS` clock formatting

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Format a millisecond count as `M:SS`.
///
/// Minutes are unbounded and not zero padded. Seconds are rounded half-up
/// to the nearest whole second and always two digits. The rounding happens
/// on the total before it is split, so `59_500` becomes `1:00` rather than
/// `0:60`.
pub fn format_duration(millis: u64) -> String {
    let total_secs = millis / 1000 + u64::from(millis % 1000 >= 500);
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Value object representing a time duration.
/// Immutable and validated on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    /// Create a Duration from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    /// Create a Duration from seconds, saturating at `u64::MAX` milliseconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs.saturating_mul(1000),
        }
    }

    /// Milliseconds in `minutes` plus `seconds`, or None on overflow
    fn checked_total(minutes: u64, seconds: u64) -> Option<u64> {
        minutes
            .checked_mul(60)?
            .checked_add(seconds)?
            .checked_mul(1000)
    }

    /// Get duration in whole seconds (truncated)
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    /// Get duration in milliseconds
    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    /// Convert to std::time::Duration
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }

    /// Parse the clock form `M:SS` (as stored by older index files)
    fn parse_clock(input: &str, original: &str) -> Result<Self, DurationParseError> {
        let err = || DurationParseError {
            input: original.to_string(),
        };

        let (minutes, seconds) = input.split_once(':').ok_or_else(err)?;
        if minutes.is_empty()
            || seconds.len() != 2
            || !minutes.chars().all(|c| c.is_ascii_digit())
            || !seconds.chars().all(|c| c.is_ascii_digit())
        {
            return Err(err());
        }

        let minutes: u64 = minutes.parse().map_err(|_| err())?;
        let seconds: u64 = seconds.parse().map_err(|_| err())?;
        // Older index files can hold an uncarried `M:60`
        if seconds > 60 {
            return Err(err());
        }

        let total_ms = Self::checked_total(minutes, seconds).ok_or_else(err)?;
        Ok(Self::from_millis(total_ms))
    }

    /// Parse the unit form `30s`, `1m`, `2m30s`
    fn parse_units(input: &str, original: &str) -> Result<Self, DurationParseError> {
        let err = || DurationParseError {
            input: original.to_string(),
        };

        let mut minutes: u64 = 0;
        let mut seconds: u64 = 0;
        let mut current_num = String::new();
        let mut found_any = false;

        for ch in input.chars() {
            if ch.is_ascii_digit() {
                current_num.push(ch);
            } else if ch == 'm' && !current_num.is_empty() {
                minutes = current_num.parse().map_err(|_| err())?;
                current_num.clear();
                found_any = true;
            } else if ch == 's' && !current_num.is_empty() {
                seconds = current_num.parse().map_err(|_| err())?;
                current_num.clear();
                found_any = true;
            } else {
                return Err(err());
            }
        }

        // Leftover digits without a unit are invalid
        if !current_num.is_empty() || !found_any {
            return Err(err());
        }

        let total_ms = Self::checked_total(minutes, seconds).ok_or_else(err)?;
        if total_ms == 0 {
            return Err(err());
        }

        Ok(Self {
            milliseconds: total_ms,
        })
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Parse a duration string.
    /// Supported formats: "30s", "1m", "2m30s" and the clock form "1:05"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_lowercase();

        if input.contains(':') {
            Self::parse_clock(&input, s)
        } else {
            Self::parse_units(&input, s)
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.milliseconds))
    }
}
