//! Timestamp parsing and duration conversion utilities.
//!
//! Timestamps are the bracketed `[H:MM:SS.ss]` tokens found in LRC files.
//! Between one and three colon separated parts are accepted; the rightmost
//! part is seconds (fractions allowed), then minutes, then hours.

use crate::error::{CoreError, Result};
use serde::Serializer;
use std::time::Duration;

/// Unit of each timestamp part, rightmost first.
const PART_UNITS: [u64; 3] = [1, 60, 60 * 60];

/// Parse an LRC timestamp such as `"1:23:45.5"`, `"03:12.40"` or `"42"`.
///
/// Whitespace around each part is ignored.
///
/// # Errors
///
/// Returns [`CoreError::InvalidTimestamp`] when there are more than three
/// parts, when any part is empty or not a number, or when a part is negative.
pub fn parse_timestamp(input: &str) -> Result<Duration> {
    let invalid = |reason| CoreError::InvalidTimestamp {
        input: input.to_string(),
        reason,
    };

    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() > PART_UNITS.len() {
        return Err(invalid("more than three parts"));
    }

    let mut total = Duration::ZERO;
    for (part, unit) in parts.iter().rev().zip(PART_UNITS) {
        let value: f64 = part
            .trim()
            .parse()
            .map_err(|_| invalid("part is not a number"))?;

        if value.is_sign_negative() {
            return Err(invalid("part is negative"));
        }
        if !value.is_finite() {
            return Err(invalid("part is not finite"));
        }

        #[allow(clippy::cast_precision_loss)]
        let part_duration = Duration::try_from_secs_f64(value * unit as f64)
            .map_err(|_| invalid("part is out of range"))?;
        total = total
            .checked_add(part_duration)
            .ok_or_else(|| invalid("timestamp is out of range"))?;
    }

    Ok(total)
}

/// Format a duration as `M:SS.ss`, or `H:MM:SS.ss` once it reaches an hour.
///
/// The output is accepted by [`parse_timestamp`].
#[must_use]
pub fn format_timestamp(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let hundredths = duration.subsec_millis() / 10;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}.{hundredths:02}")
    } else {
        format!("{minutes:02}:{seconds:02}.{hundredths:02}")
    }
}

/// Serialize a duration as fractional seconds.
///
/// # Errors
///
/// Propagates the serializer's error.
pub fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Extension trait for safe Duration conversions.
pub trait DurationExt {
    /// Convert duration to nanoseconds as u64, saturating at `u64::MAX`.
    ///
    /// `u64::MAX` nanoseconds is roughly 584 years, far beyond any track.
    fn as_nanos_u64(&self) -> u64;

    /// Convert duration to microseconds as i64, saturating at `i64::MAX`.
    ///
    /// MPRIS expresses positions and offsets as signed microseconds.
    fn as_micros_i64(&self) -> i64;
}

impl DurationExt for Duration {
    fn as_nanos_u64(&self) -> u64 {
        u64::try_from(self.as_nanos()).unwrap_or(u64::MAX)
    }

    fn as_micros_i64(&self) -> i64 {
        i64::try_from(self.as_micros()).unwrap_or(i64::MAX)
    }
}
