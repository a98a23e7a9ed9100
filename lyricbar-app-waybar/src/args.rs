//! Parsers for subcommand arguments.

use lyricbar_core::{DurationExt, FilterMode, VolumeChange};
use std::time::Duration;

/// A duration with an explicit sign, e.g. `-10s` or `1m30s`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedDuration {
    pub negative: bool,
    pub magnitude: Duration,
}

impl SignedDuration {
    /// Signed microseconds, as used by MPRIS `Seek`
    #[must_use]
    pub fn as_micros_i64(&self) -> i64 {
        let micros = self.magnitude.as_micros_i64();
        if self.negative {
            -micros
        } else {
            micros
        }
    }
}

/// Parse `[+|-]<number><unit>...` with units `h`, `m`, `s`, `ms`, `us` and
/// `ns`. A bare number is read as seconds.
///
/// # Errors
///
/// Returns a message describing the malformed part.
pub fn parse_signed_duration(input: &str) -> Result<SignedDuration, String> {
    let trimmed = input.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    if body.is_empty() {
        return Err(format!("empty duration {input:?}"));
    }

    if let Ok(secs) = body.parse::<f64>() {
        let magnitude = Duration::try_from_secs_f64(secs).map_err(|e| format!("{input:?}: {e}"))?;
        return Ok(SignedDuration {
            negative,
            magnitude,
        });
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut magnitude = Duration::ZERO;
    let mut rest = body;

    while !rest.is_empty() {
        let unit_start = rest
            .find(|c: char| !is_number(c))
            .ok_or_else(|| format!("missing unit in duration {input:?}"))?;
        let (number, tail) = rest.split_at(unit_start);
        let unit_end = tail.find(is_number).unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);

        let value: f64 = number
            .parse()
            .map_err(|_| format!("invalid number in duration {input:?}"))?;
        let scale = match unit {
            "h" => 3600.0,
            "m" => 60.0,
            "s" => 1.0,
            "ms" => 1e-3,
            "us" | "µs" => 1e-6,
            "ns" => 1e-9,
            _ => return Err(format!("unknown unit {unit:?} in duration {input:?}")),
        };

        magnitude += Duration::try_from_secs_f64(value * scale).map_err(|e| format!("{input:?}: {e}"))?;
        rest = next;
    }

    Ok(SignedDuration {
        negative,
        magnitude,
    })
}

/// Parse `[+|-]<volume>[%]`: `0.5`, `50%`, `+10%`, `-0.05`.
///
/// # Errors
///
/// Returns a message when the number is malformed or an absolute volume is
/// outside 0 to 1 (0% to 100%).
pub fn parse_volume(input: &str) -> Result<VolumeChange, String> {
    let trimmed = input.trim();
    let (sign, body) = if let Some(rest) = trimmed.strip_prefix('+') {
        (Some(1.0), rest)
    } else if let Some(rest) = trimmed.strip_prefix('-') {
        (Some(-1.0), rest)
    } else {
        (None, trimmed)
    };
    let (body, percent) = body
        .strip_suffix('%')
        .map_or((body, false), |rest| (rest, true));

    let mut value: f64 = body
        .trim()
        .parse()
        .map_err(|_| format!("invalid volume {input:?}"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("invalid volume {input:?}"));
    }
    if percent {
        value /= 100.0;
    }

    match sign {
        Some(sign) => Ok(VolumeChange::Adjust(sign * value)),
        None if value <= 1.0 => Ok(VolumeChange::Set(value)),
        None => Err(format!(
            "volume {input:?} is out of range, expected 0-1 or 0-100%"
        )),
    }
}

/// Parse a lyric line number; negative numbers count from the end.
///
/// # Errors
///
/// Returns a message when the input is not an integer.
pub fn parse_line_number(input: &str) -> Result<i64, String> {
    let trimmed = input.trim();
    trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .parse()
        .map_err(|_| format!("invalid line number {input:?}"))
}

/// Parse a profanity filter mode: `full`, `partial`, `off` or empty.
///
/// # Errors
///
/// Returns a message naming the accepted values.
pub fn parse_filter_mode(input: &str) -> Result<FilterMode, String> {
    match input.trim() {
        "" | "off" => Ok(FilterMode::Off),
        "full" => Ok(FilterMode::Full),
        "partial" => Ok(FilterMode::Partial),
        other => Err(format!(
            "profanity filter must be one of 'full' or 'partial', got {other:?}"
        )),
    }
}
