use crate::error::{CoreError, Result};
use crate::time::{parse_timestamp, serialize_secs};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// A single line of lyrics with timing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LyricLine {
    #[serde(rename = "time", serialize_with = "serialize_secs")]
    pub timestamp: Duration,
    #[serde(rename = "line")]
    pub text: String,
    /// Set on the line currently being sung when building a context window
    pub active: bool,
}

impl LyricLine {
    pub fn new(timestamp: Duration, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            text: text.into(),
            active: false,
        }
    }

    /// The blank line at timestamp zero that stands for "before the first lyric".
    #[must_use]
    pub fn prelude() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_prelude(&self) -> bool {
        self.timestamp.is_zero() && self.text.is_empty()
    }
}

/// An ordered sequence of synchronized lyric lines.
///
/// An empty sequence is used by the memory store to record that a track was
/// looked up and has no lyrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lyrics {
    lines: Vec<LyricLine>,
}

impl Lyrics {
    #[must_use]
    pub const fn from_lines(lines: Vec<LyricLine>) -> Self {
        Self { lines }
    }

    /// Parse synced lyrics text where every line looks like `[mm:ss.xx]text`.
    ///
    /// The first `]` ends the timestamp. Lines without a `]` or with a timestamp
    /// that does not parse (ID tags such as `[ar:Artist]`, plain text) are
    /// skipped. The result starts with a [`LyricLine::prelude`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LyricsNotSynced`] when no timed line was found.
    pub fn parse(input: &str) -> Result<Self> {
        let mut lines = vec![LyricLine::prelude()];

        for line in input.lines() {
            if line.is_empty() {
                continue;
            }

            let Some((stamp, text)) = line.split_once(']') else {
                continue;
            };
            let stamp = stamp.strip_prefix('[').unwrap_or(stamp);

            match parse_timestamp(stamp) {
                Ok(timestamp) => lines.push(LyricLine::new(timestamp, text.trim())),
                Err(e) => debug!("Skipping lyric line {:?}: {}", line, e),
            }
        }

        if lines.len() == 1 {
            return Err(CoreError::LyricsNotSynced);
        }

        Ok(Self { lines })
    }

    /// Sort lines by timestamp. Lines sharing a timestamp keep their order.
    pub fn sort(&mut self) {
        self.lines.sort_by_key(|line| line.timestamp);
    }

    /// Make sure the sequence starts with the blank prelude line.
    pub fn ensure_prelude(&mut self) {
        if !self.lines.first().is_some_and(LyricLine::is_prelude) {
            self.lines.insert(0, LyricLine::prelude());
        }
    }

    /// Rewrite the text of every line, e.g. to censor it.
    pub fn map_text(&mut self, mut f: impl FnMut(&str) -> String) {
        for line in &mut self.lines {
            line.text = f(&line.text);
        }
    }

    /// Index of the line being sung at `position`: the last line whose
    /// timestamp is not after `position`. When several lines share that
    /// timestamp the last of them wins.
    ///
    /// Expects sorted lines. Returns 0 when every line is in the future.
    #[must_use]
    pub fn active_index(&self, position: Duration) -> usize {
        self.lines
            .partition_point(|line| line.timestamp <= position)
            .saturating_sub(1)
    }

    /// Lines around `index` for display: up to `before` lines ahead of it and
    /// `total` lines overall. Returns the index of the first returned line.
    #[must_use]
    pub fn window(&self, index: usize, before: usize, total: usize) -> (usize, &[LyricLine]) {
        let start = index.saturating_sub(before);
        let end = (index + total).saturating_sub(before).min(self.lines.len());
        let start = start.min(end);
        (start, &self.lines[start..end])
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LyricLine> {
        self.lines.get(index)
    }

    #[must_use]
    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LyricLine> {
        self.lines.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<'a> IntoIterator for &'a Lyrics {
    type Item = &'a LyricLine;
    type IntoIter = std::slice::Iter<'a, LyricLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
