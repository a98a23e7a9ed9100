//! Text helpers for display: word wrapping, truncation and profanity masking.

use crate::error::{CoreError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

const PROFANITY_LIST: &str = include_str!("../assets/profanity.txt");

const ELLIPSIS: &str = "...";

/// Word-wrap `line` so no row exceeds `limit` characters, except for single
/// words longer than the limit.
#[must_use]
pub fn break_line(line: &str, limit: usize) -> String {
    if line.chars().count() <= limit {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len());
    let mut row_len = 0;

    for word in line.split_whitespace() {
        let word_len = word.chars().count();
        if row_len == 0 {
            out.push_str(word);
            row_len = word_len;
        } else if row_len + word_len < limit {
            out.push(' ');
            out.push_str(word);
            row_len += word_len + 1;
        } else {
            out.push('\n');
            out.push_str(word);
            row_len = word_len;
        }
    }

    out
}

/// Cut `input` to at most `limit` characters, ending in `...` when there is
/// room for it.
#[must_use]
pub fn truncate(input: &str, limit: usize) -> String {
    if input.chars().count() <= limit {
        return input.to_string();
    }

    if limit > ELLIPSIS.len() {
        let mut out: String = input.chars().take(limit - ELLIPSIS.len()).collect();
        out.push_str(ELLIPSIS);
        out
    } else {
        input.chars().take(limit).collect()
    }
}

/// How matched words are masked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Filtering disabled
    #[default]
    #[serde(rename = "", alias = "off")]
    Off,
    /// Every character becomes `*`
    Full,
    /// Keep the first and last character
    Partial,
}

/// Case-insensitive whole-word profanity masking
#[derive(Debug, Clone)]
pub struct ProfanityFilter {
    pattern: Regex,
    mode: FilterMode,
}

impl ProfanityFilter {
    /// Filter using the built-in word list. Returns `None` for
    /// [`FilterMode::Off`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] if the word pattern cannot be
    /// compiled.
    pub fn new(mode: FilterMode) -> Result<Option<Self>> {
        if mode == FilterMode::Off {
            return Ok(None);
        }

        let words = PROFANITY_LIST
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));
        Self::with_words(words, mode).map(Some)
    }

    /// Filter matching the given words.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] if the word pattern cannot be
    /// compiled.
    pub fn with_words<'a>(words: impl IntoIterator<Item = &'a str>, mode: FilterMode) -> Result<Self> {
        let alternation = words
            .into_iter()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");

        let pattern = Regex::new(&format!(r"(?i)\b({alternation})\b")).map_err(|e| {
            CoreError::ConfigInvalid {
                message: format!("profanity word list: {e}"),
            }
        })?;

        Ok(Self { pattern, mode })
    }

    #[must_use]
    pub fn censor(&self, input: &str) -> String {
        self.pattern
            .replace_all(input, |caps: &regex::Captures<'_>| mask(&caps[0], self.mode))
            .into_owned()
    }
}

fn mask(word: &str, mode: FilterMode) -> String {
    let len = word.chars().count();
    match mode {
        FilterMode::Off => word.to_string(),
        FilterMode::Full => "*".repeat(len),
        FilterMode::Partial if len <= 3 => "*".repeat(len),
        FilterMode::Partial => {
            let mut chars = word.chars();
            let first = chars.next().unwrap_or_default();
            let last = chars.next_back().unwrap_or_default();
            format!("{first}{}{last}", "*".repeat(len - 2))
        }
    }
}

/// Escape `&`, `<` and `>` for Pango markup.
#[must_use]
pub fn escape_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
