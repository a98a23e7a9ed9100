//! Waybar custom-module output.
//!
//! Every emission is one line on the writer: a JSON object by default, the
//! bare text in compact mode.

use crate::config::OutputConfig;
use crate::lrc::{LyricLine, Lyrics};
use crate::player::{PlaybackStatus, PlayerSnapshot};
use crate::text::{break_line, escape_markup, truncate};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Shown in the tooltip in place of an empty line
const EMPTY_LINE_ICON: &str = "󰝚 ";

/// Lines shown above the active line in the tooltip
const CONTEXT_BEFORE: usize = 2;

/// State tags used for both `alt` and `class`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Music,
    Lyric,
    Playing,
    Paused,
    NoLyric,
}

/// One Waybar update
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Waybar {
    pub text: String,
    pub class: Vec<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<Status>,
    pub tooltip: String,
    pub percentage: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<PlayerSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<LyricLine>>,
}

impl Waybar {
    /// The empty update, shown when there is no player or track.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Artist and title only, for tracks without usable lyrics.
    #[must_use]
    pub fn for_player(snapshot: &PlayerSnapshot, config: &OutputConfig) -> Self {
        let alt = if snapshot.status == PlaybackStatus::Paused {
            Status::Paused
        } else {
            Status::Playing
        };

        let text = if config.lyric_only {
            String::new()
        } else {
            snapshot.display_title()
        };

        Self {
            text,
            class: vec![alt],
            alt: Some(alt),
            tooltip: String::new(),
            percentage: snapshot.percentage(),
            info: config.detailed.then(|| snapshot.clone()),
            context: None,
        }
    }

    /// The line at `index` with a tooltip of the surrounding lines.
    #[must_use]
    pub fn for_lyrics(lyrics: &Lyrics, index: usize, config: &OutputConfig) -> Self {
        let (start, window) = lyrics.window(index, CONTEXT_BEFORE, config.tooltip_lines);
        let mut context = window.to_vec();

        let mut tooltip = String::new();
        let _ = write!(tooltip, "<span foreground=\"{}\">", config.tooltip_color);

        for (offset, line) in context.iter_mut().enumerate() {
            let rendered = if line.text.is_empty() {
                EMPTY_LINE_ICON.to_string()
            } else {
                escape_markup(&break_line(&line.text, config.break_tooltip))
            };

            if start + offset == index {
                line.active = true;
                let _ = write!(
                    tooltip,
                    "</span><b><big>{rendered}</big></b>\n<span foreground=\"{}\">",
                    config.tooltip_color
                );
            } else {
                tooltip.push_str(&rendered);
                tooltip.push('\n');
            }
        }

        let mut tooltip = tooltip.trim().to_string();
        tooltip.push_str("</span>");

        let text = lyrics
            .get(index)
            .map(|line| truncate(&line.text, config.max_length))
            .unwrap_or_default();

        Self {
            text,
            class: vec![Status::Lyric, Status::Playing],
            alt: Some(Status::Lyric),
            tooltip,
            percentage: 0,
            info: None,
            context: config.detailed.then_some(context),
        }
    }

    /// Switch to the paused presentation.
    pub fn paused(&mut self, snapshot: &PlayerSnapshot, config: &OutputConfig) {
        if !config.lyric_only {
            self.text = snapshot.display_title();
        }
        self.alt = Some(Status::Paused);
        self.class = vec![Status::Paused];
    }

    /// Whether emitting `self` after `other` would change what the bar shows.
    ///
    /// Detailed mode also compares shuffle, status and volume.
    #[must_use]
    pub fn same_as(&self, other: &Self, detailed: bool) -> bool {
        if self.text != other.text
            || self.alt != other.alt
            || self.tooltip != other.tooltip
            || self.percentage != other.percentage
            || self.class != other.class
        {
            return false;
        }

        if !detailed {
            return true;
        }

        match (&self.info, &other.info) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.shuffle == b.shuffle
                    && a.status == b.status
                    && (a.volume - b.volume).abs() < f64::EPSILON
            }
            _ => false,
        }
    }
}

/// Writes updates, skipping any that would not change the bar
pub struct Emitter<W> {
    writer: W,
    config: OutputConfig,
    last: Option<Waybar>,
    last_text: Option<String>,
}

impl<W: Write> Emitter<W> {
    pub fn new(writer: W, config: OutputConfig) -> Self {
        Self {
            writer,
            config,
            last: None,
            last_text: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &OutputConfig {
        &self.config
    }

    #[must_use]
    pub const fn writer(&self) -> &W {
        &self.writer
    }

    #[must_use]
    pub const fn last(&self) -> Option<&Waybar> {
        self.last.as_ref()
    }

    /// Emit `waybar` unless it matches the previous emission. Returns whether
    /// anything was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn emit(&mut self, waybar: Waybar) -> io::Result<bool> {
        if self
            .last
            .as_ref()
            .is_some_and(|last| waybar.same_as(last, self.config.detailed))
        {
            return Ok(false);
        }

        self.encode(&waybar)?;
        self.last = Some(waybar);
        Ok(true)
    }

    fn encode(&mut self, waybar: &Waybar) -> io::Result<()> {
        if self.config.lyric_only && matches!(waybar.alt, Some(Status::Paused | Status::Music)) {
            writeln!(self.writer)?;
            return self.writer.flush();
        }

        if self.config.compact {
            if self.last_text.as_deref() != Some(waybar.text.as_str()) {
                writeln!(self.writer, "{}", waybar.text)?;
                self.last_text = Some(waybar.text.clone());
            }
            return self.writer.flush();
        }

        if waybar.is_zero() {
            writeln!(self.writer, "{{}}")?;
        } else {
            serde_json::to_writer(&mut self.writer, waybar)?;
            writeln!(self.writer)?;
        }
        self.writer.flush()
    }
}
