use crate::args::{parse_filter_mode, parse_volume};
use clap::{Args, Parser, Subcommand};
use lyricbar_core::{Config, FilterMode, VolumeChange};
use std::path::PathBuf;

/// Synchronized lyrics for Waybar, following the active MPRIS player
#[derive(Parser, Debug)]
#[command(name = "lyricbar", author, version, about)]
pub struct Cli {
    /// Config file to use instead of ~/.config/lyricbar/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress console log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also write logs to this file
    #[arg(short = 'o', long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Overrides for the `[output]` and `[lyrics]` config sections
#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Print only the text, and only when it changes
    #[arg(short, long)]
    pub compact: bool,

    /// Include player information and tooltip lines in the JSON output
    #[arg(short, long)]
    pub detailed: bool,

    /// Display only lyrics in the text output
    #[arg(short, long)]
    pub lyric_only: bool,

    /// Wrap tooltip lines at this many characters
    #[arg(short, long, value_name = "COLUMNS")]
    pub break_tooltip: Option<usize>,

    /// Maximum characters of the displayed line
    #[arg(short, long, value_name = "CHARS")]
    pub max_length: Option<usize>,

    /// Number of lines shown in the tooltip (at least 4)
    #[arg(short = 'L', long, value_name = "LINES")]
    pub tooltip_lines: Option<usize>,

    /// Pango color of the inactive tooltip lines
    #[arg(short = 'C', long, value_name = "COLOR")]
    pub tooltip_color: Option<String>,

    /// Mask profanity in lyrics: full or partial
    #[arg(short, long, value_name = "MODE", value_parser = parse_filter_mode)]
    pub filter_profanity: Option<FilterMode>,
}

impl OutputArgs {
    /// Apply command line overrides on top of the loaded config.
    pub fn apply(self, config: &mut Config) {
        let output = &mut config.output;
        output.compact |= self.compact;
        output.detailed |= self.detailed;
        output.lyric_only |= self.lyric_only;

        if let Some(columns) = self.break_tooltip {
            output.break_tooltip = columns;
        }
        if let Some(chars) = self.max_length {
            output.max_length = chars;
        }
        if let Some(lines) = self.tooltip_lines {
            output.tooltip_lines = lines;
        }
        if let Some(color) = self.tooltip_color {
            output.tooltip_color = color;
        }
        if let Some(mode) = self.filter_profanity {
            config.lyrics.filter_profanity = mode;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Follow the active player and print one line per update (default)
    Watch,

    /// Toggle between playing and paused
    PlayPause,

    /// Set the player volume: 0.5, 20%, +10% or -5%
    Volume {
        #[arg(value_name = "[+|-]VOLUME[%]", allow_hyphen_values = true, value_parser = parse_volume)]
        volume: VolumeChange,
    },

    /// Set the player position: 20s, 1m30s, or -10s for ten seconds before the end
    Position {
        /// Treat the argument as a lyric line number (negative counts from the end)
        #[arg(short, long)]
        lyric: bool,

        #[arg(value_name = "POSITION", allow_hyphen_values = true)]
        position: String,
    },

    /// Move the player position: 20s, -10s, or --lyric 1 for the next line
    Seek {
        /// Treat the argument as a number of lyric lines relative to the current one
        #[arg(short, long)]
        lyric: bool,

        #[arg(value_name = "OFFSET", allow_hyphen_values = true)]
        offset: String,
    },

    /// Print a module snippet for the Waybar config
    Init,
}
