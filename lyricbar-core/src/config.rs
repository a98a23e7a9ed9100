use crate::error::{CoreError, Result};
use crate::text::FilterMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Smallest usable tooltip context: two lines before, the active line, one after
pub const MIN_TOOLTIP_LINES: usize = 4;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub lyrics: LyricsConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How snapshots are rendered for the status bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Only show lyrics; hide artist/title when paused or between lines
    #[serde(default)]
    pub lyric_only: bool,
    /// Print the plain text instead of JSON, only when it changes
    #[serde(default)]
    pub compact: bool,
    /// Include the player snapshot and the raw context lines
    #[serde(default)]
    pub detailed: bool,
    /// Column at which tooltip lines are word-wrapped
    #[serde(default = "default_break_tooltip")]
    pub break_tooltip: usize,
    /// Maximum characters of the displayed text
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Number of lines shown in the tooltip
    #[serde(default = "default_tooltip_lines")]
    pub tooltip_lines: usize,
    /// Pango color of the inactive tooltip lines
    #[serde(default = "default_tooltip_color")]
    pub tooltip_color: String,
}

const fn default_break_tooltip() -> usize {
    100_000
}

const fn default_max_length() -> usize {
    150
}

const fn default_tooltip_lines() -> usize {
    8
}

fn default_tooltip_color() -> String {
    "#cccccc".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            lyric_only: false,
            compact: false,
            detailed: false,
            break_tooltip: default_break_tooltip(),
            max_length: default_max_length(),
            tooltip_lines: default_tooltip_lines(),
            tooltip_color: default_tooltip_color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricsConfig {
    /// Profanity masking: "", "full" or "partial"
    #[serde(default)]
    pub filter_profanity: FilterMode,
    /// Memory store sweep interval; also how long an idle entry is kept
    #[serde(default = "default_cache_eviction_secs")]
    pub cache_eviction_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

const fn default_cache_eviction_secs() -> u64 {
    600
}

const fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            filter_profanity: FilterMode::Off,
            cache_eviction_secs: default_cache_eviction_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl LyricsConfig {
    #[must_use]
    pub const fn cache_eviction(&self) -> Duration {
        Duration::from_secs(self.cache_eviction_secs)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Poll interval used when no line boundary is scheduled
    #[serde(default = "default_fallback_interval_ms")]
    pub fallback_interval_ms: u64,
}

const fn default_fallback_interval_ms() -> u64 {
    500
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fallback_interval_ms: default_fallback_interval_ms(),
        }
    }
}

impl SyncConfig {
    #[must_use]
    pub const fn fallback_interval(&self) -> Duration {
        Duration::from_millis(self.fallback_interval_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to a file
    #[serde(default)]
    pub enabled: bool,
    /// Log file location, defaults to the cache directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LoggingConfig {
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(crate::paths::log_path)
    }
}

impl Config {
    /// Get the config file path (~/.config/lyricbar/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from the default location, writing a template on first run
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read, parsed or is invalid.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    /// Load config from `path`. When the file does not exist a commented
    /// template is written there and the defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read, written, parsed or
    /// is invalid.
    pub fn load_or_create_at(path: &Path) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, CONFIG_TEMPLATE)?;
            info!("Wrote default configuration to {:?}", path);

            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML config document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigParseError`] for malformed TOML or unknown
    /// enum values and [`CoreError::ConfigInvalid`] for out-of-range values.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(CoreError::ConfigInvalid { message });

        if self.output.tooltip_lines < MIN_TOOLTIP_LINES {
            return invalid(format!(
                "output.tooltip_lines must be at least {MIN_TOOLTIP_LINES}, got {}",
                self.output.tooltip_lines
            ));
        }
        if self.output.break_tooltip == 0 {
            return invalid("output.break_tooltip must be greater than 0".into());
        }
        if self.output.max_length == 0 {
            return invalid("output.max_length must be greater than 0".into());
        }
        if self.lyrics.cache_eviction_secs == 0 {
            return invalid("lyrics.cache_eviction_secs must be greater than 0".into());
        }
        if self.lyrics.request_timeout_secs == 0 {
            return invalid("lyrics.request_timeout_secs must be greater than 0".into());
        }
        if self.sync.fallback_interval_ms == 0 {
            return invalid("sync.fallback_interval_ms must be greater than 0".into());
        }

        Ok(())
    }
}

const CONFIG_TEMPLATE: &str = r##"# lyricbar configuration
# ~/.config/lyricbar/config.toml

[output]
# Only show lyrics; print nothing while paused or between lines
lyric_only = false
# Print plain text lines instead of JSON
compact = false
# Add the player state and the tooltip lines to the JSON output
detailed = false
# Wrap tooltip lines at this many characters
break_tooltip = 100000
# Truncate the displayed line to this many characters
max_length = 150
# Lines shown in the tooltip (at least 4)
tooltip_lines = 8
tooltip_color = "#cccccc"

[lyrics]
# Mask profanity: "" (off), "full" or "partial"
filter_profanity = ""
# Forget lyrics held in memory after this many idle seconds
cache_eviction_secs = 600
request_timeout_secs = 10

[sync]
# Poll interval when no line change is scheduled
fallback_interval_ms = 500

[logging]
# Also write logs to a file (default: ~/.cache/lyricbar/lyricbar.log)
enabled = false
# path = "/tmp/lyricbar.log"
"##;
