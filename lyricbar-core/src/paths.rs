//! Path constants for configuration, cache and log files.

use const_format::concatcp;
use std::path::PathBuf;

/// The name of the application directory under the config and cache dirs
pub const APP_DIR_NAME: &str = "lyricbar";

/// The name of the main configuration file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The name of the log file written when file logging is enabled
pub const LOG_FILE_NAME: &str = "lyricbar.log";

/// Sent with every lyrics request
pub const USER_AGENT: &str = concatcp!(
    APP_DIR_NAME,
    " v",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/kvnxiao/lyricbar)"
);

/// Get the configuration directory path (~/.config/lyricbar/)
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(APP_DIR_NAME)
}

/// Get the config file path (~/.config/lyricbar/config.toml)
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Get the lyrics cache directory (`~/.cache/lyricbar/` on Linux)
#[must_use]
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Get the default log file path (`~/.cache/lyricbar/lyricbar.log`)
#[must_use]
pub fn log_path() -> PathBuf {
    cache_dir().join(LOG_FILE_NAME)
}
