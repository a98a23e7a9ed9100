use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Parsing errors
    #[error("Invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp { input: String, reason: &'static str },

    // Player errors
    #[error("No supported player found")]
    NoPlayer,

    #[error("Failed to read player metadata: {reason}")]
    PlayerMetadata { reason: String },

    #[error("Player {player} did not respond: {reason}")]
    PlayerUnavailable { player: String, reason: String },

    #[error("Lyric line {requested} is out of range ({count} lines)")]
    LineOutOfRange { count: usize, requested: i64 },

    // Lyrics errors
    #[error("Lyrics not found for track: {track} by {artist}")]
    LyricsNotFound { track: String, artist: String },

    #[error("Lyrics are not synced")]
    LyricsNotSynced,

    #[error("Lyrics were previously looked up and do not exist")]
    LyricsNotExists,

    #[error("Lyrics provider {provider} failed: {reason}")]
    LyricsProviderFailed { provider: String, reason: String },

    // Cache errors
    #[error("Lyrics cache file {path} is corrupt: {reason}")]
    CacheCorrupt { path: PathBuf, reason: String },

    // Network errors
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CoreError {
    /// Whether the failure is a connection-level problem that may succeed on
    /// a later attempt. Transient failures are never negatively cached.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NetworkError(_))
    }

    /// Whether the failure means "there are no usable lyrics for this track".
    #[must_use]
    pub const fn is_missing_lyrics(&self) -> bool {
        matches!(
            self,
            Self::LyricsNotFound { .. } | Self::LyricsNotSynced | Self::LyricsNotExists
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
