use crate::error::CoreError;
use async_trait::async_trait;
use std::time::Duration;

/// Query parameters for fetching lyrics
#[derive(Debug, Clone, PartialEq)]
pub struct LyricsQuery {
    /// Track name
    pub track_name: String,
    /// Artist name
    pub artist_name: String,
    /// Album name (optional)
    pub album_name: Option<String>,
    /// Track duration (for matching)
    pub duration: Option<Duration>,
}

impl LyricsQuery {
    /// Create a new lyrics query
    pub fn new(track_name: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self {
            track_name: track_name.into(),
            artist_name: artist_name.into(),
            album_name: None,
            duration: None,
        }
    }

    /// Set album name. Empty names are ignored.
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        let album = album.into();
        self.album_name = (!album.is_empty()).then_some(album);
        self
    }

    /// Set duration. A zero duration is ignored.
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = if duration.is_zero() {
            None
        } else {
            Some(duration)
        };
        self
    }
}

/// Lyrics returned by a provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedLyrics {
    /// Provider-specific ID (e.g., LRCLIB's numeric ID as string)
    pub provider_id: String,
    /// Time-coded lyrics, if the provider has them
    pub synced_lyrics: Option<String>,
    /// Plain lyrics without timing
    pub plain_lyrics: Option<String>,
    /// The provider marks the track as having no vocals
    pub instrumental: bool,
}

/// Trait for lyrics providers
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Fetch lyrics for a query.
    ///
    /// Implementations return [`CoreError::LyricsNotFound`] when the provider
    /// has no entry, [`CoreError::LyricsProviderFailed`] for other unexpected
    /// responses and [`CoreError::NetworkError`] for connection failures.
    async fn fetch(&self, query: &LyricsQuery) -> Result<FetchedLyrics, CoreError>;
}
