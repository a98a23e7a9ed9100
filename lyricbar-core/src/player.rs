//! Media player capability and per-tick player snapshots.

use crate::error::{CoreError, Result};
use crate::identity::{IdentityKind, TrackKey};
use crate::time::serialize_secs;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Forward correction applied to sources that report a delayed position.
///
/// `YouTube` Music rounds its reported position down to whole seconds.
pub const POSITION_CORRECTION: Duration = Duration::from_millis(1100);

/// Player name of the `YouTube` Music desktop client
const YOUTUBE_MUSIC_PLAYER: &str = "YoutubeMusic";
const YOUTUBE_MUSIC_HOST: &str = "music.youtube.com";

/// Playback status as reported by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
}

impl PlaybackStatus {
    /// Parse an MPRIS `PlaybackStatus` value.
    #[must_use]
    pub fn from_mpris(value: &str) -> Option<Self> {
        match value {
            "Playing" => Some(Self::Playing),
            "Paused" => Some(Self::Paused),
            "Stopped" => Some(Self::Stopped),
            _ => None,
        }
    }
}

/// Track metadata as exposed by the player
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    pub track_id: Option<String>,
    pub artists: Vec<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub art_url: Option<String>,
    /// Page URL for browser-hosted and streaming players
    pub url: Option<String>,
    pub length: Option<Duration>,
    /// Every metadata entry, stringified, keyed by its original name
    pub raw: BTreeMap<String, String>,
}

impl TrackMetadata {
    /// First listed artist
    #[must_use]
    pub fn artist(&self) -> Option<&str> {
        self.artists.first().map(String::as_str)
    }

    #[must_use]
    pub fn parsed_url(&self) -> Option<Url> {
        self.url.as_deref().and_then(|u| Url::parse(u).ok())
    }
}

/// A media player the engine can query and control.
#[async_trait]
pub trait MediaPlayer: Send + Sync {
    /// Short player name, e.g. `spotify` or `firefox.instance_1_42`
    fn name(&self) -> &str;

    async fn metadata(&self) -> Result<TrackMetadata>;

    async fn playback_status(&self) -> Result<PlaybackStatus>;

    async fn position(&self) -> Result<Duration>;

    /// Volume between 0.0 and 1.0
    async fn volume(&self) -> Result<f64>;

    async fn shuffle(&self) -> Result<bool>;

    /// Jump to an absolute position within the given track.
    async fn set_position(&self, track_id: &str, position: Duration) -> Result<()>;

    /// Move the position by a signed offset in microseconds.
    async fn seek(&self, offset_micros: i64) -> Result<()>;

    async fn set_volume(&self, volume: f64) -> Result<()>;

    async fn play_pause(&self) -> Result<()>;
}

/// The set of players currently available on the session.
#[async_trait]
pub trait PlayerBus: Send + Sync {
    type Player: MediaPlayer;

    /// Short names of every available player.
    async fn list_players(&self) -> Result<Vec<String>>;

    /// Connect to a player by short name.
    async fn player(&self, name: &str) -> Result<Self::Player>;
}

/// Everything the engine knows about the player for one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub player: String,
    #[serde(rename = "id")]
    pub track_key: TrackKey,
    #[serde(skip)]
    pub track_id: String,
    pub artist: String,
    pub title: String,
    pub album: String,
    pub cover: String,
    #[serde(skip)]
    pub url: Option<Url>,
    #[serde(skip)]
    pub metadata: BTreeMap<String, String>,
    pub volume: f64,
    #[serde(serialize_with = "serialize_secs")]
    pub position: Duration,
    #[serde(serialize_with = "serialize_secs")]
    pub length: Duration,
    pub shuffle: bool,
    pub status: PlaybackStatus,
}

impl PlayerSnapshot {
    /// Read a fresh snapshot from the player.
    ///
    /// Cover, album, URL, volume and shuffle are best-effort. Status, length,
    /// artist and title are required. The position starts at zero; call
    /// [`Self::update_position`] to read it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PlayerMetadata`] when a required field is missing
    /// or the track identity cannot be derived, and propagates player errors
    /// for required queries.
    pub async fn capture<P: MediaPlayer + ?Sized>(
        player: &P,
        identity: IdentityKind,
    ) -> Result<Self> {
        let metadata = player.metadata().await?;
        for (key, value) in &metadata.raw {
            debug!(player = player.name(), "MPRIS {}: {}", key, value);
        }

        let status = player.playback_status().await?;
        let shuffle = player.shuffle().await.unwrap_or_default();
        let volume = player.volume().await.unwrap_or_default();

        let missing = |field: &str| CoreError::PlayerMetadata {
            reason: format!("{} did not report {field}", player.name()),
        };
        let length = metadata.length.ok_or_else(|| missing("a track length"))?;
        let artist = metadata
            .artist()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| missing("an artist"))?
            .to_string();
        let title = metadata
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| missing("a title"))?;

        let track_key = identity.derive_key(&metadata)?;

        Ok(Self {
            player: player.name().to_string(),
            track_key,
            track_id: metadata.track_id.clone().unwrap_or_default(),
            artist,
            title,
            album: metadata.album.clone().unwrap_or_default(),
            cover: metadata.art_url.clone().unwrap_or_default(),
            url: metadata.parsed_url(),
            metadata: metadata.raw,
            volume,
            position: Duration::ZERO,
            length,
            shuffle,
            status,
        })
    }

    /// Refresh the playback position, applying the per-source correction.
    ///
    /// # Errors
    ///
    /// Propagates the player's error when the position cannot be read.
    pub async fn update_position<P: MediaPlayer + ?Sized>(&mut self, player: &P) -> Result<()> {
        let mut position = player.position().await?;

        if self.reports_delayed_position() {
            debug!("Adding {:?} to compensate for delayed player position", POSITION_CORRECTION);
            position += POSITION_CORRECTION;
        }

        self.position = position;
        Ok(())
    }

    /// Whether this source rounds its position down to whole seconds.
    #[must_use]
    pub fn reports_delayed_position(&self) -> bool {
        self.player == YOUTUBE_MUSIC_PLAYER
            || self
                .url
                .as_ref()
                .and_then(Url::host_str)
                .is_some_and(|host| host.contains(YOUTUBE_MUSIC_HOST))
    }

    /// Playback progress in whole percent, 0 when the length is unknown.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        let length = self.length.as_millis();
        if length == 0 {
            return 0;
        }
        let percent = (self.position.as_millis() * 100 / length).min(100);
        u8::try_from(percent).unwrap_or(100)
    }

    /// `artist - title`
    #[must_use]
    pub fn display_title(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePlayer;

    #[tokio::test]
    async fn test_capture_reads_required_fields() {
        let player = FakePlayer::playing("amarok", "Artist", "Title", Duration::from_secs(200))
            .with_position(Duration::from_secs(50));

        let mut snapshot = PlayerSnapshot::capture(&player, IdentityKind::ArtistTitle)
            .await
            .unwrap();
        assert_eq!(snapshot.position, Duration::ZERO);
        snapshot.update_position(&player).await.unwrap();

        assert_eq!(snapshot.player, "amarok");
        assert_eq!(snapshot.artist, "Artist");
        assert_eq!(snapshot.title, "Title");
        assert_eq!(snapshot.status, PlaybackStatus::Playing);
        assert_eq!(snapshot.position, Duration::from_secs(50));
        assert_eq!(snapshot.percentage(), 25);
        assert_eq!(snapshot.display_title(), "Artist - Title");
    }

    #[tokio::test]
    async fn test_capture_rejects_missing_title() {
        let player = FakePlayer::playing("amarok", "Artist", "", Duration::from_secs(200));

        let err = PlayerSnapshot::capture(&player, IdentityKind::ArtistTitle)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::PlayerMetadata { .. }));
    }

    #[tokio::test]
    async fn test_capture_rejects_missing_artist() {
        let player = FakePlayer::playing("amarok", "Artist", "Title", Duration::from_secs(200));
        player.state().metadata.artists.clear();

        assert!(PlayerSnapshot::capture(&player, IdentityKind::ArtistTitle)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_youtube_music_position_is_corrected() {
        let player = FakePlayer::playing("YoutubeMusic", "Artist", "Title", Duration::from_secs(200))
            .with_url("https://music.youtube.com/watch?v=abc")
            .with_position(Duration::from_secs(10));

        let mut snapshot = PlayerSnapshot::capture(&player, IdentityKind::PageUrl)
            .await
            .unwrap();
        snapshot.update_position(&player).await.unwrap();
        assert_eq!(snapshot.position, Duration::from_millis(11_100));
    }

    #[tokio::test]
    async fn test_browser_on_youtube_music_position_is_corrected() {
        let player = FakePlayer::playing("firefox.instance_1", "Artist", "Title", Duration::from_secs(200))
            .with_url("https://music.youtube.com/watch?v=abc")
            .with_position(Duration::from_secs(10));

        let mut snapshot = PlayerSnapshot::capture(&player, IdentityKind::PageUrl)
            .await
            .unwrap();
        snapshot.update_position(&player).await.unwrap();
        assert!(snapshot.reports_delayed_position());
        assert_eq!(snapshot.position, Duration::from_millis(11_100));
    }

    #[tokio::test]
    async fn test_other_players_are_not_corrected() {
        let player = FakePlayer::playing("spotify", "Artist", "Title", Duration::from_secs(200))
            .with_url("https://open.spotify.com/track/xyz")
            .with_position(Duration::from_secs(10));

        let mut snapshot = PlayerSnapshot::capture(&player, IdentityKind::PageUrl)
            .await
            .unwrap();
        snapshot.update_position(&player).await.unwrap();
        assert_eq!(snapshot.position, Duration::from_secs(10));
    }

    #[test]
    fn test_percentage_without_length() {
        let mut snapshot = crate::testing::snapshot("Artist", "Title");
        snapshot.length = Duration::ZERO;
        assert_eq!(snapshot.percentage(), 0);

        snapshot.length = Duration::from_secs(10);
        snapshot.position = Duration::from_secs(30);
        assert_eq!(snapshot.percentage(), 100);
    }

    #[test]
    fn test_snapshot_serializes_durations_as_seconds() {
        let mut snapshot = crate::testing::snapshot("Artist", "Title");
        snapshot.position = Duration::from_millis(1500);
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["position"], 1.5);
        assert_eq!(json["status"], "Playing");
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn test_playback_status_from_mpris() {
        assert_eq!(PlaybackStatus::from_mpris("Paused"), Some(PlaybackStatus::Paused));
        assert_eq!(PlaybackStatus::from_mpris("bogus"), None);
    }
}
