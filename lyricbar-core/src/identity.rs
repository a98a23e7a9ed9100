//! Player selection and stable per-track identity.

use crate::error::{CoreError, Result};
use crate::player::{MediaPlayer, PlayerBus, TrackMetadata};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::debug;
use url::Url;

const YOUTUBE_MUSIC_HOST: &str = "music.youtube.com";
const SPOTIFY_WEB_HOST: &str = "open.spotify.com";

/// Lookup key for both cache tiers; also the cache file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TrackKey(String);

impl TrackKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// SHA-256 of the concatenated parts, hex encoded.
    fn hash(parts: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_bytes());
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a player's tracks are identified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    /// The player's own `mpris:trackid`
    TrackId,
    /// First artist and title
    ArtistTitle,
    /// Track id embedded in the page URL of a recognized streaming site
    PageUrl,
}

impl IdentityKind {
    /// Derive the track key from player metadata.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PlayerMetadata`] when the fields this identity
    /// depends on are missing or unusable.
    pub fn derive_key(self, metadata: &TrackMetadata) -> Result<TrackKey> {
        let missing = |reason: &str| CoreError::PlayerMetadata {
            reason: reason.to_string(),
        };

        match self {
            Self::TrackId => {
                let id = metadata
                    .track_id
                    .as_deref()
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| missing("missing track id"))?;
                Ok(TrackKey::hash(&[id]))
            }
            Self::ArtistTitle => {
                let artist = metadata
                    .artist()
                    .filter(|a| !a.is_empty())
                    .ok_or_else(|| missing("missing artist"))?;
                let title = metadata
                    .title
                    .as_deref()
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| missing("missing title"))?;
                Ok(TrackKey::hash(&[artist, ":", title]))
            }
            Self::PageUrl => {
                let url = metadata
                    .parsed_url()
                    .ok_or_else(|| missing("missing or invalid page url"))?;
                let host = recognized_host(&url)
                    .ok_or_else(|| missing("page url is not a supported site"))?;
                let id = page_track_id(&url, &host)
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| missing("page url has no track id"))?;
                Ok(TrackKey::hash(&[&host, ":", &id]))
            }
        }
    }
}

/// Lowercased host of `url` if it belongs to a supported streaming site.
fn recognized_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    (host.contains(YOUTUBE_MUSIC_HOST) || host.contains(SPOTIFY_WEB_HOST)).then_some(host)
}

fn page_track_id(url: &Url, host: &str) -> Option<String> {
    if host.contains(YOUTUBE_MUSIC_HOST) {
        // /watch?v=<id>
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
    } else {
        // /track/<id>
        url.path_segments()?
            .rev()
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Players the engine knows how to follow, in order of preference.
pub const SUPPORTED_PLAYERS: &[(&str, IdentityKind)] = &[
    ("spotify", IdentityKind::PageUrl),
    ("YoutubeMusic", IdentityKind::PageUrl),
    ("amarok", IdentityKind::ArtistTitle),
    ("io.bassi.Amberol", IdentityKind::ArtistTitle),
    ("strawberry", IdentityKind::TrackId),
];

/// A connected player together with its identity scheme.
pub struct SelectedPlayer<P> {
    pub player: P,
    pub identity: IdentityKind,
}

/// Pick the player to follow.
///
/// The first available entry of [`SUPPORTED_PLAYERS`] wins. Otherwise a
/// Firefox instance is accepted while it is on a supported streaming site.
///
/// # Errors
///
/// Returns [`CoreError::NoPlayer`] when no usable player is available, and
/// propagates bus errors from listing or connecting.
pub async fn select<B: PlayerBus>(bus: &B) -> Result<SelectedPlayer<B::Player>> {
    let names = bus.list_players().await?;
    debug!(players = ?names, "Available players");

    if names.is_empty() {
        return Err(CoreError::NoPlayer);
    }

    for (name, identity) in SUPPORTED_PLAYERS {
        if names.iter().any(|n| n == name) {
            debug!("Player selected: {}", name);
            return Ok(SelectedPlayer {
                player: bus.player(name).await?,
                identity: *identity,
            });
        }
    }

    for name in names.iter().filter(|n| n.to_lowercase().contains("firefox")) {
        let Ok(player) = bus.player(name).await else {
            continue;
        };
        let Ok(metadata) = player.metadata().await else {
            continue;
        };

        if metadata.parsed_url().as_ref().and_then(recognized_host).is_some() {
            debug!("Player selected: {}", player.name());
            return Ok(SelectedPlayer {
                player,
                identity: IdentityKind::PageUrl,
            });
        }
    }

    Err(CoreError::NoPlayer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBus, FakePlayer};
    use std::time::Duration;

    fn metadata_with_url(url: &str) -> TrackMetadata {
        TrackMetadata {
            url: Some(url.to_string()),
            ..TrackMetadata::default()
        }
    }

    fn length() -> Duration {
        Duration::from_secs(180)
    }

    #[test]
    fn test_track_key_is_stable_hex() {
        let a = TrackKey::hash(&["artist", ":", "title"]);
        let b = TrackKey::hash(&["artist", ":", "title"]);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, TrackKey::hash(&["artist", ":", "other"]));
    }

    #[test]
    fn test_artist_title_key() {
        let meta = TrackMetadata {
            artists: vec!["Artist".into(), "Feat".into()],
            title: Some("Title".into()),
            ..TrackMetadata::default()
        };
        let key = IdentityKind::ArtistTitle.derive_key(&meta).unwrap();
        assert_eq!(key, TrackKey::hash(&["Artist:Title"]));

        let no_title = TrackMetadata {
            title: None,
            ..meta
        };
        assert!(IdentityKind::ArtistTitle.derive_key(&no_title).is_err());
    }

    #[test]
    fn test_track_id_key() {
        let meta = TrackMetadata {
            track_id: Some("/org/strawberry/track/7".into()),
            ..TrackMetadata::default()
        };
        assert!(IdentityKind::TrackId.derive_key(&meta).is_ok());
        assert!(IdentityKind::TrackId
            .derive_key(&TrackMetadata::default())
            .is_err());
    }

    #[test]
    fn test_page_url_key_youtube_music() {
        let a = IdentityKind::PageUrl
            .derive_key(&metadata_with_url("https://music.youtube.com/watch?v=abc&list=x"))
            .unwrap();
        let b = IdentityKind::PageUrl
            .derive_key(&metadata_with_url("https://music.youtube.com/watch?list=y&v=abc"))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a, TrackKey::hash(&["music.youtube.com:abc"]));
    }

    #[test]
    fn test_page_url_key_spotify() {
        let key = IdentityKind::PageUrl
            .derive_key(&metadata_with_url("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC"))
            .unwrap();
        assert_eq!(
            key,
            TrackKey::hash(&["open.spotify.com:4uLU6hMCjMI75M1A2tKUQC"])
        );
    }

    #[test]
    fn test_page_url_rejects_other_hosts_and_missing_ids() {
        for url in [
            "https://www.youtube.com/watch?v=abc",
            "https://music.youtube.com/watch",
            "not a url",
        ] {
            assert!(
                IdentityKind::PageUrl.derive_key(&metadata_with_url(url)).is_err(),
                "{url}"
            );
        }
    }

    #[tokio::test]
    async fn test_select_prefers_allow_list_order() {
        let bus = FakeBus::new()
            .with_player(FakePlayer::playing("amarok", "A", "T", length()))
            .with_player(FakePlayer::playing("spotify", "A", "T", length()));

        let selected = select(&bus).await.unwrap();
        assert_eq!(selected.player.name(), "spotify");
        assert_eq!(selected.identity, IdentityKind::PageUrl);
    }

    #[tokio::test]
    async fn test_select_ignores_unsupported_players() {
        let bus = FakeBus::new().with_player(FakePlayer::playing("vlc", "A", "T", length()));
        assert!(matches!(select(&bus).await, Err(CoreError::NoPlayer)));

        let empty = FakeBus::new();
        assert!(matches!(select(&empty).await, Err(CoreError::NoPlayer)));
    }

    #[tokio::test]
    async fn test_select_falls_back_to_firefox_on_supported_site() {
        let bus = FakeBus::new()
            .with_player(
                FakePlayer::playing("firefox.instance_1_10", "A", "T", length())
                    .with_url("https://example.com/video"),
            )
            .with_player(
                FakePlayer::playing("firefox.instance_1_20", "A", "T", length())
                    .with_url("https://music.youtube.com/watch?v=abc"),
            );

        let selected = select(&bus).await.unwrap();
        assert_eq!(selected.player.name(), "firefox.instance_1_20");
        assert_eq!(selected.identity, IdentityKind::PageUrl);
    }
}
