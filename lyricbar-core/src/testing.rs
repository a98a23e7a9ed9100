//! Test doubles for the player bus and the lyrics provider.

use crate::error::{CoreError, Result};
use crate::identity::TrackKey;
use crate::player::{MediaPlayer, PlaybackStatus, PlayerBus, PlayerSnapshot, TrackMetadata};
use crate::provider::{FetchedLyrics, LyricsProvider, LyricsQuery};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// A fresh, empty directory under the system temp dir.
pub fn temp_dir(name: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let dir = std::env::temp_dir().join(format!(
        "lyricbar-test-{name}-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

/// A playing snapshot with a 200s track length.
pub fn snapshot(artist: &str, title: &str) -> PlayerSnapshot {
    PlayerSnapshot {
        player: "amarok".to_string(),
        track_key: TrackKey::new(format!("{artist}-{title}")),
        track_id: "/amarok/1".to_string(),
        artist: artist.to_string(),
        title: title.to_string(),
        album: "Album".to_string(),
        cover: String::new(),
        url: None,
        metadata: BTreeMap::new(),
        volume: 0.5,
        position: Duration::ZERO,
        length: Duration::from_secs(200),
        shuffle: false,
        status: PlaybackStatus::Playing,
    }
}

#[derive(Debug, Clone)]
pub struct FakePlayerState {
    pub metadata: TrackMetadata,
    pub status: PlaybackStatus,
    pub position: Duration,
    pub volume: f64,
    pub shuffle: bool,
    pub position_fails: bool,
    pub set_positions: Vec<(String, Duration)>,
}

/// Scriptable player. Clones share state.
#[derive(Debug, Clone)]
pub struct FakePlayer {
    name: String,
    state: Arc<Mutex<FakePlayerState>>,
}

impl FakePlayer {
    pub fn playing(name: &str, artist: &str, title: &str, length: Duration) -> Self {
        let mut raw = BTreeMap::new();
        raw.insert("xesam:artist".to_string(), artist.to_string());
        raw.insert("xesam:title".to_string(), title.to_string());

        let metadata = TrackMetadata {
            track_id: Some(format!("/fake/{name}/1")),
            artists: vec![artist.to_string()],
            title: Some(title.to_string()),
            album: Some("Album".to_string()),
            art_url: None,
            url: None,
            length: Some(length),
            raw,
        };

        Self {
            name: name.to_string(),
            state: Arc::new(Mutex::new(FakePlayerState {
                metadata,
                status: PlaybackStatus::Playing,
                position: Duration::ZERO,
                volume: 1.0,
                shuffle: false,
                position_fails: false,
                set_positions: Vec::new(),
            })),
        }
    }

    #[must_use]
    pub fn with_url(self, url: &str) -> Self {
        self.state().metadata.url = Some(url.to_string());
        self
    }

    #[must_use]
    pub fn with_position(self, position: Duration) -> Self {
        self.state().position = position;
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakePlayerState> {
        self.state.lock().unwrap()
    }

    fn unavailable(&self, reason: &str) -> CoreError {
        CoreError::PlayerUnavailable {
            player: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl MediaPlayer for FakePlayer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn metadata(&self) -> Result<TrackMetadata> {
        Ok(self.state().metadata.clone())
    }

    async fn playback_status(&self) -> Result<PlaybackStatus> {
        Ok(self.state().status)
    }

    async fn position(&self) -> Result<Duration> {
        let state = self.state();
        if state.position_fails {
            return Err(self.unavailable("position"));
        }
        Ok(state.position)
    }

    async fn volume(&self) -> Result<f64> {
        Ok(self.state().volume)
    }

    async fn shuffle(&self) -> Result<bool> {
        Ok(self.state().shuffle)
    }

    async fn set_position(&self, track_id: &str, position: Duration) -> Result<()> {
        let mut state = self.state();
        state.set_positions.push((track_id.to_string(), position));
        state.position = position;
        Ok(())
    }

    async fn seek(&self, offset_micros: i64) -> Result<()> {
        let mut state = self.state();
        let micros = i64::try_from(state.position.as_micros()).unwrap_or(i64::MAX);
        let target = u64::try_from(micros.saturating_add(offset_micros)).unwrap_or(0);
        state.position = Duration::from_micros(target);
        Ok(())
    }

    async fn set_volume(&self, volume: f64) -> Result<()> {
        self.state().volume = volume;
        Ok(())
    }

    async fn play_pause(&self) -> Result<()> {
        let mut state = self.state();
        state.status = match state.status {
            PlaybackStatus::Playing => PlaybackStatus::Paused,
            PlaybackStatus::Paused | PlaybackStatus::Stopped => PlaybackStatus::Playing,
        };
        Ok(())
    }
}

/// Session with a mutable set of players
#[derive(Debug, Clone, Default)]
pub struct FakeBus {
    players: Arc<Mutex<Vec<FakePlayer>>>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_player(self, player: FakePlayer) -> Self {
        self.players.lock().unwrap().push(player);
        self
    }

    pub fn remove(&self, name: &str) {
        self.players.lock().unwrap().retain(|p| p.name != name);
    }
}

#[async_trait]
impl PlayerBus for FakeBus {
    type Player = FakePlayer;

    async fn list_players(&self) -> Result<Vec<String>> {
        Ok(self
            .players
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.name.clone())
            .collect())
    }

    async fn player(&self, name: &str) -> Result<FakePlayer> {
        self.players
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or(CoreError::NoPlayer)
    }
}

#[derive(Debug, Clone)]
pub enum FakeResponse {
    Synced(String),
    Plain(String),
    Instrumental,
    NotFound,
    Failed(String),
    /// Connection-level failure
    Unreachable,
}

/// Provider returning a fixed response and counting calls
#[derive(Debug)]
pub struct FakeProvider {
    response: FakeResponse,
    calls: AtomicUsize,
    last_query: Mutex<Option<LyricsQuery>>,
}

impl FakeProvider {
    pub fn new(response: FakeResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<LyricsQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl LyricsProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch(&self, query: &LyricsQuery) -> Result<FetchedLyrics> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());

        match self.response.clone() {
            FakeResponse::Synced(text) => Ok(FetchedLyrics {
                provider_id: "1".to_string(),
                synced_lyrics: Some(text),
                ..FetchedLyrics::default()
            }),
            FakeResponse::Plain(text) => Ok(FetchedLyrics {
                provider_id: "2".to_string(),
                plain_lyrics: Some(text),
                ..FetchedLyrics::default()
            }),
            FakeResponse::Instrumental => Ok(FetchedLyrics {
                provider_id: "3".to_string(),
                instrumental: true,
                ..FetchedLyrics::default()
            }),
            FakeResponse::NotFound => Err(CoreError::LyricsNotFound {
                track: query.track_name.clone(),
                artist: query.artist_name.clone(),
            }),
            FakeResponse::Failed(reason) => Err(CoreError::LyricsProviderFailed {
                provider: "fake".to_string(),
                reason,
            }),
            FakeResponse::Unreachable => {
                // An invalid URL yields a reqwest error without touching the network
                let err = reqwest::Client::new().get("not a url").build().unwrap_err();
                Err(err.into())
            }
        }
    }
}
