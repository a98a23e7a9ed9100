use crate::error::MprisError;
use crate::metadata::{micros_to_duration, track_metadata};
use crate::proxy::{PlayerProxy, MPRIS_BUS_PREFIX};
use async_trait::async_trait;
use lyricbar_core::{CoreError, MediaPlayer, PlaybackStatus, PlayerBus, Result, TrackMetadata};
use std::time::Duration;
use tracing::debug;
use zbus::fdo::DBusProxy;
use zbus::proxy::CacheProperties;
use zbus::zvariant::ObjectPath;
use zbus::Connection;

/// MPRIS players reachable on the D-Bus session bus
#[derive(Clone)]
pub struct MprisBus {
    connection: Connection,
}

impl MprisBus {
    /// Connect to the session bus.
    ///
    /// # Errors
    ///
    /// Returns an error if the session bus is not reachable.
    pub async fn connect() -> std::result::Result<Self, MprisError> {
        let connection = Connection::session().await?;
        Ok(Self { connection })
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.connection
    }

    async fn names(&self) -> std::result::Result<Vec<String>, MprisError> {
        let dbus = DBusProxy::new(&self.connection).await?;
        let names = dbus.list_names().await?;

        Ok(names
            .iter()
            .filter_map(|name| name.as_str().strip_prefix(MPRIS_BUS_PREFIX))
            .map(ToString::to_string)
            .collect())
    }
}

#[async_trait]
impl PlayerBus for MprisBus {
    type Player = MprisPlayer;

    async fn list_players(&self) -> Result<Vec<String>> {
        let players = self.names().await.map_err(|e| e.into_core("session bus"))?;
        debug!("MPRIS players on the bus: {:?}", players);
        Ok(players)
    }

    async fn player(&self, name: &str) -> Result<MprisPlayer> {
        MprisPlayer::connect(&self.connection, name)
            .await
            .map_err(|e| e.into_core(name))
    }
}

/// One MPRIS player, addressed by its short name
pub struct MprisPlayer {
    name: String,
    proxy: PlayerProxy<'static>,
}

impl MprisPlayer {
    /// Build a proxy for `org.mpris.MediaPlayer2.<name>`.
    ///
    /// Properties are never cached; every query is a fresh round trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus name is invalid or the proxy cannot be built.
    pub async fn connect(connection: &Connection, name: &str) -> std::result::Result<Self, MprisError> {
        let proxy = PlayerProxy::builder(connection)
            .destination(format!("{MPRIS_BUS_PREFIX}{name}"))?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;

        Ok(Self {
            name: name.to_string(),
            proxy,
        })
    }

    fn unavailable(&self, error: impl Into<MprisError>) -> CoreError {
        error.into().into_core(&self.name)
    }
}

#[async_trait]
impl MediaPlayer for MprisPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn metadata(&self) -> Result<TrackMetadata> {
        let map = self.proxy.metadata().await.map_err(|e| self.unavailable(e))?;
        Ok(track_metadata(&map))
    }

    async fn playback_status(&self) -> Result<PlaybackStatus> {
        let status = self
            .proxy
            .playback_status()
            .await
            .map_err(|e| self.unavailable(e))?;
        PlaybackStatus::from_mpris(&status).ok_or_else(|| self.unavailable(MprisError::UnknownStatus(status)))
    }

    async fn position(&self) -> Result<Duration> {
        let micros = self.proxy.position().await.map_err(|e| self.unavailable(e))?;
        Ok(micros_to_duration(micros).unwrap_or_default())
    }

    async fn volume(&self) -> Result<f64> {
        self.proxy.volume().await.map_err(|e| self.unavailable(e))
    }

    async fn shuffle(&self) -> Result<bool> {
        self.proxy.shuffle().await.map_err(|e| self.unavailable(e))
    }

    async fn set_position(&self, track_id: &str, position: Duration) -> Result<()> {
        let path = ObjectPath::try_from(track_id).map_err(|source| {
            self.unavailable(MprisError::InvalidTrackId {
                track_id: track_id.to_string(),
                source,
            })
        })?;
        let micros = i64::try_from(position.as_micros()).unwrap_or(i64::MAX);

        debug!(player = %self.name, "SetPosition {} {}us", track_id, micros);
        self.proxy
            .set_position(&path, micros)
            .await
            .map_err(|e| self.unavailable(e))
    }

    async fn seek(&self, offset_micros: i64) -> Result<()> {
        debug!(player = %self.name, "Seek {}us", offset_micros);
        self.proxy.seek(offset_micros).await.map_err(|e| self.unavailable(e))
    }

    async fn set_volume(&self, volume: f64) -> Result<()> {
        self.proxy
            .set_volume(volume)
            .await
            .map_err(|e| self.unavailable(e))
    }

    async fn play_pause(&self) -> Result<()> {
        self.proxy.play_pause().await.map_err(|e| self.unavailable(e))
    }
}
