use lyricbar_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MprisError {
    #[error("D-Bus error: {0}")]
    DBus(#[from] zbus::Error),

    #[error("D-Bus daemon error: {0}")]
    Daemon(#[from] zbus::fdo::Error),

    #[error("Invalid track id {track_id:?}: {source}")]
    InvalidTrackId {
        track_id: String,
        source: zbus::zvariant::Error,
    },

    #[error("Unknown playback status {0:?}")]
    UnknownStatus(String),
}

impl MprisError {
    /// Convert into the engine's error type, attributing the failure to `player`.
    #[must_use]
    pub fn into_core(self, player: &str) -> CoreError {
        match self {
            Self::UnknownStatus(_) | Self::InvalidTrackId { .. } => CoreError::PlayerMetadata {
                reason: format!("{player}: {self}"),
            },
            Self::DBus(_) | Self::Daemon(_) => CoreError::PlayerUnavailable {
                player: player.to_string(),
                reason: self.to_string(),
            },
        }
    }
}
