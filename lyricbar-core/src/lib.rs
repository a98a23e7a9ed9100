pub mod cache;
pub mod config;
pub mod control;
pub mod error;
pub mod identity;
pub mod lrc;
pub mod output;
pub mod paths;
pub mod player;
pub mod provider;
pub mod resolver;
pub mod store;
pub mod sync;
pub mod text;
pub mod time;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheHeader, DiskCache};
pub use config::{Config, LoggingConfig, LyricsConfig, OutputConfig, SyncConfig};
pub use control::VolumeChange;
pub use error::{CoreError, Result};
pub use identity::{select, IdentityKind, SelectedPlayer, TrackKey, SUPPORTED_PLAYERS};
pub use lrc::{LyricLine, Lyrics};
pub use output::{Emitter, Status, Waybar};
pub use paths::{cache_dir, config_dir, config_path, log_path, APP_DIR_NAME, USER_AGENT};
pub use player::{MediaPlayer, PlaybackStatus, PlayerBus, PlayerSnapshot, TrackMetadata};
pub use provider::{FetchedLyrics, LyricsProvider, LyricsQuery};
pub use resolver::LyricsResolver;
pub use store::LyricsStore;
pub use sync::{SyncEngine, SyncState};
pub use text::{FilterMode, ProfanityFilter};
pub use time::{format_timestamp, parse_timestamp, DurationExt};
