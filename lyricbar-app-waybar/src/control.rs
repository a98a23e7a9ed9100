//! One-shot player control subcommands.

use crate::args::{parse_line_number, parse_signed_duration};
use crate::error::AppError;
use lyricbar_core::control::{self, VolumeChange};
use lyricbar_core::{select, Config, Lyrics, MediaPlayer, PlayerSnapshot, SelectedPlayer};
use lyricbar_mpris::{MprisBus, MprisPlayer};
use std::sync::Arc;
use tracing::{debug, info};

async fn select_player() -> Result<SelectedPlayer<MprisPlayer>, AppError> {
    let bus = MprisBus::connect().await?;
    let selected = select(&bus).await?;
    debug!("Selected player {}", selected.player.name());
    Ok(selected)
}

/// Capture the player with its live position and resolve lyrics for its
/// current track.
async fn current_lyrics(
    config: &Config,
    selected: &SelectedPlayer<MprisPlayer>,
) -> Result<(PlayerSnapshot, Arc<Lyrics>), AppError> {
    let mut snapshot = PlayerSnapshot::capture(&selected.player, selected.identity).await?;
    snapshot.update_position(&selected.player).await?;
    debug!(title = %snapshot.title, artist = %snapshot.artist, "Parsed player information");

    let lyrics = crate::watch::resolver(config)?.resolve(&snapshot).await?;
    debug!("Resolved {} lyric lines", lyrics.len());

    Ok((snapshot, lyrics))
}

pub async fn play_pause() -> Result<(), AppError> {
    let selected = select_player().await?;
    info!(player = selected.player.name(), "Toggling playback");
    selected.player.play_pause().await?;
    Ok(())
}

pub async fn volume(change: VolumeChange) -> Result<(), AppError> {
    let selected = select_player().await?;
    control::change_volume(&selected.player, change).await?;
    Ok(())
}

/// Jump to an absolute position, or to the start of a lyric line with `lyric`.
pub async fn position(config: &Config, lyric: bool, target: &str) -> Result<(), AppError> {
    let selected = select_player().await?;

    if lyric {
        let line = parse_line_number(target).map_err(AppError::InvalidArgument)?;
        let (snapshot, lyrics) = current_lyrics(config, &selected).await?;
        control::jump_to_line(&selected.player, &snapshot, &lyrics, line).await?;
    } else {
        let target = parse_signed_duration(target).map_err(AppError::InvalidArgument)?;
        control::set_position(&selected.player, target.magnitude, target.negative).await?;
    }

    Ok(())
}

/// Move by a signed offset, or by a number of lyric lines with `lyric`.
pub async fn seek(config: &Config, lyric: bool, offset: &str) -> Result<(), AppError> {
    let selected = select_player().await?;

    if lyric {
        let lines = parse_line_number(offset).map_err(AppError::InvalidArgument)?;
        let (snapshot, lyrics) = current_lyrics(config, &selected).await?;
        control::seek_lines(&selected.player, &snapshot, &lyrics, lines).await?;
    } else {
        let offset = parse_signed_duration(offset).map_err(AppError::InvalidArgument)?;
        info!(player = selected.player.name(), "Seeking {}us", offset.as_micros_i64());
        selected.player.seek(offset.as_micros_i64()).await?;
    }

    Ok(())
}
