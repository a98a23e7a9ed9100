//! Player control: volume, absolute position and lyric-line navigation.

use crate::error::{CoreError, Result};
use crate::lrc::Lyrics;
use crate::player::{MediaPlayer, PlayerSnapshot};
use std::time::Duration;
use tracing::{debug, info};

/// Requested volume change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeChange {
    /// Absolute volume between 0.0 and 1.0
    Set(f64),
    /// Signed offset added to the current volume
    Adjust(f64),
}

impl VolumeChange {
    /// The volume to apply given the player's current volume, clamped to 0..=1.
    #[must_use]
    pub fn apply(self, current: f64) -> f64 {
        match self {
            Self::Set(volume) => volume.clamp(0.0, 1.0),
            Self::Adjust(delta) => (current + delta).clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub const fn is_relative(self) -> bool {
        matches!(self, Self::Adjust(_))
    }
}

/// Apply a volume change and return the volume that was set.
///
/// # Errors
///
/// Propagates player errors.
pub async fn change_volume<P: MediaPlayer + ?Sized>(player: &P, change: VolumeChange) -> Result<f64> {
    let current = if change.is_relative() {
        player.volume().await?
    } else {
        0.0
    };
    let volume = change.apply(current);

    info!(player = player.name(), "Setting player volume to {:.2}", volume);
    player.set_volume(volume).await?;
    Ok(volume)
}

/// Jump to `position`, counted back from the end of the track when
/// `from_end` is set. Returns the absolute position.
///
/// # Errors
///
/// Returns [`CoreError::PlayerMetadata`] when counting from the end of a
/// track with no known length, and propagates player errors.
pub async fn set_position<P: MediaPlayer + ?Sized>(
    player: &P,
    position: Duration,
    from_end: bool,
) -> Result<Duration> {
    let metadata = player.metadata().await?;

    let target = if from_end {
        let length = metadata.length.ok_or_else(|| CoreError::PlayerMetadata {
            reason: format!("{} did not report a track length", player.name()),
        })?;
        length.saturating_sub(position)
    } else {
        position
    };

    let track_id = metadata.track_id.unwrap_or_default();
    info!(player = player.name(), "Setting player position to {:?}", target);
    player.set_position(&track_id, target).await?;
    Ok(target)
}

/// Timestamp of lyric line `line`; negative numbers count from the end.
///
/// # Errors
///
/// Returns [`CoreError::LineOutOfRange`] when there is no such line.
pub fn line_timestamp(lyrics: &Lyrics, line: i64) -> Result<Duration> {
    let count = lyrics.len();
    let index = if line < 0 {
        i64::try_from(count).ok().map(|count| count + line)
    } else {
        Some(line)
    };

    index
        .and_then(|i| usize::try_from(i).ok())
        .and_then(|i| lyrics.get(i))
        .map(|l| l.timestamp)
        .ok_or(CoreError::LineOutOfRange {
            count,
            requested: line,
        })
}

/// Jump to the start of lyric line `line` of the snapshot's track.
///
/// # Errors
///
/// Returns [`CoreError::LineOutOfRange`] for a missing line and propagates
/// player errors.
pub async fn jump_to_line<P: MediaPlayer + ?Sized>(
    player: &P,
    snapshot: &PlayerSnapshot,
    lyrics: &Lyrics,
    line: i64,
) -> Result<Duration> {
    let position = line_timestamp(lyrics, line)?;
    info!(player = player.name(), "Jumping to line {} at {:?}", line, position);
    player.set_position(&snapshot.track_id, position).await?;
    Ok(position)
}

/// Move `lines` lyric lines away from the active one.
///
/// # Errors
///
/// Returns [`CoreError::LineOutOfRange`] when the target line does not exist
/// and propagates player errors.
pub async fn seek_lines<P: MediaPlayer + ?Sized>(
    player: &P,
    snapshot: &PlayerSnapshot,
    lyrics: &Lyrics,
    lines: i64,
) -> Result<Duration> {
    let current = lyrics.active_index(snapshot.position);
    let line = i64::try_from(current).unwrap_or(i64::MAX).saturating_add(lines);
    debug!("Active line {}, moving to line {}", current, line);

    jump_to_line(player, snapshot, lyrics, line).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityKind;
    use crate::lrc::LyricLine;
    use crate::testing::FakePlayer;

    fn lyrics() -> Lyrics {
        Lyrics::from_lines(vec![
            LyricLine::prelude(),
            LyricLine::new(Duration::from_secs(5), "First"),
            LyricLine::new(Duration::from_secs(10), "Second"),
            LyricLine::new(Duration::from_secs(15), "Third"),
        ])
    }

    fn player() -> FakePlayer {
        FakePlayer::playing("amarok", "Artist", "Title", Duration::from_secs(200))
            .with_position(Duration::from_secs(7))
    }

    #[test]
    fn test_volume_change_apply() {
        assert!((VolumeChange::Set(0.3).apply(0.9) - 0.3).abs() < f64::EPSILON);
        assert!((VolumeChange::Adjust(0.5).apply(0.8) - 1.0).abs() < f64::EPSILON);
        assert!(VolumeChange::Adjust(-0.5).apply(0.2).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_change_volume_relative() {
        let player = player();
        player.state().volume = 0.5;

        let volume = change_volume(&player, VolumeChange::Adjust(-0.1)).await.unwrap();
        assert!((volume - 0.4).abs() < 1e-9);
        assert!((player.state().volume - 0.4).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_set_position_from_end() {
        let player = player();

        let target = set_position(&player, Duration::from_secs(10), true).await.unwrap();
        assert_eq!(target, Duration::from_secs(190));
        assert_eq!(
            player.state().set_positions,
            vec![("/fake/amarok/1".to_string(), Duration::from_secs(190))]
        );
    }

    #[tokio::test]
    async fn test_set_position_from_end_needs_length() {
        let player = player();
        player.state().metadata.length = None;

        let err = set_position(&player, Duration::from_secs(10), true).await.unwrap_err();
        assert!(matches!(err, CoreError::PlayerMetadata { .. }));
        assert!(set_position(&player, Duration::from_secs(10), false).await.is_ok());
    }

    #[test]
    fn test_line_timestamp() {
        let lyrics = lyrics();
        assert_eq!(line_timestamp(&lyrics, 0).unwrap(), Duration::ZERO);
        assert_eq!(line_timestamp(&lyrics, 1).unwrap(), Duration::from_secs(5));
        assert_eq!(line_timestamp(&lyrics, -1).unwrap(), Duration::from_secs(15));
        assert_eq!(line_timestamp(&lyrics, -4).unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_line_timestamp_out_of_range() {
        let lyrics = lyrics();
        assert!(matches!(
            line_timestamp(&lyrics, 4),
            Err(CoreError::LineOutOfRange { count: 4, requested: 4 })
        ));
        assert!(matches!(
            line_timestamp(&lyrics, -5),
            Err(CoreError::LineOutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_seek_lines_from_active_line() {
        let player = player();
        let mut snapshot = PlayerSnapshot::capture(&player, IdentityKind::ArtistTitle)
            .await
            .unwrap();
        snapshot.update_position(&player).await.unwrap();
        let lyrics = lyrics();

        let next = seek_lines(&player, &snapshot, &lyrics, 1).await.unwrap();
        assert_eq!(next, Duration::from_secs(10));

        let previous = seek_lines(&player, &snapshot, &lyrics, -1).await.unwrap();
        assert_eq!(previous, Duration::ZERO);
        assert_eq!(player.state().position, Duration::ZERO);

        assert!(seek_lines(&player, &snapshot, &lyrics, 5).await.is_err());
    }

    #[tokio::test]
    async fn test_jump_to_line_uses_track_id() {
        let player = player();
        let snapshot = PlayerSnapshot::capture(&player, IdentityKind::ArtistTitle)
            .await
            .unwrap();

        jump_to_line(&player, &snapshot, &lyrics(), -1).await.unwrap();
        assert_eq!(
            player.state().set_positions,
            vec![("/fake/amarok/1".to_string(), Duration::from_secs(15))]
        );
    }
}
