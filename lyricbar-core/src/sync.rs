use crate::identity;
use crate::lrc::LyricLine;
use crate::output::{Emitter, Status, Waybar};
use crate::player::{PlaybackStatus, PlayerBus, PlayerSnapshot};
use crate::resolver::LyricsResolver;
use crate::time::format_timestamp;
use std::io::{self, Write};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Where the engine is in following the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No usable player or track
    Searching,
    /// Following a playing track
    Tracking,
    Paused,
    Stopped,
}

/// Engine that follows the player and emits the active lyric line
pub struct SyncEngine<B, W> {
    bus: B,
    resolver: LyricsResolver,
    emitter: Emitter<W>,
    fallback_interval: Duration,
    state: SyncState,
    output_closed: bool,
}

impl<B: PlayerBus, W: Write> SyncEngine<B, W> {
    /// Create a new sync engine
    ///
    /// `fallback_interval` is the poll period used whenever no line change is
    /// scheduled.
    pub fn new(
        bus: B,
        resolver: LyricsResolver,
        emitter: Emitter<W>,
        fallback_interval: Duration,
    ) -> Self {
        Self {
            bus,
            resolver,
            emitter,
            fallback_interval,
            state: SyncState::Searching,
            output_closed: false,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SyncState {
        self.state
    }

    #[must_use]
    pub const fn emitter(&self) -> &Emitter<W> {
        &self.emitter
    }

    /// Run until `cancel` fires or the reader of the output goes away.
    ///
    /// Each pass is triggered by whichever comes first: a player change
    /// notification, the initial pass, the next line boundary or the fallback
    /// interval. Notifications queued during a pass are folded into the next
    /// one.
    pub async fn run(&mut self, mut changes: mpsc::Receiver<()>, cancel: CancellationToken) {
        info!("Sync loop started");

        let mut fallback = tokio::time::interval_at(
            Instant::now() + self.fallback_interval,
            self.fallback_interval,
        );
        fallback.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let line_timer = tokio::time::sleep(self.fallback_interval);
        tokio::pin!(line_timer);

        let mut first_run = true;
        let mut changes_open = true;

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    info!("Sync loop shutting down");
                    break;
                }
                change = changes.recv(), if changes_open => {
                    if change.is_some() {
                        debug!("Received player change notification");
                    } else {
                        warn!("Player change notifications stopped, polling only");
                        changes_open = false;
                    }
                }
                () = std::future::ready(()), if first_run => {
                    first_run = false;
                }
                () = &mut line_timer => {
                    line_timer.as_mut().reset(Instant::now() + self.fallback_interval);
                }
                _ = fallback.tick() => {}
            }

            while changes.try_recv().is_ok() {}

            if let Some(wake) = self.tick().await {
                line_timer.as_mut().reset(Instant::now() + wake);
            }

            if self.output_closed {
                info!("Output closed, stopping sync loop");
                break;
            }
        }
    }

    /// Run one pass. Returns the delay until the next line starts when a
    /// line change should be scheduled.
    pub async fn tick(&mut self) -> Option<Duration> {
        let selected = match identity::select(&self.bus).await {
            Ok(selected) => selected,
            Err(e) => {
                debug!("Player not found: {}", e);
                self.show_nothing(SyncState::Searching);
                return None;
            }
        };

        let mut snapshot =
            match PlayerSnapshot::capture(&selected.player, selected.identity).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!("Failed to read player metadata: {}", e);
                    self.show_nothing(SyncState::Searching);
                    return None;
                }
            };

        debug!(
            player = %snapshot.player,
            id = %snapshot.track_key,
            artist = %snapshot.artist,
            title = %snapshot.title,
            length = %format_timestamp(snapshot.length),
            "Player state"
        );

        if snapshot.status == PlaybackStatus::Stopped {
            debug!("Player is stopped");
            self.show_nothing(SyncState::Stopped);
            return None;
        }

        let lyrics = match self.resolver.resolve(&snapshot).await {
            Ok(lyrics) => lyrics,
            Err(e) => {
                if e.is_missing_lyrics() {
                    debug!("No lyrics: {}", e);
                } else {
                    warn!("Failed to get lyrics: {}", e);
                }

                let mut waybar = Waybar::for_player(&snapshot, self.emitter.config());
                waybar.alt = Some(Status::NoLyric);
                self.transition(Self::playing_state(&snapshot));
                self.emit(waybar);
                return None;
            }
        };

        if let Err(e) = snapshot.update_position(&selected.player).await {
            warn!("Failed to update position: {}", e);
            return None;
        }

        let index = lyrics.active_index(snapshot.position);
        let current = lyrics.get(index)?;

        let config = self.emitter.config();
        let mut waybar = Waybar::for_lyrics(&lyrics, index, config);
        if config.detailed {
            waybar.info = Some(snapshot.clone());
        }
        waybar.percentage = snapshot.percentage();

        if snapshot.status == PlaybackStatus::Paused {
            waybar.paused(&snapshot, config);
            self.transition(SyncState::Paused);
            self.emit_line(waybar, current, &snapshot);
            return None;
        }

        if current.text.is_empty() {
            waybar.text = snapshot.display_title();
            waybar.alt = Some(Status::Music);
        }

        self.transition(SyncState::Tracking);
        self.emit_line(waybar, current, &snapshot);

        let next = lyrics.get(index + 1)?;
        match next.timestamp.checked_sub(snapshot.position) {
            Some(wake) if !wake.is_zero() => {
                debug!(
                    "Next line in {:?} (position {}, next {})",
                    wake,
                    format_timestamp(snapshot.position),
                    format_timestamp(next.timestamp)
                );
                Some(wake)
            }
            _ => {
                warn!(
                    "Next line is not ahead of the position (position {}, next {})",
                    format_timestamp(snapshot.position),
                    format_timestamp(next.timestamp)
                );
                None
            }
        }
    }

    fn playing_state(snapshot: &PlayerSnapshot) -> SyncState {
        if snapshot.status == PlaybackStatus::Paused {
            SyncState::Paused
        } else {
            SyncState::Tracking
        }
    }

    fn transition(&mut self, next: SyncState) {
        if self.state != next {
            info!("Sync state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn show_nothing(&mut self, state: SyncState) {
        self.transition(state);
        self.emit(Waybar::zero());
    }

    fn emit_line(&mut self, waybar: Waybar, line: &LyricLine, snapshot: &PlayerSnapshot) {
        if self.emit(waybar) {
            info!(
                line = %line.text,
                line_time = %format_timestamp(line.timestamp),
                position = %format_timestamp(snapshot.position),
                "Lyrics"
            );
        }
    }

    fn emit(&mut self, waybar: Waybar) -> bool {
        match self.emitter.emit(waybar) {
            Ok(written) => written,
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                self.output_closed = true;
                false
            }
            Err(e) => {
                error!("Failed to write output: {}", e);
                false
            }
        }
    }
}
