use crate::error::AppError;
use lyricbar_core::{
    Config, DiskCache, Emitter, LyricsResolver, LyricsStore, ProfanityFilter, SyncEngine,
};
use lyricbar_lyrics_lrclib::LrclibProvider;
use lyricbar_mpris::{watch_changes, MprisBus};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio::task::JoinError;
use tracing::{error, info, warn};

/// Build the lyric resolver: memory store, on-disk cache and LRCLIB.
///
/// # Errors
///
/// Returns an error if the HTTP client or the profanity filter cannot be built.
pub fn resolver(config: &Config) -> Result<LyricsResolver, AppError> {
    let provider = Arc::new(LrclibProvider::new(config.lyrics.request_timeout())?);
    let filter = ProfanityFilter::new(config.lyrics.filter_profanity)?;
    let disk = DiskCache::new();
    info!("Lyrics cache directory: {}", disk.dir().display());

    Ok(LyricsResolver::new(Arc::new(LyricsStore::new()), disk, provider).with_filter(filter))
}

/// Follow the active player and print Waybar updates to stdout until `cancel`
/// fires.
///
/// # Errors
///
/// Returns an error if the session bus or the resolver cannot be set up.
pub async fn watch(config: Config, cancel: CancellationToken) -> Result<(), AppError> {
    let bus = MprisBus::connect().await?;
    let resolver = resolver(&config)?;

    let store = Arc::clone(resolver.store());
    let eviction = config.lyrics.cache_eviction();
    let sweeper = tokio::spawn({
        let cancel = cancel.clone();
        async move { store.cleanup(eviction, cancel).await }
    });

    // A single slot is enough: the engine re-reads everything on each pass
    let (changes_tx, changes_rx) = mpsc::channel(1);
    let connection = bus.connection().clone();
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if let Err(e) = watch_changes(&connection, changes_tx, cancel).await {
                warn!("Player change notifications unavailable, polling only: {}", e);
            }
        }
    });

    let emitter = Emitter::new(io::stdout(), config.output.clone());
    let mut engine = SyncEngine::new(bus, resolver, emitter, config.sync.fallback_interval());

    info!("Watching for lyrics");
    engine.run(changes_rx, cancel.clone()).await;

    // The engine also stops when stdout closes
    cancel.cancel();
    let (sweeper, watcher) = tokio::join!(sweeper, watcher);
    task_finished("Cache sweeper", &sweeper);
    task_finished("Change watcher", &watcher);

    info!("Stopped");
    Ok(())
}

/// Log a background task that ended abnormally. Returns whether it ended
/// cleanly.
fn task_finished(task: &str, result: &Result<(), JoinError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            error!("{} task failed: {}", task, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_task_finished_reports_aborted_task() {
        let clean = tokio::spawn(async {});
        assert!(task_finished("clean", &clean.await));

        let stuck = tokio::spawn(std::future::pending::<()>());
        stuck.abort();
        assert!(!task_finished("stuck", &stuck.await));
    }
}
