//! In-memory lyrics store with access-based expiry.

use crate::identity::TrackKey;
use crate::lrc::Lyrics;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug)]
struct CacheEntry {
    last_access: Instant,
    lyrics: Arc<Lyrics>,
}

/// Track key to lyrics map shared by the sync loop and the eviction sweeper.
///
/// An empty [`Lyrics`] entry records that the track was looked up and has no
/// usable lyrics.
#[derive(Debug, Default)]
pub struct LyricsStore {
    entries: RwLock<HashMap<TrackKey, CacheEntry>>,
}

impl LyricsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the lyrics for `key`.
    pub async fn save(&self, key: TrackKey, lyrics: Lyrics) -> Arc<Lyrics> {
        let lyrics = Arc::new(lyrics);
        self.entries.write().await.insert(
            key,
            CacheEntry {
                last_access: Instant::now(),
                lyrics: Arc::clone(&lyrics),
            },
        );
        lyrics
    }

    /// Look up `key`, extending the entry's lifetime on a hit.
    pub async fn load(&self, key: &TrackKey) -> Option<Arc<Lyrics>> {
        // Takes the write lock since a hit updates the access time
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(key)?;
        entry.last_access = Instant::now();
        Some(Arc::clone(&entry.lyrics))
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remove every entry not accessed within `threshold`. Returns the number
    /// of removed entries.
    pub async fn sweep(&self, threshold: Duration) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, entry| now.duration_since(entry.last_access) <= threshold);
        before - entries.len()
    }

    /// Sweep every `interval`, expiring entries idle for longer than
    /// `interval`, until `cancel` fires.
    pub async fn cleanup(&self, interval: Duration, cancel: CancellationToken) {
        info!("Lyrics store eviction running every {:?}", interval);
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("Lyrics store eviction shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = self.sweep(interval).await;
                    if removed > 0 {
                        debug!("Evicted {} idle lyrics entries", removed);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lrc::LyricLine;

    fn lyrics(text: &str) -> Lyrics {
        Lyrics::from_lines(vec![LyricLine::prelude(), LyricLine::new(Duration::from_secs(1), text)])
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = LyricsStore::new();
        let key = TrackKey::new("a");

        assert!(store.load(&key).await.is_none());

        store.save(key.clone(), lyrics("hello")).await;
        let loaded = store.load(&key).await.unwrap();
        assert_eq!(*loaded, lyrics("hello"));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = LyricsStore::new();
        let key = TrackKey::new("a");

        store.save(key.clone(), lyrics("first")).await;
        store.save(key.clone(), Lyrics::default()).await;

        assert!(store.load(&key).await.unwrap().is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_keeps_recently_loaded_entries() {
        let store = LyricsStore::new();
        let idle = TrackKey::new("idle");
        let busy = TrackKey::new("busy");
        let interval = Duration::from_secs(600);

        store.save(idle.clone(), lyrics("idle")).await;
        store.save(busy.clone(), lyrics("busy")).await;

        tokio::time::advance(Duration::from_secs(400)).await;
        assert!(store.load(&busy).await.is_some());

        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(store.sweep(interval).await, 1);

        assert!(store.load(&idle).await.is_none());
        assert!(store.load(&busy).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_loop_evicts_and_stops() {
        let store = Arc::new(LyricsStore::new());
        let cancel = CancellationToken::new();
        let interval = Duration::from_secs(10);

        store.save(TrackKey::new("a"), lyrics("a")).await;

        let task = tokio::spawn({
            let store = Arc::clone(&store);
            let cancel = cancel.clone();
            async move { store.cleanup(interval, cancel).await }
        });

        // First sweep at 10s finds the entry exactly 10s old and keeps it
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(store.len().await, 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(store.is_empty().await);

        cancel.cancel();
        task.await.unwrap();
    }
}
