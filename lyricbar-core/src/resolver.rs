//! Resolves the lyrics for the playing track through the memory store, the
//! disk cache and finally the remote provider.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{CacheHeader, DiskCache};
use crate::error::{CoreError, Result};
use crate::lrc::Lyrics;
use crate::player::PlayerSnapshot;
use crate::provider::{LyricsProvider, LyricsQuery};
use crate::store::LyricsStore;
use crate::text::ProfanityFilter;

pub struct LyricsResolver {
    store: Arc<LyricsStore>,
    disk: DiskCache,
    provider: Arc<dyn LyricsProvider>,
    filter: Option<ProfanityFilter>,
}

impl LyricsResolver {
    /// Create a new resolver
    ///
    /// # Arguments
    /// * `store` - Memory store shared with the eviction sweeper
    /// * `disk` - Flat-file cache that survives restarts
    /// * `provider` - Remote lyrics provider queried on a cache miss
    pub fn new(store: Arc<LyricsStore>, disk: DiskCache, provider: Arc<dyn LyricsProvider>) -> Self {
        Self {
            store,
            disk,
            provider,
            filter: None,
        }
    }

    /// Mask profanity in lyrics before they reach the memory store. The disk
    /// cache always keeps the original text.
    #[must_use]
    pub fn with_filter(mut self, filter: Option<ProfanityFilter>) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<LyricsStore> {
        &self.store
    }

    /// Get sorted lyrics for the snapshot's track.
    ///
    /// # Errors
    ///
    /// - [`CoreError::LyricsNotExists`] if an earlier lookup found nothing
    /// - [`CoreError::LyricsNotFound`] if the provider has no entry
    /// - [`CoreError::LyricsNotSynced`] if the provider only has plain lyrics
    /// - [`CoreError::LyricsProviderFailed`] for unexpected provider responses
    /// - [`CoreError::NetworkError`] if the provider could not be reached
    ///
    /// Every failure except a network error is remembered in the memory store
    /// so the provider is not asked again until the entry expires.
    pub async fn resolve(&self, snapshot: &PlayerSnapshot) -> Result<Arc<Lyrics>> {
        let key = &snapshot.track_key;

        if let Some(lyrics) = self.store.load(key).await {
            if lyrics.is_empty() {
                return Err(CoreError::LyricsNotExists);
            }
            debug!("Lyrics found in memory ({} lines)", lyrics.len());
            return Ok(lyrics);
        }

        match self.disk.load(key).await {
            Ok(Some(mut lyrics)) => {
                debug!("Lyrics found in disk cache ({} lines)", lyrics.len());
                lyrics.sort();
                lyrics.ensure_prelude();
                self.censor(&mut lyrics);
                return Ok(self.store.save(key.clone(), lyrics).await);
            }
            Ok(None) => debug!("No cached lyrics for {}", key),
            Err(e) => warn!("Ignoring unusable lyrics cache: {}", e),
        }

        match self.fetch(snapshot).await {
            Ok(mut lyrics) => {
                lyrics.sort();

                let header = CacheHeader::new(&snapshot.player, &snapshot.track_id)
                    .with_metadata(snapshot.metadata.clone());
                if let Err(e) = self.disk.store(key, &header, &lyrics).await {
                    warn!("Failed to cache lyrics: {}", e);
                }

                self.censor(&mut lyrics);
                Ok(self.store.save(key.clone(), lyrics).await)
            }
            Err(e) if e.is_transient() => Err(e),
            Err(e) => {
                self.store.save(key.clone(), Lyrics::default()).await;
                Err(e)
            }
        }
    }

    async fn fetch(&self, snapshot: &PlayerSnapshot) -> Result<Lyrics> {
        let query = LyricsQuery::new(&snapshot.title, &snapshot.artist)
            .with_album(&snapshot.album)
            .with_duration(snapshot.length);

        info!(
            "Fetching lyrics for: {} - {} (provider: {})",
            snapshot.artist,
            snapshot.title,
            self.provider.name()
        );

        let fetched = self.provider.fetch(&query).await?;
        let Some(synced) = fetched.synced_lyrics.filter(|text| !text.trim().is_empty()) else {
            if fetched.instrumental {
                info!("{} - {} is instrumental", snapshot.artist, snapshot.title);
            } else if fetched.plain_lyrics.is_some_and(|text| !text.trim().is_empty()) {
                info!(
                    "Only unsynced lyrics for {} - {}",
                    snapshot.artist, snapshot.title
                );
            }
            return Err(CoreError::LyricsNotSynced);
        };

        let lyrics = Lyrics::parse(&synced)?;
        info!(
            "Found synced lyrics from {} ({} lines, provider_id: {})",
            self.provider.name(),
            lyrics.len() - 1,
            fetched.provider_id
        );
        Ok(lyrics)
    }

    fn censor(&self, lyrics: &mut Lyrics) {
        if let Some(filter) = &self.filter {
            lyrics.map_text(|text| filter.censor(text));
        }
    }
}
