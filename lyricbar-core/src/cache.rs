//! Flat-file lyrics cache.
//!
//! Each track is stored as `<cache dir>/<track key>.csv`: a block of `#`
//! comment lines describing the track, followed by one `<nanos>,<text>` line
//! per lyric.

use crate::error::{CoreError, Result};
use crate::identity::TrackKey;
use crate::lrc::{LyricLine, Lyrics};
use crate::time::DurationExt;
use chrono::{SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// File extension of cache entries
pub const CACHE_FILE_EXTENSION: &str = "csv";

/// Descriptive comment block written above the lyric lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheHeader {
    pub player: String,
    pub track_id: String,
    /// Raw player metadata (`xesam:albumArtist` style keys)
    pub metadata: BTreeMap<String, String>,
}

impl CacheHeader {
    pub fn new(player: impl Into<String>, track_id: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            track_id: track_id.into(),
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Convert a namespaced metadata key such as `xesam:albumArtist` into
/// `ALBUM_ARTIST`. Keys without a namespace are ignored.
fn header_key(key: &str) -> Option<String> {
    let (_, name) = key.split_once(':')?;
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_uppercase() {
            out.push('_');
        }
        out.extend(c.to_uppercase());
    }
    Some(out)
}

/// Serialize lyrics with their header into the cache file format.
#[must_use]
pub fn encode(header: &CacheHeader, lyrics: &Lyrics) -> String {
    let mut out = String::new();

    // Writing into a String never fails
    let _ = writeln!(out, "# PLAYER: {}", header.player);
    let _ = writeln!(out, "# ID: {}", header.track_id);
    let _ = writeln!(
        out,
        "# CACHED_AT: {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    let mut meta: Vec<String> = header
        .metadata
        .iter()
        .filter_map(|(key, value)| {
            let key = header_key(key)?;
            Some(format!("# {key}: {}", value.replace(['\n', '\r'], " ")))
        })
        .collect();
    meta.sort();
    for line in meta {
        out.push_str(&line);
        out.push('\n');
    }

    for line in lyrics {
        let _ = writeln!(out, "{},{}", line.timestamp.as_nanos_u64(), line.text);
    }

    out
}

/// Parse the cache file format.
///
/// Comment and blank lines are skipped. Any other line must be
/// `<nanos>,<text>`; one bad line rejects the whole file.
///
/// # Errors
///
/// Returns a description of the first malformed line, or of an input that
/// holds no lyric lines at all.
pub fn decode(input: &str) -> std::result::Result<Lyrics, String> {
    let mut lines = Vec::new();

    for (number, line) in input.lines().enumerate() {
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let (stamp, text) = line
            .split_once(',')
            .ok_or_else(|| format!("line {} has no timestamp separator", number + 1))?;
        let nanos: u64 = stamp
            .trim()
            .parse()
            .map_err(|e| format!("line {} has a bad timestamp: {e}", number + 1))?;

        lines.push(LyricLine::new(Duration::from_nanos(nanos), text.trim()));
    }

    if lines.is_empty() {
        return Err("no lyric lines".to_string());
    }

    Ok(Lyrics::from_lines(lines))
}

/// Lyrics cache stored as one file per track under a directory
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    /// Cache rooted at the default per-user cache directory
    #[must_use]
    pub fn new() -> Self {
        Self::open(crate::paths::cache_dir())
    }

    /// Cache rooted at a specific directory. The directory is created on the
    /// first write.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, key: &TrackKey) -> PathBuf {
        self.dir
            .join(format!("{}.{CACHE_FILE_EXTENSION}", key.as_str()))
    }

    /// Read cached lyrics for a track.
    ///
    /// Returns `Ok(None)` when nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CacheCorrupt`] when the file exists but cannot be
    /// decoded, or an IO error when it cannot be read.
    pub async fn load(&self, key: &TrackKey) -> Result<Option<Lyrics>> {
        let path = self.path_for(key);
        debug!("Looking up lyrics cache file {:?}", path);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        decode(&content)
            .map(Some)
            .map_err(|reason| CoreError::CacheCorrupt { path, reason })
    }

    /// Write lyrics for a track, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory or file cannot be written.
    pub async fn store(&self, key: &TrackKey, header: &CacheHeader, lyrics: &Lyrics) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(key);
        tokio::fs::write(&path, encode(header, lyrics)).await?;

        info!("Cached {} lyric lines at {:?}", lyrics.len(), path);
        Ok(())
    }
}

impl Default for DiskCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache(name: &str) -> DiskCache {
        let dir = std::env::temp_dir().join(format!(
            "lyricbar-cache-test-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        DiskCache::open(dir)
    }

    fn sample_lyrics() -> Lyrics {
        let mut lyrics = Lyrics::parse("[00:05.00]First line\n[00:10.50]Second, with comma").unwrap();
        lyrics.sort();
        lyrics
    }

    #[test]
    fn test_header_key() {
        assert_eq!(header_key("xesam:albumArtist").as_deref(), Some("ALBUM_ARTIST"));
        assert_eq!(header_key("mpris:length").as_deref(), Some("LENGTH"));
        assert_eq!(header_key("xesam:url").as_deref(), Some("URL"));
        assert_eq!(header_key("plain"), None);
    }

    #[test]
    fn test_encode_layout() {
        let mut metadata = BTreeMap::new();
        metadata.insert("xesam:title".to_string(), "Song".to_string());
        metadata.insert("xesam:albumArtist".to_string(), "Band\nName".to_string());
        metadata.insert("nonamespace".to_string(), "skipped".to_string());
        let header = CacheHeader::new("spotify", "spotify:track:1").with_metadata(metadata);

        let encoded = encode(&header, &sample_lyrics());
        let lines: Vec<&str> = encoded.lines().collect();

        assert_eq!(lines[0], "# PLAYER: spotify");
        assert_eq!(lines[1], "# ID: spotify:track:1");
        assert!(lines[2].starts_with("# CACHED_AT: "));
        assert_eq!(lines[3], "# ALBUM_ARTIST: Band Name");
        assert_eq!(lines[4], "# TITLE: Song");
        assert_eq!(lines[5], "0,");
        assert_eq!(lines[6], "5000000000,First line");
        assert_eq!(lines[7], "10500000000,Second, with comma");
        assert!(!encoded.contains("skipped"));
    }

    #[test]
    fn test_decode_reads_back_encoded_lines() {
        let lyrics = sample_lyrics();
        let decoded = decode(&encode(&CacheHeader::new("p", "id"), &lyrics)).unwrap();
        assert_eq!(decoded, lyrics);
    }

    #[test]
    fn test_decode_skips_comments_and_blank_lines() {
        let decoded = decode("# PLAYER: x\n\n1000000000, Hello \n").unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.lines()[0].text, "Hello");
        assert_eq!(decoded.lines()[0].timestamp, Duration::from_secs(1));
    }

    #[test]
    fn test_decode_rejects_malformed_line() {
        let err = decode("1000000000,ok\nnot a lyric line\n").unwrap_err();
        assert!(err.contains("line 2"), "{err}");

        assert!(decode("12.5,fractional\n").is_err());
        assert!(decode("-5,negative\n").is_err());
    }

    #[test]
    fn test_decode_rejects_empty_file() {
        assert_eq!(decode("# PLAYER: x\n# ID: y\n").unwrap_err(), "no lyric lines");
        assert!(decode("").is_err());
    }

    #[tokio::test]
    async fn test_store_then_load() {
        let cache = temp_cache("roundtrip");
        let key = TrackKey::new("abc123");
        let lyrics = sample_lyrics();

        assert!(cache.load(&key).await.unwrap().is_none());

        cache
            .store(&key, &CacheHeader::new("spotify", "1"), &lyrics)
            .await
            .unwrap();
        assert!(cache.path_for(&key).exists());

        let loaded = cache.load(&key).await.unwrap().unwrap();
        assert_eq!(loaded, lyrics);

        let _ = std::fs::remove_dir_all(cache.dir());
    }

    #[tokio::test]
    async fn test_load_corrupt_file() {
        let cache = temp_cache("corrupt");
        let key = TrackKey::new("broken");
        std::fs::create_dir_all(cache.dir()).unwrap();
        std::fs::write(cache.path_for(&key), "garbage\n").unwrap();

        let err = cache.load(&key).await.unwrap_err();
        assert!(matches!(err, CoreError::CacheCorrupt { .. }));

        let _ = std::fs::remove_dir_all(cache.dir());
    }
}
