use async_trait::async_trait;
use lyricbar_core::{CoreError, FetchedLyrics, LyricsProvider, LyricsQuery, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::{debug, info, warn};

const LRCLIB_GET_URL: &str = "https://lrclib.net/api/get";

const PROVIDER_NAME: &str = "lrclib";

/// LRCLIB.net lyrics provider
pub struct LrclibProvider {
    client: Client,
}

impl LrclibProvider {
    /// Create a new LRCLIB provider. Each request gives up after `timeout`.
    ///
    /// Requests are never retried; a failed lookup is remembered by the
    /// resolver instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(timeout: Duration) -> Result<Self, CoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }
}

/// Response from LRCLIB API
/// Note: API returns additional fields (trackName, albumName) that we don't use;
/// serde ignores unknown fields by default.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LrclibResponse {
    id: i64,
    #[serde(default)]
    instrumental: bool,
    plain_lyrics: Option<String>,
    synced_lyrics: Option<String>,
}

/// Build the exact-match lookup URL for a query.
fn request_url(query: &LyricsQuery) -> String {
    let mut url = format!(
        "{}?track_name={}&artist_name={}",
        LRCLIB_GET_URL,
        urlencoding::encode(&query.track_name),
        urlencoding::encode(&query.artist_name)
    );

    if let Some(album) = &query.album_name {
        let _ = write!(url, "&album_name={}", urlencoding::encode(album));
    }

    if let Some(duration) = query.duration {
        let _ = write!(url, "&duration={:.2}", duration.as_secs_f64());
    }

    url
}

/// Map an LRCLIB response to fetched lyrics.
fn interpret(status: StatusCode, body: &str, query: &LyricsQuery) -> Result<FetchedLyrics, CoreError> {
    if status == StatusCode::NOT_FOUND {
        return Err(CoreError::LyricsNotFound {
            track: query.track_name.clone(),
            artist: query.artist_name.clone(),
        });
    }

    if status != StatusCode::OK {
        warn!("LRCLIB returned status: {}", status);
        return Err(CoreError::LyricsProviderFailed {
            provider: PROVIDER_NAME.to_string(),
            reason: format!("unexpected HTTP status: {status}"),
        });
    }

    let result: LrclibResponse =
        serde_json::from_str(body).map_err(|e| CoreError::LyricsProviderFailed {
            provider: PROVIDER_NAME.to_string(),
            reason: format!("failed to read response body: {e}"),
        })?;

    debug!(
        "LRCLIB match id {} (synced: {}, instrumental: {})",
        result.id,
        result.synced_lyrics.is_some(),
        result.instrumental
    );

    Ok(FetchedLyrics {
        provider_id: result.id.to_string(),
        synced_lyrics: result.synced_lyrics,
        plain_lyrics: result.plain_lyrics,
        instrumental: result.instrumental,
    })
}

#[async_trait]
impl LyricsProvider for LrclibProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch(&self, query: &LyricsQuery) -> Result<FetchedLyrics, CoreError> {
        let url = request_url(query);
        info!("Fetching lyrics from LRCLIB: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        debug!("LRCLIB response status: {}", status);

        let body = response.text().await?;
        interpret(status, &body, query)
    }
}
