//! Audio sources
//!
//! An analysis request is either uploaded bytes or a URL. URLs are fetched
//! with a bounded timeout; streaming-platform URLs normally fail to yield
//! raw audio, so [`source_identity`] reduces them to a stable identifier for
//! seeding the mock.

use once_cell::sync::Lazy;
use promptune_common::config::FetchConfig;
use promptune_common::SourceKind;
use regex::Regex;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// What to analyse, resolved once at the entry point
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// Uploaded file contents with the client-supplied filename
    File { bytes: Vec<u8>, name: String },
    /// Remote audio (or streaming-platform page) URL
    Url(String),
}

impl AudioSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            AudioSource::File { .. } => SourceKind::File,
            AudioSource::Url(_) => SourceKind::Url,
        }
    }
}

/// URL fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be parsed or has an unsupported scheme
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network communication error (includes timeouts)
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("HTTP error {0}: {1}")]
    Status(u16, String),

    /// Response body exceeds the configured limit (bytes seen so far, limit)
    #[error("Response too large: at least {0} bytes (limit {1})")]
    TooLarge(u64, usize),
}

static YOUTUBE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:youtube\.com/(?:[^/\n\s]+/\S+/|(?:v|e(?:mbed)?)/|\S*?[?&]v=)|youtu\.be/)([a-zA-Z0-9_-]{11})",
    )
    .expect("valid YouTube id pattern")
});

static SPOTIFY_TRACK_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"track/([a-zA-Z0-9]+)").expect("valid Spotify id pattern"));

/// Stable mock seed for a URL
///
/// - YouTube: the 11-character video id
/// - Spotify: the track id
/// - SoundCloud: the URL path
///
/// Falls back to the whole URL when no identifier can be extracted.
pub fn source_identity(url: &str) -> String {
    let identifier = if url.contains("youtube.com") || url.contains("youtu.be") {
        YOUTUBE_ID
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    } else if url.contains("spotify.com") {
        SPOTIFY_TRACK_ID
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    } else if url.contains("soundcloud.com") {
        reqwest::Url::parse(url).ok().map(|u| u.path().to_string())
    } else {
        None
    };

    match identifier {
        Some(id) if !id.is_empty() => id,
        _ => url.to_string(),
    }
}

/// Display filename for a URL: last path segment without query string
///
/// Generates `audio_from_url_<uuid>` when the URL ends in a slash.
pub fn filename_from_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    let last = without_query.rsplit('/').next().unwrap_or_default();

    if last.is_empty() {
        format!("audio_from_url_{}", Uuid::new_v4())
    } else {
        last.to_string()
    }
}

/// Downloads audio bytes from URLs
pub struct SourceFetcher {
    http_client: reqwest::Client,
    max_bytes: usize,
}

impl SourceFetcher {
    /// Create a fetcher with the configured timeout and user agent
    pub fn new(config: &FetchConfig, max_bytes: usize) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            max_bytes,
        })
    }

    /// Download the body behind `url`
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        debug!(url = %url, "Fetching audio");

        let mut response = self
            .http_client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("").to_string();
            return Err(FetchError::Status(status.as_u16(), reason));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes as u64 {
                return Err(FetchError::TooLarge(length, self.max_bytes));
            }
        }

        // Content-Length may be absent (chunked) or wrong; cap while reading
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?
        {
            let received = body.len() + chunk.len();
            if received > self.max_bytes {
                return Err(FetchError::TooLarge(received as u64, self.max_bytes));
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url = %url, bytes = body.len(), "Fetched audio");

        Ok(body)
    }
}
