//! Resource retrieval for schedules and media listings.
//!
//! A locator is an `http(s)://` URL, a `file://` URL, or a plain filesystem
//! path. Every fetch is bounded by the configured timeout.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use recordings_shared::{FetchConfig, RecordingsError, Result};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Maximum response size we accept (64 MB).
const MAX_RESPONSE_SIZE: u64 = 64 * 1024 * 1024;

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("Recordings/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Locator
// ---------------------------------------------------------------------------

/// Where a resource lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Locator {
    Http(Url),
    File(PathBuf),
}

impl Locator {
    pub(crate) fn parse(raw: &str) -> Result<Self> {
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::Http(url)),
            Ok(url) if url.scheme() == "file" => url.to_file_path().map(Self::File).map_err(|_| {
                RecordingsError::validation(format!("not a usable file URL: {raw}"))
            }),
            // Drive letters (`C:\…`) parse as one-letter schemes.
            Ok(url) if url.scheme().len() == 1 => Ok(Self::File(PathBuf::from(raw))),
            Ok(url) => Err(RecordingsError::validation(format!(
                "unsupported locator scheme '{}': {raw}",
                url.scheme()
            ))),
            Err(_) => Ok(Self::File(PathBuf::from(raw))),
        }
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Fetches locators as text with a per-fetch timeout.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    max_bytes: u64,
}

impl Fetcher {
    /// Create a fetcher from the `[fetch]` config section.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| RecordingsError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout: Duration::from_secs(config.timeout_secs),
            max_bytes: MAX_RESPONSE_SIZE,
        })
    }

    /// Override the per-fetch timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Override the largest HTTP body accepted.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Fetch `locator` as text. Expiry of the timeout is a [`RecordingsError::Timeout`].
    pub async fn fetch_text(&self, locator: &str) -> Result<String> {
        let target = Locator::parse(locator)?;

        match tokio::time::timeout(self.timeout, self.fetch_locator(locator, target)).await {
            Ok(result) => result,
            Err(_) => Err(RecordingsError::Timeout {
                locator: locator.to_string(),
                after: self.timeout,
            }),
        }
    }

    async fn fetch_locator(&self, raw: &str, target: Locator) -> Result<String> {
        match target {
            Locator::Http(url) => self.fetch_http(&url).await,
            Locator::File(path) => {
                debug!(path = %path.display(), "reading local resource");
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|e| RecordingsError::io(&path, e))?;
                debug!(locator = raw, bytes = bytes.len(), "local resource read");
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }

    async fn fetch_http(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching");

        let mut response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| RecordingsError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecordingsError::Network(format!("{url}: HTTP {status}")));
        }

        if let Some(len) = response.content_length() {
            if len > self.max_bytes {
                return Err(self.too_large(url, len));
            }
        }

        // Chunked responses carry no length, so the cap is also enforced while reading.
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| RecordingsError::Network(format!("{url}: failed to read body: {e}")))?
        {
            let len = (body.len() + chunk.len()) as u64;
            if len > self.max_bytes {
                return Err(self.too_large(url, len));
            }
            body.extend_from_slice(&chunk);
        }

        debug!(%url, bytes = body.len(), "fetched");
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn too_large(&self, url: &Url, len: u64) -> RecordingsError {
        RecordingsError::validation(format!(
            "{url}: response too large (at least {len} bytes, max {})",
            self.max_bytes
        ))
    }
}
