//! HTTP transport for the daily dataset.
//!
//! ### Attempt semantics
//! - One GET per call; the retry loop lives in `dayfetch_core`.
//! - Success is HTTP 200 exactly. Any other status, including other 2xx
//!   codes, is a failed attempt.
//! - Every attempt is bounded by the configured timeout.
//!
//! ### Limits
//! - Max redirects: 5
//! - Max body bytes: 50MB (configurable)

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, check_root, parse_link};

use dayfetch_core::{AppConfig, AttemptFailure, Error, Transport};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "dayfetch/<version>")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 50MB)
    pub max_bytes: usize,

    /// Per-attempt timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// Whether proxies from the environment apply (default: true)
    pub use_env_proxy: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: 5,
            use_env_proxy: true,
        }
    }
}

/// HTTP client performing single download attempts.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }

        let http = builder
            .build()
            .map_err(|e| Error::ClientInit(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn too_large(&self, len: usize) -> Option<AttemptFailure> {
        (len > self.config.max_bytes).then_some(AttemptFailure::TooLarge { limit: self.config.max_bytes })
    }
}

fn classify(err: reqwest::Error) -> AttemptFailure {
    if err.is_timeout() { AttemptFailure::Timeout } else { AttemptFailure::Network(err.to_string()) }
}

#[async_trait]
impl Transport for FetchClient {
    async fn fetch_once(&self, link: &str) -> Result<Bytes, AttemptFailure> {
        let start = Instant::now();
        let url = parse_link(link).map_err(|e| AttemptFailure::InvalidUrl(e.to_string()))?;

        let response = self.http.get(url.as_str()).send().await.map_err(classify)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AttemptFailure::Status(status.as_u16()));
        }

        if let Some(len) = response.content_length()
            && let Some(failure) = self.too_large(len as usize)
        {
            return Err(failure);
        }

        let bytes = response.bytes().await.map_err(classify)?;

        if let Some(failure) = self.too_large(bytes.len()) {
            return Err(failure);
        }

        tracing::debug!("fetched {} in {}ms ({} bytes)", url, start.elapsed().as_millis(), bytes.len());

        Ok(bytes)
    }
}
