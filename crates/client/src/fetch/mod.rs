//! Network fetches behind the worker's caching strategies.
//!
//! ### Contract
//! - A response with any status is a successful fetch; callers decide what a
//!   non-2xx status means for them.
//! - Transport failures map to `Error::Network`, client timeouts to
//!   `Error::FetchTimeout`, oversize bodies to `Error::FetchTooLarge`.
//! - No retries. A dispatched fetch runs to completion or failure.

pub mod url;

use reqwest::Client;
use std::time::{Duration, Instant};

pub use self::url::{UrlError, resolve};

use swcache_core::{CachedResponse, Error, Request};

/// Source of live responses.
///
/// The worker only ever talks to the network through this trait, which keeps
/// the strategies testable without sockets.
#[async_trait::async_trait]
pub trait Network: Send + Sync {
    /// Perform the request against the network.
    async fn fetch(&self, request: &Request) -> Result<CachedResponse, Error>;
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "swcache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 10MB)
    pub max_bytes: usize,

    /// Client-level timeout (default: 30s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "swcache/0.1".to_string(),
            max_bytes: 10 * 1024 * 1024,
            timeout: Duration::from_millis(30_000),
            max_redirects: 5,
        }
    }
}

impl From<&swcache_core::AppConfig> for FetchConfig {
    fn from(config: &swcache_core::AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// reqwest-backed [`Network`] implementation.
pub struct HttpFetcher {
    http: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn map_send_error(url: &str, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::FetchTimeout(format!("{url}: {err}"))
        } else {
            Error::Network(format!("{url}: {err}"))
        }
    }
}

#[async_trait::async_trait]
impl Network for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<CachedResponse, Error> {
        let start = Instant::now();
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| Error::InvalidInput(format!("unsupported method: {}", request.method)))?;

        let response = self
            .http
            .request(method, request.url.clone())
            .send()
            .await
            .map_err(|e| Self::map_send_error(request.url.as_str(), e))?;

        let status = response.status();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter(|(name, _)| is_storable_header(name.as_str()))
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        let body: bytes::Bytes = response
            .bytes()
            .await
            .map_err(|e| Self::map_send_error(request.url.as_str(), e))?;

        if body.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", body.len(), self.config.max_bytes)));
        }

        tracing::debug!(
            url = %request.url,
            status = status.as_u16(),
            bytes = body.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "network fetch"
        );

        Ok(CachedResponse { url: request.url.to_string(), status: status.as_u16(), headers, body: body.to_vec() })
    }
}

/// Whether a header should survive into a stored snapshot.
///
/// Hop-by-hop headers and cookies are dropped.
pub fn is_storable_header(name: &str) -> bool {
    !matches!(
        name.to_ascii_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "transfer-encoding"
            | "upgrade"
            | "proxy-authenticate"
            | "te"
            | "trailer"
            | "set-cookie"
    )
}
