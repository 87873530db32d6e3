//! HTTP fetch client for the cache agent.
//!
//! ### Fetch modes
//! - `fetch` — plain GET, used when answering intercepted requests.
//! - `fetch_reloading` — GET with `Cache-Control: no-cache`, used during
//!   install so the app shell bypasses intermediate HTTP caches.
//!
//! ### Response classification
//! Responses are classified against the app origin: a `Basic` response came
//! from the app's own origin and may be persisted; a `CrossOrigin` response
//! (CDN assets and the like) is passed through but never stored.
//!
//! Non-2xx statuses are NOT errors here: the agent passes them through to
//! the caller and simply declines to persist them. Only transport failures
//! and oversized bodies surface as errors.

pub mod url;

use bytes::Bytes;
use reqwest::Url;
use reqwest::{Client, StatusCode, header};
use shellcache_core::AppConfig;
use shellcache_core::Error;
use std::time::{Duration, Instant};

pub use url::{UrlError, resolve, same_origin};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "shellcache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "shellcache/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl FetchConfig {
    /// Derive fetch settings from the loaded application configuration.
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
        }
    }
}

/// Classification of a response against the app origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Same-origin response; eligible for persistence.
    Basic,
    /// Response from another origin; passed through, never persisted.
    CrossOrigin,
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The original URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes; cloning is O(1), so one handle can be returned
    /// to the caller while another is persisted
    pub bytes: Bytes,
    /// Response headers
    pub headers: header::HeaderMap,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Whether any redirect was followed while producing this response.
    pub fn redirected(&self) -> bool {
        self.url != self.final_url
    }

    /// Classify this response against the app origin.
    ///
    /// `Basic` requires both the requested and the final URL to share the
    /// app's origin.
    pub fn classify(&self, origin: &Url) -> ResponseKind {
        if same_origin(origin, &self.url) && same_origin(origin, &self.final_url) {
            ResponseKind::Basic
        } else {
            ResponseKind::CrossOrigin
        }
    }
}

/// HTTP fetch client.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
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
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Fetch a URL, returning raw bytes and metadata.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        self.get(url, false).await
    }

    /// Fetch a URL, bypassing intermediate HTTP caches.
    ///
    /// Used during install so manifest assets come from the network, not a
    /// stale proxy or browser cache.
    pub async fn fetch_reloading(&self, url: &Url) -> Result<FetchResponse, Error> {
        self.get(url, true).await
    }

    async fn get(&self, url: &Url, bypass_http_cache: bool) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let mut request = self.http.get(url.as_str());
        if bypass_http_cache {
            request = request
                .header(header::CACHE_CONTROL, "no-cache")
                .header(header::PRAGMA, "no-cache");
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(format!("network error: {}", e)))?;

        let status = response.status();

        let content_length = response.content_length();
        if let Some(len) = content_length
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Http(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(url = %url, status = status.as_u16(), bytes = bytes.len(), fetch_ms, "fetched");

        Ok(FetchResponse { url: url.clone(), final_url, status, content_type, bytes, headers, fetch_ms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(url: &str, final_url: &str, status: u16) -> FetchResponse {
        FetchResponse {
            url: Url::parse(url).unwrap(),
            final_url: Url::parse(final_url).unwrap(),
            status: StatusCode::from_u16(status).unwrap(),
            content_type: Some("text/html".to_string()),
            bytes: Bytes::from_static(b"<html></html>"),
            headers: header::HeaderMap::new(),
            fetch_ms: 1,
        }
    }

    #[test]
    fn test_default_config() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "shellcache/0.1");
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(20000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_config_from_app() {
        let app = AppConfig { user_agent: "tracker/1.0".into(), timeout_ms: 5_000, ..Default::default() };
        let config = FetchConfig::from_app(&app);
        assert_eq!(config.user_agent, "tracker/1.0");
        assert_eq!(config.timeout, Duration::from_millis(5_000));
    }

    #[test]
    fn test_classify_basic() {
        let origin = Url::parse("https://example.com").unwrap();
        let response = make_response("https://example.com/app.js", "https://example.com/app.js", 200);
        assert_eq!(response.classify(&origin), ResponseKind::Basic);
    }

    #[test]
    fn test_classify_cross_origin() {
        let origin = Url::parse("https://example.com").unwrap();
        let response = make_response("https://cdn.tailwindcss.com/3.4.1", "https://cdn.tailwindcss.com/3.4.1", 200);
        assert_eq!(response.classify(&origin), ResponseKind::CrossOrigin);
    }

    #[test]
    fn test_classify_redirected_off_origin() {
        let origin = Url::parse("https://example.com").unwrap();
        let response = make_response("https://example.com/app.js", "https://cdn.example.net/app.js", 200);
        assert_eq!(response.classify(&origin), ResponseKind::CrossOrigin);
    }

    #[test]
    fn test_redirected() {
        let same = make_response("https://example.com/", "https://example.com/", 200);
        assert!(!same.redirected());

        let moved = make_response("https://example.com/old", "https://example.com/new", 200);
        assert!(moved.redirected());
    }

    #[test]
    fn test_body_clone_is_independent_handle() {
        let response = make_response("https://example.com/", "https://example.com/", 200);
        let for_caller = response.bytes.clone();
        let for_cache = response.bytes.clone();
        assert_eq!(for_caller, for_cache);
    }

    #[test]
    fn test_client_builds() {
        let client = FetchClient::new(FetchConfig::default());
        assert!(client.is_ok());
    }
}
