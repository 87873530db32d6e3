//! The network seam and fetch-handler types.
//!
//! The agent talks to the network through the [`Network`] trait rather than
//! holding a concrete client, so handlers can be exercised in isolation
//! with a stub that records calls.

use async_trait::async_trait;
use shellcache_client::{FetchClient, FetchResponse, Method, Url};
use shellcache_core::{Error, StoredResponse};

/// An intercepted outgoing request: method plus absolute URL.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
}

impl FetchRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }
}

/// What the fetch handler decided to do with an intercepted request.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Non-GET request; the agent never touches it.
    PassThrough,
    /// Answered from the cache; the network was not consulted.
    Hit(StoredResponse),
    /// Fetched live from the network (and persisted when eligible).
    Network(FetchResponse),
    /// Network failed and nothing was cached; no response produced.
    Unavailable,
}

impl FetchOutcome {
    /// Whether the caller received a usable response.
    pub fn has_response(&self) -> bool {
        matches!(self, FetchOutcome::Hit(_) | FetchOutcome::Network(_))
    }
}

/// Async network access as the agent sees it.
#[async_trait]
pub trait Network: Send + Sync {
    /// Plain GET.
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error>;

    /// GET that bypasses intermediate HTTP caches (install path).
    async fn fetch_reloading(&self, url: &Url) -> Result<FetchResponse, Error>;
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        FetchClient::fetch(self, url).await
    }

    async fn fetch_reloading(&self, url: &Url) -> Result<FetchResponse, Error> {
        FetchClient::fetch_reloading(self, url).await
    }
}
