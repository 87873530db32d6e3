//! The OfflineCacheAgent: install, activate, and fetch handlers.
//!
//! All three handlers run against an explicitly injected [`CacheStore`]
//! handle and [`Network`] implementation. Each handler awaits the full set
//! of its async operations before returning, so a caller holding the
//! returned future holds the pending-work token for that lifecycle event.
//!
//! Error policy (see DESIGN.md): opening the namespace failing fails the
//! install; an individual asset failing during install, or an individual
//! namespace deletion failing during activate, is logged and isolated from
//! its siblings; a network failure during fetch handling is logged and
//! reduced to [`FetchOutcome::Unavailable`].

use crate::lifecycle::{Lifecycle, LifecycleEvent, LifecycleState};
use crate::manifest::AssetManifest;
use crate::network::{FetchOutcome, FetchRequest, Network};
use futures_util::future::join_all;
use shellcache_client::{FetchResponse, Method, ResponseKind, StatusCode, Url, resolve};
use shellcache_core::{AppConfig, CacheStore, Error, StoredResponse};

/// Offline cache agent bound to one versioned namespace.
pub struct OfflineCacheAgent<N: Network> {
    store: CacheStore,
    network: N,
    manifest: AssetManifest,
    namespace: String,
    origin: Url,
    fallback_path: Option<String>,
    lifecycle: Lifecycle,
    skip_waiting: bool,
}

impl<N: Network> OfflineCacheAgent<N> {
    /// Build an agent from the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if the configured origin does not parse.
    pub fn new(store: CacheStore, network: N, config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        Ok(Self {
            store,
            network,
            manifest: AssetManifest::new(config.shell_assets.clone()),
            namespace: config.namespace(),
            origin,
            fallback_path: config.fallback_path.clone(),
            lifecycle: Lifecycle::new(),
            skip_waiting: false,
        })
    }

    /// The namespace this agent considers current.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Whether this instance has claimed clients (activation completed).
    pub fn is_controlling(&self) -> bool {
        self.lifecycle.state() == LifecycleState::Active
    }

    /// Whether install requested immediate activation.
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting
    }

    /// Install handler: pre-cache the app shell.
    ///
    /// Opens (creating if absent) the current namespace, then fetches every
    /// manifest asset concurrently with HTTP caches bypassed, storing each
    /// result under its key. A failed asset is logged and skipped; the rest
    /// of the batch proceeds. Finishes by requesting immediate activation.
    ///
    /// # Errors
    ///
    /// Fails only if the lifecycle transition is illegal or the namespace
    /// itself cannot be opened.
    pub async fn handle_install(&mut self) -> Result<(), Error> {
        self.lifecycle.apply(LifecycleEvent::BeginInstall)?;
        tracing::info!(namespace = %self.namespace, assets = self.manifest.len(), "installing");

        self.store.open_namespace(&self.namespace).await?;

        let cached = self.precache_shell().await;

        // Skip the normal waiting period and activate this version immediately.
        self.skip_waiting = true;
        self.lifecycle.apply(LifecycleEvent::FinishInstall)?;
        tracing::info!(namespace = %self.namespace, cached, total = self.manifest.len(), "installation complete");

        Ok(())
    }

    async fn precache_shell(&self) -> usize {
        let fetches = self
            .manifest
            .iter()
            .map(|path| async move { (path, self.precache_asset(path).await) });

        let mut cached = 0;
        for (path, result) in join_all(fetches).await {
            match result {
                Ok(()) => cached += 1,
                Err(e) => tracing::warn!(path, error = %e, "failed to pre-cache asset"),
            }
        }
        cached
    }

    async fn precache_asset(&self, path: &str) -> Result<(), Error> {
        let url = resolve(&self.origin, path).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let response = self.network.fetch_reloading(&url).await?;

        if response.status != StatusCode::OK {
            return Err(Error::Http(format!("status {}", response.status.as_u16())));
        }

        let entry = snapshot(&Method::GET, &url, &response);
        self.store.put_entry(&self.namespace, &entry).await
    }

    /// Activate handler: purge stale namespaces and claim clients.
    ///
    /// Deletes every namespace other than the current one; each deletion is
    /// independent and a failure is logged without blocking the others.
    /// Completing the transition to `Active` is the claim: from here on the
    /// agent reports itself as the controlling instance.
    ///
    /// # Errors
    ///
    /// Fails if the lifecycle transition is illegal or the namespaces
    /// cannot be enumerated at all.
    pub async fn handle_activate(&mut self) -> Result<(), Error> {
        self.lifecycle.apply(LifecycleEvent::BeginActivate)?;
        tracing::info!(namespace = %self.namespace, "activating");

        let names = self.store.list_namespaces().await?;
        let store = &self.store;
        let current = self.namespace.as_str();

        let deletions = names
            .iter()
            .filter(|name| name.as_str() != current)
            .map(|name| async move { (name.as_str(), store.delete_namespace(name).await) });

        for (name, result) in join_all(deletions).await {
            match result {
                Ok(_) => tracing::info!(namespace = name, "deleted stale cache"),
                Err(e) => tracing::error!(namespace = name, error = %e, "failed to delete stale cache"),
            }
        }

        self.skip_waiting = false;
        self.lifecycle.apply(LifecycleEvent::FinishActivate)?;
        tracing::info!(namespace = %self.namespace, "activation complete, claiming clients");

        Ok(())
    }

    /// Fetch handler: cache-first with network fallback.
    ///
    /// Non-GET requests pass through untouched. For a GET, the namespace is
    /// consulted first; a hit is returned with no network activity. On a
    /// miss the request goes to the network, and a 200 same-origin
    /// non-redirected response is persisted from a duplicate of its body
    /// without blocking the caller. Network failure produces no response
    /// unless a fallback page is configured and cached.
    ///
    /// # Errors
    ///
    /// Only store lookup failures propagate; network failures are handled
    /// internally.
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Result<FetchOutcome, Error> {
        if request.method != Method::GET {
            return Ok(FetchOutcome::PassThrough);
        }

        if let Some(entry) = self
            .store
            .match_entry(&self.namespace, request.method.as_str(), request.url.as_str())
            .await?
        {
            tracing::debug!(url = %request.url, "cache hit");
            return Ok(FetchOutcome::Hit(entry));
        }

        match self.network.fetch(&request.url).await {
            Ok(response) => {
                if self.should_persist(&response) {
                    self.persist_in_background(&request.url, &response);
                }
                Ok(FetchOutcome::Network(response))
            }
            Err(e) => {
                tracing::error!(url = %request.url, error = %e, "network fetch failed");
                if let Some(entry) = self.cached_fallback().await {
                    return Ok(FetchOutcome::Hit(entry));
                }
                Ok(FetchOutcome::Unavailable)
            }
        }
    }

    /// Only successful, same-origin, non-redirected responses are stored.
    fn should_persist(&self, response: &FetchResponse) -> bool {
        response.status == StatusCode::OK
            && !response.redirected()
            && response.classify(&self.origin) == ResponseKind::Basic
    }

    /// Store a duplicate of the response without blocking the caller.
    ///
    /// The entry owns its own body copy; the live response handle stays
    /// with the caller untouched.
    fn persist_in_background(&self, url: &Url, response: &FetchResponse) {
        let store = self.store.clone();
        let namespace = self.namespace.clone();
        let entry = snapshot(&Method::GET, url, response);

        tokio::spawn(async move {
            tracing::debug!(url = %entry.url, "caching new resource");
            if let Err(e) = store.put_entry(&namespace, &entry).await {
                tracing::error!(url = %entry.url, error = %e, "failed to persist response");
            }
        });
    }

    async fn cached_fallback(&self) -> Option<StoredResponse> {
        let path = self.fallback_path.as_deref()?;
        let url = resolve(&self.origin, path).ok()?;
        match self.store.match_entry(&self.namespace, Method::GET.as_str(), url.as_str()).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::error!(path, error = %e, "fallback lookup failed");
                None
            }
        }
    }
}

/// Duplicate a live response into a stored snapshot under the request URL.
fn snapshot(method: &Method, url: &Url, response: &FetchResponse) -> StoredResponse {
    let headers = response
        .headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
        .collect();

    StoredResponse::new(
        method.as_str(),
        url.as_str(),
        response.status.as_u16(),
        response.content_type.clone(),
        headers,
        response.bytes.to_vec(),
    )
}
