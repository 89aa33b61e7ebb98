//! # Asset Cache
//!
//! Install / activate / fetch lifecycle for the offline cache.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  install()                                                              │
//! │   ├── fetch offline page ──► put (failure logged, not fatal)            │
//! │   └── fetch every manifest URL ──► put_all (all or nothing)             │
//! │            └── first failure aborts with the failing URL                │
//! │                                                                         │
//! │  activate()                                                             │
//! │   ├── delete every generation != current                                │
//! │   └── start controlling: handle() consults the cache from now on        │
//! │                                                                         │
//! │  handle(request)        never fails, always yields a response           │
//! │   ├── not controlling ──► network, else 408                             │
//! │   ├── navigation      ──► network ─► offline page ─► 503                │
//! │   └── other           ──► cache ─► network (store 200 basic/cors) ─► 408│
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};
use crate::fetch::Fetcher;
use crate::request::{AssetRequest, AssetResponse, ResponseSource};
use crate::storage::CacheStorage;

/// Outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub generation: String,
    /// Manifest entries stored.
    pub stored: usize,
    pub offline_page_cached: bool,
}

pub struct AssetCache {
    config: CacheConfig,
    origin: Url,
    fetcher: Arc<dyn Fetcher>,
    storage: Arc<dyn CacheStorage>,
    controlling: AtomicBool,
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("generation", &self.config.generation)
            .field("origin", &self.origin.as_str())
            .field("controlling", &self.is_controlling())
            .finish()
    }
}

impl AssetCache {
    /// Creates a cache. The configuration is validated first.
    pub fn new(
        config: CacheConfig,
        fetcher: Arc<dyn Fetcher>,
        storage: Arc<dyn CacheStorage>,
    ) -> CacheResult<Self> {
        config.validate()?;
        let origin = config.origin_url()?;

        Ok(AssetCache {
            config,
            origin,
            fetcher,
            storage,
            controlling: AtomicBool::new(false),
        })
    }

    pub fn generation(&self) -> &str {
        &self.config.generation
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    /// True once `activate` has completed.
    pub fn is_controlling(&self) -> bool {
        self.controlling.load(Ordering::SeqCst)
    }

    /// Resolves a URL against the origin. Absolute URLs pass through.
    pub fn resolve(&self, url: &str) -> CacheResult<Url> {
        self.origin
            .join(url)
            .map_err(|e| CacheError::InvalidUrl(format!("{url}: {e}")))
    }

    /// True when `url` has the origin's scheme, host and port.
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }

    // =========================================================================
    // Install
    // =========================================================================

    /// Populates the current generation.
    ///
    /// The offline page is stored on its own first; its failure is logged
    /// and does not abort install. The manifest is then stored atomically:
    /// any fetch failure or non-2xx status stores none of it and reports
    /// the failing URL.
    pub async fn install(&self) -> CacheResult<InstallReport> {
        let generation = self.generation();
        info!(generation = %generation, "Installing offline cache");

        self.storage.open(generation).await?;

        let offline_page_cached = match self.cache_offline_page().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "Failed to cache offline page");
                false
            }
        };

        let mut entries = Vec::with_capacity(self.config.manifest.len());
        for entry in &self.config.manifest {
            let url = self.resolve(entry)?;
            let response = self.fetcher.fetch(&url).await.map_err(|e| {
                CacheError::InstallFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            })?;

            if !response.is_ok() {
                return Err(CacheError::InstallFailed {
                    url: url.to_string(),
                    reason: format!("HTTP {}", response.status),
                });
            }
            entries.push((url.to_string(), response));
        }

        self.storage.put_all(generation, &entries).await?;
        info!(generation = %generation, stored = entries.len(), "Offline cache installed");

        Ok(InstallReport {
            generation: generation.to_string(),
            stored: entries.len(),
            offline_page_cached,
        })
    }

    async fn cache_offline_page(&self) -> CacheResult<()> {
        let url = self.resolve(&self.config.offline_page)?;
        let response = self.fetcher.fetch(&url).await?;
        if !response.is_ok() {
            return Err(CacheError::FetchFailed(format!(
                "{url}: HTTP {}",
                response.status
            )));
        }
        self.storage
            .put(self.generation(), url.as_str(), &response)
            .await
    }

    // =========================================================================
    // Activate
    // =========================================================================

    /// Deletes every generation other than the current one, then starts
    /// controlling requests. Returns the deleted generation names.
    pub async fn activate(&self) -> CacheResult<Vec<String>> {
        let mut deleted = Vec::new();

        for name in self.storage.generations().await? {
            if name == self.generation() {
                continue;
            }
            info!(generation = %name, "Deleting old cache");
            if self.storage.delete(&name).await? {
                deleted.push(name);
            }
        }

        self.controlling.store(true, Ordering::SeqCst);
        info!(generation = %self.generation(), "Offline cache active");
        Ok(deleted)
    }

    /// Restores control in a new process. A completed `activate` leaves the
    /// current generation as the only one; anything else stays passthrough.
    pub async fn resume(&self) -> CacheResult<bool> {
        let generations = self.storage.generations().await?;
        let active = matches!(generations.as_slice(), [only] if only == self.generation());
        if active {
            self.controlling.store(true, Ordering::SeqCst);
        }
        debug!(active, "Resumed offline cache");
        Ok(active)
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    /// Answers one request. Never fails: failures become fallback responses.
    pub async fn handle(&self, request: &AssetRequest) -> AssetResponse {
        let url = match self.resolve(request.url()) {
            Ok(url) => url,
            Err(err) => {
                warn!(error = %err, "Unresolvable request URL");
                return AssetResponse::network_error();
            }
        };

        if !self.is_controlling() {
            return self.network_or_error(&url).await;
        }

        if request.is_navigation() {
            self.handle_navigation(&url).await
        } else {
            self.handle_asset(&url).await
        }
    }

    async fn network_or_error(&self, url: &Url) -> AssetResponse {
        match self.fetcher.fetch(url).await {
            Ok(response) => response,
            Err(err) => {
                debug!(url = %url, error = %err, "Network fetch failed");
                AssetResponse::network_error()
            }
        }
    }

    /// Network first, then the cached offline page.
    async fn handle_navigation(&self, url: &Url) -> AssetResponse {
        let err = match self.fetcher.fetch(url).await {
            Ok(response) => return response,
            Err(err) => err,
        };
        debug!(url = %url, error = %err, "Navigation failed, serving offline page");

        let offline = match self.resolve(&self.config.offline_page) {
            Ok(offline) => offline,
            Err(_) => return AssetResponse::offline_unavailable(),
        };

        match self.storage.lookup(offline.as_str()).await {
            Ok(Some(page)) => page.with_source(ResponseSource::Fallback),
            Ok(None) => AssetResponse::offline_unavailable(),
            Err(err) => {
                warn!(error = %err, "Offline page lookup failed");
                AssetResponse::offline_unavailable()
            }
        }
    }

    /// Cache first, then network; cacheable network responses are stored.
    async fn handle_asset(&self, url: &Url) -> AssetResponse {
        match self.storage.lookup(url.as_str()).await {
            Ok(Some(cached)) => {
                debug!(url = %url, "Cache hit");
                return cached;
            }
            Ok(None) => {}
            Err(err) => warn!(url = %url, error = %err, "Cache lookup failed"),
        }

        let response = match self.fetcher.fetch(url).await {
            Ok(response) => response,
            Err(err) => {
                debug!(url = %url, error = %err, "Asset unavailable");
                return AssetResponse::network_error();
            }
        };

        if response.is_cacheable() {
            if let Err(err) = self
                .storage
                .put(self.generation(), url.as_str(), &response)
                .await
            {
                warn!(url = %url, error = %err, "Failed to cache response");
            }
        }

        response
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
