//! # Cache Configuration
//!
//! The `[cache]` section of the app's `config.toml`.
//!
//! ## Configuration File Format
//! ```toml
//! [cache]
//! generation = "order-app-cache-v2"   # bump to invalidate older generations
//! origin = "http://127.0.0.1:8080"    # where relative manifest URLs resolve
//! offline_page = "/offline.html"
//! fetch_timeout_secs = 10
//! manifest = ["/", "/index.html", "/style.css"]
//!
//! [cache.proxy]
//! bind_addr = "127.0.0.1"
//! port = 8787
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CacheError, CacheResult};

/// Default generation name.
pub const DEFAULT_GENERATION: &str = "order-app-cache-v1";

/// Default proxy port.
pub const DEFAULT_PROXY_PORT: u16 = 8787;

// =============================================================================
// Proxy Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySettings {
    /// Address to bind the proxy listener to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Port for the proxy listener. 0 picks a free port.
    #[serde(default = "default_proxy_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_proxy_port() -> u16 {
    DEFAULT_PROXY_PORT
}

impl Default for ProxySettings {
    fn default() -> Self {
        ProxySettings {
            bind_addr: default_bind_addr(),
            port: default_proxy_port(),
        }
    }
}

impl ProxySettings {
    /// Returns the bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

// =============================================================================
// Cache Configuration
// =============================================================================

/// Offline cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Name of the current cache generation.
    #[serde(default = "default_generation")]
    pub generation: String,

    /// Origin the proxy fronts. Relative URLs resolve against it.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Page served when a navigation cannot reach the network.
    #[serde(default = "default_offline_page")]
    pub offline_page: String,

    /// URLs stored atomically on install, in order.
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// Per-request timeout for origin fetches.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    #[serde(default)]
    pub proxy: ProxySettings,
}

fn default_generation() -> String {
    DEFAULT_GENERATION.to_string()
}

fn default_origin() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_offline_page() -> String {
    "/offline.html".to_string()
}

fn default_manifest() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/script.js",
        "/style.css",
        "/manifest.json",
        "/offline.html",
        "/privacy-policy.html",
        "/cookie-policy.html",
        "https://via.placeholder.com/300x200?text=Glass+Mug",
        "https://via.placeholder.com/300x200?text=Lamp",
        "https://via.placeholder.com/300x200?text=Mouse+Pad",
        "https://via.placeholder.com/300x200?text=LED+Strip",
    ]
    .iter()
    .map(|url| url.to_string())
    .collect()
}

fn default_fetch_timeout() -> u64 {
    10
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            generation: default_generation(),
            origin: default_origin(),
            offline_page: default_offline_page(),
            manifest: default_manifest(),
            fetch_timeout_secs: default_fetch_timeout(),
            proxy: ProxySettings::default(),
        }
    }
}

impl CacheConfig {
    /// Parses the origin URL.
    pub fn origin_url(&self) -> CacheResult<Url> {
        let url = Url::parse(&self.origin)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CacheError::InvalidUrl(format!(
                "Origin must be http:// or https://, got: {}",
                self.origin
            )));
        }
        Ok(url)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Validates the configuration.
    ///
    /// ## Rules
    /// - Generation name is non-empty
    /// - Origin is an absolute http(s) URL
    /// - Offline page and every manifest entry resolve against the origin
    /// - Fetch timeout is greater than 0
    pub fn validate(&self) -> CacheResult<()> {
        if self.generation.trim().is_empty() {
            return Err(CacheError::InvalidConfig(
                "generation must not be empty".into(),
            ));
        }

        let origin = self.origin_url()?;

        if self.offline_page.trim().is_empty() {
            return Err(CacheError::InvalidConfig(
                "offline_page must not be empty".into(),
            ));
        }
        origin.join(&self.offline_page)?;

        for entry in &self.manifest {
            origin
                .join(entry)
                .map_err(|e| CacheError::InvalidUrl(format!("{entry}: {e}")))?;
        }

        if self.fetch_timeout_secs == 0 {
            return Err(CacheError::InvalidConfig(
                "fetch_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}
