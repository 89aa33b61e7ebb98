//! # Cache Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐  │
//! │  │  Configuration  │  │    Network      │  │       Storage           │  │
//! │  │                 │  │                 │  │                         │  │
//! │  │  InvalidConfig  │  │  FetchFailed    │  │  Storage                │  │
//! │  │  InvalidUrl     │  │  InstallFailed  │  │                         │  │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘  │
//! │                                                                         │
//! │  `AssetCache::handle` never returns these: request failures become      │
//! │  fallback responses. Only install, activate and startup surface them.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid cache configuration.
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),

    /// A manifest entry, origin or request URL that cannot be resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // =========================================================================
    // Network Errors
    // =========================================================================
    /// The origin could not be reached.
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// Install aborted; nothing from the manifest was stored.
    ///
    /// ## When This Occurs
    /// - A manifest URL could not be fetched
    /// - A manifest URL answered with a non-2xx status
    #[error("Install failed at {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    // =========================================================================
    // Storage / Server Errors
    // =========================================================================
    /// The cache storage backend failed.
    #[error("Cache storage error: {0}")]
    Storage(String),

    /// The proxy could not bind its listener.
    #[error("Failed to bind to {addr}: {reason}")]
    Bind { addr: String, reason: String },

    /// The proxy task is gone.
    #[error("Proxy server is not running")]
    ProxyStopped,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        match err.url() {
            Some(url) => CacheError::FetchFailed(format!("{url}: {err}")),
            None => CacheError::FetchFailed(err.to_string()),
        }
    }
}

impl From<url::ParseError> for CacheError {
    fn from(err: url::ParseError) -> Self {
        CacheError::InvalidUrl(err.to_string())
    }
}

impl From<order_store::DbError> for CacheError {
    fn from(err: order_store::DbError) -> Self {
        CacheError::Storage(err.to_string())
    }
}
