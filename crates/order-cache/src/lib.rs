//! # order-cache: Offline Asset Cache
//!
//! Keeps the web front end usable without a network.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Offline Asset Cache                             │
//! │                                                                         │
//! │  ┌──────────────┐   handle()    ┌──────────────┐                        │
//! │  │ ProxyServer  │ ────────────► │  AssetCache  │                        │
//! │  │   (axum)     │               │  install     │                        │
//! │  └──────────────┘               │  activate    │                        │
//! │                                 └──┬────────┬──┘                        │
//! │                                    │        │                           │
//! │                      ┌─────────────▼──┐  ┌──▼──────────────────────┐    │
//! │                      │    Fetcher     │  │      CacheStorage       │    │
//! │                      │  HttpFetcher   │  │  MemoryCacheStorage     │    │
//! │                      │  (reqwest)     │  │  SqliteCacheStorage     │    │
//! │                      └────────────────┘  └─────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`] - `[cache]` configuration section
//! - [`request`] - Request and response types
//! - [`fetch`] - Network access and response classification
//! - [`storage`] - Generation-keyed response storage
//! - [`worker`] - The install / activate / fetch lifecycle
//! - [`proxy`] - HTTP front for the cache

pub mod config;
pub mod error;
pub mod fetch;
pub mod proxy;
pub mod request;
pub mod storage;
pub mod worker;

#[cfg(test)]
mod testing;

pub use config::{CacheConfig, ProxySettings};
pub use error::{CacheError, CacheResult};
pub use fetch::{Fetcher, HttpFetcher};
pub use proxy::{ProxyHandle, ProxyServer};
pub use request::{AssetRequest, AssetResponse, RequestMode, ResponseKind, ResponseSource};
pub use storage::{CacheStorage, MemoryCacheStorage, SqliteCacheStorage};
pub use worker::{AssetCache, InstallReport};
