//! # Network Fetcher
//!
//! The cache reaches the network only through [`Fetcher`], so tests can run
//! it against a scripted network.
//!
//! ## Response Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  final URL origin == cache origin            ──► Basic                  │
//! │  cross origin + Access-Control-Allow-Origin  ──► Cors                   │
//! │  cross origin, no CORS header                ──► Opaque (never stored)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::config::CacheConfig;
use crate::error::CacheResult;
use crate::request::{AssetResponse, ResponseKind, ResponseSource};

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`. HTTP error statuses are responses, not errors; only a
    /// failure to get any response is an `Err`.
    async fn fetch(&self, url: &Url) -> CacheResult<AssetResponse>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    origin: Url,
}

impl HttpFetcher {
    pub fn new(origin: Url, timeout: Duration) -> CacheResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpFetcher { client, origin })
    }

    pub fn from_config(config: &CacheConfig) -> CacheResult<Self> {
        Self::new(config.origin_url()?, config.fetch_timeout())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> CacheResult<AssetResponse> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        let kind = classify(&self.origin, &final_url, &headers);
        debug!(url = %url, status, ?kind, bytes = body.len(), "Fetched from network");

        Ok(AssetResponse {
            status,
            kind,
            headers,
            body,
            source: ResponseSource::Network,
        })
    }
}

/// Classifies a network response relative to the cache origin.
pub fn classify(origin: &Url, url: &Url, headers: &[(String, String)]) -> ResponseKind {
    if origin.origin() == url.origin() {
        return ResponseKind::Basic;
    }

    let allowed = headers
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case("access-control-allow-origin"));
    if allowed {
        ResponseKind::Cors
    } else {
        ResponseKind::Opaque
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_same_origin_is_basic() {
        let origin = url("http://localhost:8080/");
        let kind = classify(&origin, &url("http://localhost:8080/style.css"), &[]);
        assert_eq!(kind, ResponseKind::Basic);
    }

    #[test]
    fn test_cross_origin_classification() {
        let origin = url("http://localhost:8080/");
        let image = url("https://via.placeholder.com/300x200?text=Lamp");

        assert_eq!(classify(&origin, &image, &[]), ResponseKind::Opaque);

        let headers = vec![("Access-Control-Allow-Origin".to_string(), "*".to_string())];
        assert_eq!(classify(&origin, &image, &headers), ResponseKind::Cors);

        // Different port is a different origin.
        let other_port = url("http://localhost:9090/style.css");
        assert_eq!(classify(&origin, &other_port, &[]), ResponseKind::Opaque);
    }
}
