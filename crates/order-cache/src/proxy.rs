//! # Cache Proxy Server
//!
//! Serves the asset cache over HTTP in front of the configured origin.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  browser ──GET /style.css──► ProxyServer (axum)                         │
//! │                                   │                                     │
//! │                   /health ◄───────┤                                     │
//! │                                   ▼ fallback                            │
//! │                         AssetCache::handle(request)                     │
//! │                          │                    │                         │
//! │                   CacheStorage            Fetcher ──► origin            │
//! │                                                                         │
//! │  Navigation is detected from `Sec-Fetch-Mode: navigate`, or an          │
//! │  `Accept` header that prefers HTML.                                     │
//! │  Every response carries `x-order-cache: network|cache|fallback`.       │
//! │  Paths that resolve off the origin (`//host/x`) get 400.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ProxySettings;
use crate::error::{CacheError, CacheResult};
use crate::request::{AssetRequest, AssetResponse, RequestMode};
use crate::worker::AssetCache;

/// Header naming where a response came from.
pub const SOURCE_HEADER: &str = "x-order-cache";

/// Headers that describe the upstream connection, not the payload.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "content-length",
    "keep-alive",
    "transfer-encoding",
    "upgrade",
];

// =============================================================================
// Server
// =============================================================================

pub struct ProxyServer {
    cache: Arc<AssetCache>,
    settings: ProxySettings,
}

/// Handle for a running proxy.
#[derive(Debug)]
pub struct ProxyHandle {
    local_addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl ProxyHandle {
    /// The bound address (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and waits for in-flight requests.
    pub async fn shutdown(self) -> CacheResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| CacheError::ProxyStopped)?;
        self.task.await.map_err(|_| CacheError::ProxyStopped)
    }
}

impl ProxyServer {
    pub fn new(cache: Arc<AssetCache>, settings: ProxySettings) -> Self {
        ProxyServer { cache, settings }
    }

    /// Binds the listener and starts serving in the background.
    pub async fn start(self) -> CacheResult<ProxyHandle> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let app = Router::new()
            .route("/health", get(health_handler))
            .fallback(proxy_handler)
            .with_state(self.cache.clone());

        let bind_addr = self.settings.bind_address();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| CacheError::Bind {
                addr: bind_addr.clone(),
                reason: e.to_string(),
            })?;
        let local_addr = listener.local_addr()?;

        info!(
            addr = %local_addr,
            origin = %self.cache.origin(),
            controlling = self.cache.is_controlling(),
            "Cache proxy started"
        );

        let task = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_rx.recv().await;
                    info!("Cache proxy shutting down");
                })
                .await;
            if let Err(err) = served {
                warn!(error = %err, "Cache proxy stopped with error");
            }
        });

        Ok(ProxyHandle {
            local_addr,
            shutdown_tx,
            task,
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn health_handler() -> impl IntoResponse {
    "OK"
}

async fn proxy_handler(
    State(cache): State<Arc<AssetCache>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return (StatusCode::METHOD_NOT_ALLOWED, "Only GET is proxied").into_response();
    }

    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    // `//host/x` would otherwise resolve to another host.
    let url = match cache.resolve(path) {
        Ok(url) if cache.is_same_origin(&url) => url,
        _ => {
            warn!(path, "Rejected request outside the proxied origin");
            return (StatusCode::BAD_REQUEST, "Request leaves the proxied origin")
                .into_response();
        }
    };
    let request = AssetRequest::new(url.as_str(), request_mode(&headers));
    debug!(url = %url, mode = ?request.mode(), "Proxy request");

    let response = cache.handle(&request).await;
    into_http(response, method == Method::HEAD)
}

/// Navigation when the browser says so, or when HTML is the first choice.
fn request_mode(headers: &HeaderMap) -> RequestMode {
    let fetch_mode = headers
        .get("sec-fetch-mode")
        .and_then(|v| v.to_str().ok());
    if fetch_mode == Some("navigate") {
        return RequestMode::Navigate;
    }

    let prefers_html = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .and_then(|accept| accept.split(',').next())
        .map(|first| first.trim().starts_with("text/html"))
        .unwrap_or(false);

    if prefers_html {
        RequestMode::Navigate
    } else {
        RequestMode::Other
    }
}

fn into_http(response: AssetResponse, head_only: bool) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);

    let mut builder = axum::http::Response::builder().status(status);
    for (name, value) in &response.headers {
        if HOP_BY_HOP.contains(&name.to_ascii_lowercase().as_str()) {
            continue;
        }
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder = builder.header(SOURCE_HEADER, response.source.as_str());

    let body = if head_only {
        Body::empty()
    } else {
        Body::from(response.body)
    };

    builder.body(body).unwrap_or_else(|err| {
        warn!(error = %err, "Invalid upstream headers");
        (StatusCode::BAD_GATEWAY, "Invalid upstream response").into_response()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::storage::MemoryCacheStorage;
    use crate::testing::{ScriptedFetcher, ORIGIN};
    use axum::http::HeaderValue;

    async fn start(fetcher: Arc<ScriptedFetcher>, activate: bool) -> ProxyHandle {
        let config = CacheConfig {
            origin: ORIGIN.to_string(),
            manifest: vec!["/style.css".to_string()],
            ..CacheConfig::default()
        };
        let cache = AssetCache::new(config, fetcher, Arc::new(MemoryCacheStorage::new())).unwrap();
        cache.install().await.unwrap();
        if activate {
            cache.activate().await.unwrap();
        }

        let settings = ProxySettings {
            bind_addr: "127.0.0.1".to_string(),
            port: 0,
        };
        ProxyServer::new(Arc::new(cache), settings)
            .start()
            .await
            .unwrap()
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    fn site() -> Arc<ScriptedFetcher> {
        Arc::new(
            ScriptedFetcher::new()
                .page("/style.css", "body {}")
                .page("/offline.html", "offline"),
        )
    }

    #[test]
    fn test_request_mode_detection() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_mode(&headers), RequestMode::Other);

        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9"),
        );
        assert_eq!(request_mode(&headers), RequestMode::Navigate);

        headers.insert(header::ACCEPT, HeaderValue::from_static("image/avif,*/*"));
        assert_eq!(request_mode(&headers), RequestMode::Other);

        headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
        assert_eq!(request_mode(&headers), RequestMode::Navigate);
    }

    #[tokio::test]
    async fn test_serves_cached_asset() {
        let fetcher = site();
        let handle = start(fetcher.clone(), true).await;
        fetcher.set_offline(true);

        let url = format!("http://{}/style.css", handle.local_addr());
        let response = client().get(url).send().await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers().get(SOURCE_HEADER).unwrap(),
            "cache"
        );
        assert_eq!(response.text().await.unwrap(), "body {}");

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_offline_navigation_and_asset_miss() {
        let fetcher = site();
        let handle = start(fetcher.clone(), true).await;
        fetcher.set_offline(true);
        let base = format!("http://{}", handle.local_addr());

        let page = client()
            .get(format!("{base}/orders"))
            .header("sec-fetch-mode", "navigate")
            .send()
            .await
            .unwrap();
        assert_eq!(page.status(), 200);
        assert_eq!(page.text().await.unwrap(), "offline");

        let missing = client().get(format!("{base}/app.js")).send().await.unwrap();
        assert_eq!(missing.status(), 408);
        assert_eq!(missing.text().await.unwrap(), "Network error");

        let health = client().get(format!("{base}/health")).send().await.unwrap();
        assert_eq!(health.text().await.unwrap(), "OK");

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_scheme_relative_path() {
        let fetcher = Arc::new(ScriptedFetcher::new().page("/offline.html", "offline"));
        let config = CacheConfig {
            origin: ORIGIN.to_string(),
            manifest: Vec::new(),
            ..CacheConfig::default()
        };
        let cache = AssetCache::new(config, fetcher.clone(), Arc::new(MemoryCacheStorage::new()))
            .unwrap();
        cache.activate().await.unwrap();

        let uri: Uri = "//other.host/steal?x=1".parse().unwrap();
        let response =
            proxy_handler(State(Arc::new(cache)), Method::GET, uri, HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_scheme_relative_request_over_http() {
        let fetcher = site();
        let handle = start(fetcher.clone(), true).await;
        let before = fetcher.calls().len();

        let url = format!("http://{}//other.host/x", handle.local_addr());
        let response = client().get(url).send().await.unwrap();
        assert_eq!(response.status(), 400);
        assert_eq!(fetcher.calls().len(), before);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_passthrough_before_activation() {
        let fetcher = site();
        let handle = start(fetcher.clone(), false).await;
        fetcher.set_offline(true);

        let url = format!("http://{}/style.css", handle.local_addr());
        let response = client().get(url).send().await.unwrap();
        assert_eq!(response.status(), 408);

        handle.shutdown().await.unwrap();
    }
}
