//! Requests and responses flowing through the asset cache.

use order_store::AssetRecord;

// =============================================================================
// Request
// =============================================================================

/// How the request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// A top-level page load.
    Navigate,
    /// Anything else: scripts, styles, images, data.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    url: String,
    mode: RequestMode,
}

impl AssetRequest {
    pub fn new(url: impl Into<String>, mode: RequestMode) -> Self {
        AssetRequest {
            url: url.into(),
            mode,
        }
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        Self::new(url, RequestMode::Navigate)
    }

    pub fn asset(url: impl Into<String>) -> Self {
        Self::new(url, RequestMode::Other)
    }

    /// The URL as given: absolute, or relative to the cache origin.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}

// =============================================================================
// Response
// =============================================================================

/// Response type as seen by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Same origin as the cache origin.
    Basic,
    /// Cross origin, allowed by `Access-Control-Allow-Origin`.
    Cors,
    /// Cross origin without CORS headers.
    Opaque,
    /// Generated locally.
    Synthetic,
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
    /// Offline page or synthetic error.
    Fallback,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache => "cache",
            ResponseSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: u16,
    pub kind: ResponseKind,
    /// Header pairs in arrival order, names lowercased.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub source: ResponseSource,
}

impl AssetResponse {
    /// A network response.
    pub fn new(status: u16, kind: ResponseKind) -> Self {
        AssetResponse {
            status,
            kind,
            headers: Vec::new(),
            body: Vec::new(),
            source: ResponseSource::Network,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_source(mut self, source: ResponseSource) -> Self {
        self.source = source;
        self
    }

    /// Synthetic `408 Network error`, returned when an asset is neither
    /// cached nor reachable.
    pub fn network_error() -> Self {
        Self::synthetic(408, "Network error")
    }

    /// Synthetic `503`, returned when a navigation fails and no offline page
    /// is cached.
    pub fn offline_unavailable() -> Self {
        Self::synthetic(503, "Offline page unavailable")
    }

    fn synthetic(status: u16, text: &str) -> Self {
        AssetResponse::new(status, ResponseKind::Synthetic)
            .with_header("content-type", "text/plain")
            .with_body(text.as_bytes().to_vec())
            .with_source(ResponseSource::Fallback)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// 2xx status.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Only `200` responses of kind basic or cors are written to the cache.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && matches!(self.kind, ResponseKind::Basic | ResponseKind::Cors)
    }

    pub fn to_record(&self, generation: &str, url: &str) -> AssetRecord {
        let record = AssetRecord::new(generation, url, self.status)
            .with_headers(self.headers.clone())
            .with_body(self.body.clone());
        match self.content_type() {
            Some(content_type) => record.with_content_type(content_type),
            None => record,
        }
    }

    /// The same response as served from the cache. Cached responses report
    /// `Basic`.
    pub fn cached(self) -> Self {
        AssetResponse {
            kind: ResponseKind::Basic,
            source: ResponseSource::Cache,
            ..self
        }
    }

    pub fn from_record(record: AssetRecord) -> Self {
        AssetResponse::new(record.status, ResponseKind::Basic)
            .with_body(record.body)
            .with_headers(record.headers)
            .cached()
    }
}
