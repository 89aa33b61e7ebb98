//! Scripted network for cache tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use crate::error::{CacheError, CacheResult};
use crate::fetch::Fetcher;
use crate::request::{AssetResponse, ResponseKind};

pub const ORIGIN: &str = "http://localhost:8080/";

/// Answers from a fixed table; unknown URLs and offline mode fail.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: Mutex<HashMap<String, AssetResponse>>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Responds to `url` (absolute, or a path on [`ORIGIN`]).
    pub fn respond(self, url: &str, response: AssetResponse) -> Self {
        let key = absolute(url);
        self.responses
            .lock()
            .unwrap()
            .insert(key, response);
        self
    }

    /// 200 text/html page on the origin.
    pub fn page(self, path: &str, body: &str) -> Self {
        let response = AssetResponse::new(200, ResponseKind::Basic)
            .with_header("content-type", "text/html")
            .with_body(body.as_bytes().to_vec());
        self.respond(path, response)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Every URL fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn absolute(url: &str) -> String {
    Url::parse(ORIGIN).unwrap().join(url).unwrap().to_string()
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url) -> CacheResult<AssetResponse> {
        self.calls.lock().unwrap().push(url.to_string());

        if self.offline.load(Ordering::SeqCst) {
            return Err(CacheError::FetchFailed(format!("{url}: offline")));
        }

        self.responses
            .lock()
            .unwrap()
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| CacheError::FetchFailed(format!("{url}: connection refused")))
    }
}
