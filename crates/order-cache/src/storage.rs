//! # Cache Storage
//!
//! Named generations of stored responses, keyed by absolute URL.
//!
//! Lookups search every generation, oldest first; writes always name their
//! generation. Two backends:
//!
//! - [`MemoryCacheStorage`] - process lifetime only (tests, `summary`)
//! - [`SqliteCacheStorage`] - `cached_assets` via `order-store`

use std::collections::HashMap;

use async_trait::async_trait;
use order_store::{AssetRepository, Database};
use tokio::sync::RwLock;

use crate::error::CacheResult;
use crate::request::AssetResponse;

#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Creates the generation if missing.
    async fn open(&self, generation: &str) -> CacheResult<()>;

    /// Stores or replaces one response.
    async fn put(&self, generation: &str, url: &str, response: &AssetResponse) -> CacheResult<()>;

    /// Stores every entry, or none of them.
    async fn put_all(&self, generation: &str, entries: &[(String, AssetResponse)])
        -> CacheResult<()>;

    /// First stored response for `url`, oldest generation first.
    async fn lookup(&self, url: &str) -> CacheResult<Option<AssetResponse>>;

    /// Generation names, oldest first.
    async fn generations(&self) -> CacheResult<Vec<String>>;

    /// Removes a generation and everything in it. Returns false if absent.
    async fn delete(&self, generation: &str) -> CacheResult<bool>;

    /// URLs stored in a generation, sorted.
    async fn urls(&self, generation: &str) -> CacheResult<Vec<String>>;
}

// =============================================================================
// Memory
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    generations: RwLock<Vec<(String, HashMap<String, AssetResponse>)>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn generation_mut<'a>(
    generations: &'a mut Vec<(String, HashMap<String, AssetResponse>)>,
    name: &str,
) -> &'a mut HashMap<String, AssetResponse> {
    let index = match generations.iter().position(|(n, _)| n == name) {
        Some(index) => index,
        None => {
            generations.push((name.to_string(), HashMap::new()));
            generations.len() - 1
        }
    };
    &mut generations[index].1
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, generation: &str) -> CacheResult<()> {
        let mut generations = self.generations.write().await;
        generation_mut(&mut generations, generation);
        Ok(())
    }

    async fn put(&self, generation: &str, url: &str, response: &AssetResponse) -> CacheResult<()> {
        let mut generations = self.generations.write().await;
        generation_mut(&mut generations, generation).insert(url.to_string(), response.clone());
        Ok(())
    }

    async fn put_all(
        &self,
        generation: &str,
        entries: &[(String, AssetResponse)],
    ) -> CacheResult<()> {
        // One write lock: readers see all entries or none.
        let mut generations = self.generations.write().await;
        let assets = generation_mut(&mut generations, generation);
        for (url, response) in entries {
            assets.insert(url.clone(), response.clone());
        }
        Ok(())
    }

    async fn lookup(&self, url: &str) -> CacheResult<Option<AssetResponse>> {
        let generations = self.generations.read().await;
        let found = generations
            .iter()
            .find_map(|(_, assets)| assets.get(url))
            .map(|stored| stored.clone().cached());
        Ok(found)
    }

    async fn generations(&self) -> CacheResult<Vec<String>> {
        let generations = self.generations.read().await;
        Ok(generations.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn delete(&self, generation: &str) -> CacheResult<bool> {
        let mut generations = self.generations.write().await;
        let before = generations.len();
        generations.retain(|(name, _)| name != generation);
        Ok(generations.len() != before)
    }

    async fn urls(&self, generation: &str) -> CacheResult<Vec<String>> {
        let generations = self.generations.read().await;
        let mut urls: Vec<String> = generations
            .iter()
            .find(|(name, _)| name == generation)
            .map(|(_, assets)| assets.keys().cloned().collect())
            .unwrap_or_default();
        urls.sort();
        Ok(urls)
    }
}

// =============================================================================
// SQLite
// =============================================================================

#[derive(Debug, Clone)]
pub struct SqliteCacheStorage {
    assets: AssetRepository,
}

impl SqliteCacheStorage {
    pub fn new(db: &Database) -> Self {
        SqliteCacheStorage {
            assets: db.assets(),
        }
    }
}

#[async_trait]
impl CacheStorage for SqliteCacheStorage {
    async fn open(&self, generation: &str) -> CacheResult<()> {
        Ok(self.assets.ensure_generation(generation).await?)
    }

    async fn put(&self, generation: &str, url: &str, response: &AssetResponse) -> CacheResult<()> {
        Ok(self.assets.put(&response.to_record(generation, url)).await?)
    }

    async fn put_all(
        &self,
        generation: &str,
        entries: &[(String, AssetResponse)],
    ) -> CacheResult<()> {
        let records: Vec<_> = entries
            .iter()
            .map(|(url, response)| response.to_record(generation, url))
            .collect();
        Ok(self.assets.put_all(&records).await?)
    }

    async fn lookup(&self, url: &str) -> CacheResult<Option<AssetResponse>> {
        let record = self.assets.find(url).await?;
        Ok(record.map(AssetResponse::from_record))
    }

    async fn generations(&self) -> CacheResult<Vec<String>> {
        Ok(self.assets.generations().await?)
    }

    async fn delete(&self, generation: &str) -> CacheResult<bool> {
        Ok(self.assets.delete_generation(generation).await?)
    }

    async fn urls(&self, generation: &str) -> CacheResult<Vec<String>> {
        Ok(self.assets.urls(generation).await?)
    }
}
