//! # Asset Repository
//!
//! Persisted offline asset cache, grouped into named generations.
//!
//! ## Generation Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  install   ──► put_all("order-app-cache-v2", manifest responses)        │
//! │                 (one transaction: all rows or none)                     │
//! │                                                                         │
//! │  activate  ──► generations() = [v1, v2]                                 │
//! │                delete_generation("order-app-cache-v1")                  │
//! │                 (rows removed by ON DELETE CASCADE)                     │
//! │                                                                         │
//! │  fetch     ──► find(url) across generations, oldest first               │
//! │                put(...) for newly fetched 200 responses                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

// =============================================================================
// Records
// =============================================================================

/// A stored response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub generation: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    /// Response headers in arrival order.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: DateTime<Utc>,
}

impl AssetRecord {
    pub fn new(generation: impl Into<String>, url: impl Into<String>, status: u16) -> Self {
        AssetRecord {
            generation: generation.into(),
            url: url.into(),
            status,
            content_type: None,
            headers: Vec::new(),
            body: Vec::new(),
            stored_at: Utc::now(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
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
}

#[derive(FromRow)]
struct AssetRow {
    generation: String,
    url: String,
    status: i64,
    content_type: Option<String>,
    headers: String,
    body: Vec<u8>,
    stored_at: DateTime<Utc>,
}

impl TryFrom<AssetRow> for AssetRecord {
    type Error = DbError;

    fn try_from(row: AssetRow) -> DbResult<Self> {
        let status = u16::try_from(row.status)
            .map_err(|_| DbError::Internal(format!("invalid stored status {}", row.status)))?;

        Ok(AssetRecord {
            generation: row.generation,
            url: row.url,
            status,
            content_type: row.content_type,
            headers: serde_json::from_str(&row.headers)?,
            body: row.body,
            stored_at: row.stored_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for `cache_generations` and `cached_assets`.
#[derive(Debug, Clone)]
pub struct AssetRepository {
    pool: SqlitePool,
}

impl AssetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AssetRepository { pool }
    }

    /// Creates a generation if it does not exist yet.
    pub async fn ensure_generation(&self, name: &str) -> DbResult<()> {
        let mut tx = self.begin().await?;
        insert_generation(&mut tx, name).await?;
        commit(tx).await
    }

    /// Generation names, oldest first.
    pub async fn generations(&self) -> DbResult<Vec<String>> {
        let names: Vec<String> =
            sqlx::query_scalar("SELECT name FROM cache_generations ORDER BY created_at, rowid")
                .fetch_all(&self.pool)
                .await?;
        Ok(names)
    }

    /// Deletes a generation and every asset in it.
    /// Returns false if the generation did not exist.
    pub async fn delete_generation(&self, name: &str) -> DbResult<bool> {
        info!(generation = %name, "Deleting cache generation");

        let result = sqlx::query("DELETE FROM cache_generations WHERE name = ?1")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stores (or replaces) one asset, creating its generation if needed.
    pub async fn put(&self, record: &AssetRecord) -> DbResult<()> {
        let mut tx = self.begin().await?;
        insert_generation(&mut tx, &record.generation).await?;
        upsert_asset(&mut tx, record).await?;
        commit(tx).await
    }

    /// Stores every record in one transaction: either all rows land or none.
    pub async fn put_all(&self, records: &[AssetRecord]) -> DbResult<()> {
        let mut tx = self.begin().await?;
        for record in records {
            insert_generation(&mut tx, &record.generation).await?;
            upsert_asset(&mut tx, record).await?;
        }
        commit(tx).await?;

        debug!(count = records.len(), "Stored asset batch");
        Ok(())
    }

    /// First match for a URL across all generations, oldest generation first.
    pub async fn find(&self, url: &str) -> DbResult<Option<AssetRecord>> {
        let row: Option<AssetRow> = sqlx::query_as(
            r#"
            SELECT a.generation, a.url, a.status, a.content_type, a.headers, a.body, a.stored_at
            FROM cached_assets a
            JOIN cache_generations g ON g.name = a.generation
            WHERE a.url = ?1
            ORDER BY g.created_at, g.rowid
            LIMIT 1
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AssetRecord::try_from).transpose()
    }

    /// URLs stored in a generation, sorted.
    pub async fn urls(&self, generation: &str) -> DbResult<Vec<String>> {
        let urls: Vec<String> =
            sqlx::query_scalar("SELECT url FROM cached_assets WHERE generation = ?1 ORDER BY url")
                .bind(generation)
                .fetch_all(&self.pool)
                .await?;
        Ok(urls)
    }

    async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

async fn commit(tx: Transaction<'static, Sqlite>) -> DbResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}

async fn insert_generation(tx: &mut Transaction<'static, Sqlite>, name: &str) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO cache_generations (name, created_at) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
    )
    .bind(name)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn upsert_asset(tx: &mut Transaction<'static, Sqlite>, record: &AssetRecord) -> DbResult<()> {
    let headers = serde_json::to_string(&record.headers)?;

    sqlx::query(
        r#"
        INSERT INTO cached_assets (
            generation, url, status, content_type, headers, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(generation, url) DO UPDATE SET
            status = excluded.status,
            content_type = excluded.content_type,
            headers = excluded.headers,
            body = excluded.body,
            stored_at = excluded.stored_at
        "#,
    )
    .bind(&record.generation)
    .bind(&record.url)
    .bind(i64::from(record.status))
    .bind(&record.content_type)
    .bind(headers)
    .bind(&record.body)
    .bind(record.stored_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn record(generation: &str, url: &str, body: &str) -> AssetRecord {
        AssetRecord::new(generation, url, 200)
            .with_content_type("text/html")
            .with_headers(vec![("content-type".to_string(), "text/html".to_string())])
            .with_body(body.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_put_and_find() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let assets = db.assets();

        let rec = record("v1", "/index.html", "<h1>hi</h1>");
        assets.put(&rec).await.unwrap();

        let loaded = assets.find("/index.html").await.unwrap().unwrap();
        assert_eq!(loaded.status, 200);
        assert_eq!(loaded.body, b"<h1>hi</h1>".to_vec());
        assert_eq!(loaded.headers, rec.headers);
        assert_eq!(assets.generations().await.unwrap(), vec!["v1".to_string()]);
        assert!(assets.find("/missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_replaces() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let assets = db.assets();

        assets.put(&record("v1", "/a", "old")).await.unwrap();
        assets.put(&record("v1", "/a", "new")).await.unwrap();

        let loaded = assets.find("/a").await.unwrap().unwrap();
        assert_eq!(loaded.body, b"new".to_vec());
        assert_eq!(assets.urls("v1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_generation_cascades() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let assets = db.assets();

        assets
            .put_all(&[record("old", "/a", "1"), record("old", "/b", "2")])
            .await
            .unwrap();
        assets.put(&record("new", "/a", "3")).await.unwrap();

        assert!(assets.delete_generation("old").await.unwrap());
        assert!(!assets.delete_generation("old").await.unwrap());

        assert_eq!(assets.generations().await.unwrap(), vec!["new".to_string()]);
        assert!(assets.urls("old").await.unwrap().is_empty());
        assert_eq!(assets.find("/a").await.unwrap().unwrap().body, b"3".to_vec());
        assert!(assets.find("/b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ensure_generation_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let assets = db.assets();

        assets.ensure_generation("v1").await.unwrap();
        assets.ensure_generation("v1").await.unwrap();
        assert_eq!(assets.generations().await.unwrap().len(), 1);
        assert!(assets.urls("v1").await.unwrap().is_empty());
    }
}
