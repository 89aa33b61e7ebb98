//! # order-store: Durable Storage for the Order App
//!
//! SQLite storage (via sqlx) for the two things that outlive a session:
//! user preferences and offline asset cache generations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order App Data Flow                              │
//! │                                                                         │
//! │  OrderEngine (order-core)            AssetCache (order-cache)           │
//! │       │ PreferenceStore                   │ CacheStorage                │
//! │       ▼                                   ▼                             │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   order-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ Preference     │    │  (embedded)  │  │   │
//! │  │   │               │    │ Asset          │    │ 001, 002     │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │            ▲                                                    │   │
//! │  │            └── PersistedPreferences + writer task (writer.rs)   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file in the platform data dir (order-app.db)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use order_store::{Database, DbConfig, PersistedPreferences};
//!
//! let db = Database::new(DbConfig::new("order-app.db")).await?;
//! let (store, writer) = PersistedPreferences::open(&db).await?;
//! // hand `store` to the engine, keep `writer` for shutdown
//! writer.shutdown().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod writer;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use writer::{PersistedPreferences, PreferenceWriter};

pub use repository::asset::{AssetRecord, AssetRepository};
pub use repository::preference::PreferenceRepository;
