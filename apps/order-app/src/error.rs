//! # App Error Type
//!
//! Everything that can stop the app before or between sessions. Engine
//! operations never fail; errors here come from startup (config, catalog,
//! translations, database) and from the cache commands.

use order_cache::CacheError;
use order_core::CoreError;
use order_store::DbError;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// `config.toml` is not valid TOML or has wrong types.
    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// No platform data directory and no explicit database path.
    #[error("Could not determine the data directory; set database.path")]
    NoDataDir,

    /// Unknown session command.
    #[error("Unknown command: {0} (type 'help')")]
    UnknownCommand(String),

    /// Catalog, translation or validation failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Process exit code: 2 for configuration problems, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::InvalidConfig(_) | AppError::ConfigParse(_) | AppError::NoDataDir => 2,
            AppError::Cache(CacheError::InvalidConfig(_) | CacheError::InvalidUrl(_)) => 2,
            _ => 1,
        }
    }
}
