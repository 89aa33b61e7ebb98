//! # App Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     ORDER_APP_THEME=dark                                                │
//! │     ORDER_APP_DB_PATH=/tmp/order-app.db                                 │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     --config <path>, or                                                 │
//! │     ~/.config/order-app/config.toml (Linux)                             │
//! │     ~/Library/Application Support/com.order-app.order-app/config.toml   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     light theme, demo catalog, built-in translations                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [app]
//! system_theme = "dark"
//! catalog_path = "catalog.json"
//! translations_path = "strings.json"   # partial overrides are fine
//!
//! [database]
//! path = "/var/lib/order-app/order-app.db"
//!
//! [cache]
//! generation = "order-app-cache-v2"
//! origin = "http://127.0.0.1:8080"
//!
//! [cache.proxy]
//! port = 8787
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use order_cache::CacheConfig;
use order_core::catalog::Catalog;
use order_core::i18n::Translations;
use order_core::Theme;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

const DB_FILE: &str = "order-app.db";
const CONFIG_FILE: &str = "config.toml";

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Theme used until the user picks one.
    #[serde(default)]
    pub system_theme: Theme,

    /// JSON catalog. The built-in demo catalog when unset.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// JSON translation overrides, merged over the built-in tables.
    #[serde(default)]
    pub translations_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Complete app configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (an explicit path must exist)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else if explicit {
                return Err(AppError::InvalidConfig(format!(
                    "config file not found: {}",
                    path.display()
                )));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(path) = &self.database.path {
            if path.as_os_str().is_empty() {
                return Err(AppError::InvalidConfig(
                    "database.path must not be empty".into(),
                ));
            }
        }
        self.cache.validate()?;
        Ok(())
    }

    /// Applies `ORDER_APP_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(theme) = lookup("ORDER_APP_THEME") {
            match theme.parse() {
                Ok(parsed) => self.app.system_theme = parsed,
                Err(_) => warn!(theme = %theme, "Unknown theme in environment"),
            }
        }

        if let Some(path) = lookup("ORDER_APP_CATALOG") {
            self.app.catalog_path = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup("ORDER_APP_TRANSLATIONS") {
            self.app.translations_path = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup("ORDER_APP_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(generation) = lookup("ORDER_APP_CACHE_GENERATION") {
            self.cache.generation = generation;
        }

        if let Some(origin) = lookup("ORDER_APP_CACHE_ORIGIN") {
            self.cache.origin = origin;
        }

        if let Some(port) = lookup("ORDER_APP_PROXY_PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.cache.proxy.port = p,
                Err(_) => warn!(port = %port, "Invalid proxy port in environment"),
            }
        }
    }

    /// The SQLite file, from config or the platform data directory.
    pub fn database_path(&self) -> AppResult<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join(DB_FILE))
            .ok_or(AppError::NoDataDir)
    }

    /// Loads the configured catalog, or the demo catalog.
    pub fn load_catalog(&self) -> AppResult<Catalog> {
        match &self.app.catalog_path {
            Some(path) => {
                let catalog = Catalog::from_json(&read(path)?)?;
                info!(?path, products = catalog.len(), "Catalog loaded");
                Ok(catalog)
            }
            None => Ok(Catalog::demo()),
        }
    }

    /// Built-in translations, with the configured overrides applied.
    pub fn load_translations(&self) -> AppResult<Translations> {
        match &self.app.translations_path {
            Some(path) => Ok(Translations::with_overrides_json(&read(path)?)?),
            None => Ok(Translations::builtin()),
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "order-app", "order-app")
    }
}

fn read(path: &Path) -> AppResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        AppError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
    })
}
