//! # order-app
//!
//! Composition root for the order app.
//!
//! ## Module Organization
//! ```text
//! order_app/
//! ├── lib.rs          ◄─── You are here (startup & command runners)
//! ├── cli.rs          ◄─── clap definitions
//! ├── config.rs       ◄─── AppConfig: defaults → config.toml → env
//! ├── session.rs      ◄─── typed commands → engine operations
//! ├── render.rs       ◄─── Screen → text, RenderObserver
//! └── error.rs        ◄─── AppError
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize logging (stderr, RUST_LOG override)                      │
//! │  2. Load AppConfig                                                      │
//! │  3. Load catalog + translations (validated, fail fast)                  │
//! │  4. Open SQLite, run migrations                                         │
//! │  5. PersistedPreferences::open  → snapshot + writer task                │
//! │  6. OrderEngine::new(catalog, prefs, system theme)                      │
//! │  7. subscribe(RenderObserver) and read commands until quit / Ctrl+C     │
//! │  8. Drain the preference writer, close the pool                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod render;
pub mod session;

use std::io::Write;
use std::sync::Arc;

use order_cache::{
    AssetCache, AssetRequest, HttpFetcher, ProxyServer, RequestMode, SqliteCacheStorage,
};
use order_core::engine::OrderEngine;
use order_core::view::Screen;
use order_core::QuantityChange;
use order_store::{Database, DbConfig, PersistedPreferences};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{CacheCommand, Cli, Commands};
use config::AppConfig;
use error::AppResult;
use render::{RenderObserver, TextRenderer};
use session::{Outcome, Session};

/// Initializes the tracing subscriber. Logs go to stderr.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=order_cache=trace` - Trace one crate
/// - Default: warnings, plus info from the order crates
pub fn init_tracing(verbose: bool) {
    let default = if verbose {
        "info,order=debug,sqlx=warn"
    } else {
        "warn,order=info,sqlx=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the selected command.
pub async fn run(cli: Cli) -> AppResult<()> {
    let config = AppConfig::load(cli.config)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_session(&config).await,
        Commands::Summary { json, add, fresh } => run_summary(&config, json, &add, fresh).await,
        Commands::Cache { action } => run_cache(&config, action).await,
    }
}

async fn open_database(config: &AppConfig) -> AppResult<Database> {
    let path = config.database_path()?;
    Ok(Database::new(DbConfig::new(path)).await?)
}

// =============================================================================
// Session
// =============================================================================

async fn run_session(config: &AppConfig) -> AppResult<()> {
    let catalog = config.load_catalog()?;
    let translations = config.load_translations()?;
    let db = open_database(config).await?;
    let (prefs, writer) = PersistedPreferences::open(&db).await?;

    let engine = OrderEngine::new(catalog, Box::new(prefs), config.app.system_theme);
    let renderer = TextRenderer::new(translations.clone());
    let mut session = Session::new(engine, translations);
    session
        .engine_mut()
        .subscribe(RenderObserver::new(renderer.clone(), std::io::stdout()));

    print!("{}", renderer.render_engine(session.engine()));
    println!("type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut shutdown => break,
        };
        // EOF
        let Some(line) = line else { break };

        match session.execute_line(&line) {
            Ok(Outcome::Continue) => {}
            Ok(Outcome::Redraw) => print!("{}", renderer.render_engine(session.engine())),
            Ok(Outcome::Message(message)) => println!("{message}"),
            Ok(Outcome::Quit) => break,
            Err(err) => println!("{err}"),
        }
        std::io::stdout().flush()?;
    }

    let applied = writer.shutdown().await?;
    info!(applied, "Preferences saved");
    db.close().await;
    Ok(())
}

// =============================================================================
// Summary
// =============================================================================

async fn run_summary(config: &AppConfig, json: bool, add: &[String], fresh: bool) -> AppResult<()> {
    let catalog = config.load_catalog()?;
    let translations = config.load_translations()?;
    let db = if fresh {
        Database::new(DbConfig::in_memory()).await?
    } else {
        open_database(config).await?
    };
    let (prefs, writer) = PersistedPreferences::open(&db).await?;

    let mut engine = OrderEngine::new(catalog, Box::new(prefs), config.app.system_theme);
    for product_id in add {
        if engine
            .adjust_quantity(product_id, QuantityChange::Increment)
            .is_none()
        {
            warn!(product_id = %product_id, "Unknown product, skipped");
        }
    }

    let screen = Screen::build(&engine, &translations);
    if json {
        println!("{}", serde_json::to_string_pretty(&screen)?);
    } else {
        print!("{}", TextRenderer::new(translations).render(&screen));
    }

    writer.shutdown().await?;
    db.close().await;
    Ok(())
}

// =============================================================================
// Cache
// =============================================================================

async fn run_cache(config: &AppConfig, action: CacheCommand) -> AppResult<()> {
    let db = open_database(config).await?;
    let fetcher = Arc::new(HttpFetcher::from_config(&config.cache)?);
    let storage = Arc::new(SqliteCacheStorage::new(&db));
    let cache = AssetCache::new(config.cache.clone(), fetcher, storage)?;

    match action {
        CacheCommand::Install => {
            let report = cache.install().await?;
            println!(
                "installed {} assets into {}{}",
                report.stored,
                report.generation,
                if report.offline_page_cached {
                    ""
                } else {
                    " (offline page missing)"
                }
            );
        }
        CacheCommand::Activate => {
            let deleted = cache.activate().await?;
            if deleted.is_empty() {
                println!("{} active", cache.generation());
            } else {
                println!("{} active, deleted {}", cache.generation(), deleted.join(", "));
            }
        }
        CacheCommand::Status => {
            let storage = cache.storage();
            for generation in storage.generations().await? {
                let marker = if generation == cache.generation() { "*" } else { " " };
                let count = storage.urls(&generation).await?.len();
                println!("{marker} {generation} ({count} assets)");
            }
        }
        CacheCommand::Fetch { url, navigate } => {
            cache.resume().await?;
            let mode = if navigate {
                RequestMode::Navigate
            } else {
                RequestMode::Other
            };
            let response = cache.handle(&AssetRequest::new(url, mode)).await;

            println!(
                "{} {} ({})",
                response.status,
                response.content_type().unwrap_or("-"),
                response.source.as_str()
            );
            let textual = response
                .content_type()
                .map(|ct| ct.starts_with("text/") || ct.contains("json"))
                .unwrap_or(false);
            if textual {
                println!("{}", String::from_utf8_lossy(&response.body));
            } else {
                println!("<{} bytes>", response.body.len());
            }
        }
        CacheCommand::Serve => {
            cache.resume().await?;
            let handle = ProxyServer::new(Arc::new(cache), config.cache.proxy.clone())
                .start()
                .await?;
            println!("serving on http://{}", handle.local_addr());

            shutdown_signal().await;
            handle.shutdown().await?;
        }
    }

    db.close().await;
    Ok(())
}

// =============================================================================
// Shutdown
// =============================================================================

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
