//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "order-app", version)]
#[command(about = "Product carousel, order summary and offline asset cache", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "ORDER_APP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `run`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Interactive session
    Run,

    /// Print the current screen once
    Summary {
        /// Print the view-model as JSON
        #[arg(long)]
        json: bool,

        /// Add one unit of a product (repeatable)
        #[arg(long = "add", value_name = "PRODUCT_ID")]
        add: Vec<String>,

        /// Ignore saved preferences
        #[arg(long)]
        fresh: bool,
    },

    /// Offline asset cache
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CacheCommand {
    /// Fetch the manifest into the current generation
    Install,

    /// Delete old generations and start serving from the cache
    Activate,

    /// List stored generations
    Status,

    /// Answer one request through the cache
    Fetch {
        /// Absolute URL, or a path on the configured origin
        url: String,

        /// Treat as a page navigation
        #[arg(long)]
        navigate: bool,
    },

    /// Run the cache proxy until Ctrl+C
    Serve,
}
