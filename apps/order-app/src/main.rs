//! order-app - product carousel, order summary and offline asset cache

use clap::Parser;
use order_app::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    order_app::init_tracing(cli.verbose);

    if let Err(e) = order_app::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
