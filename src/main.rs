use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod core;
mod utils;

use cli::Cli;

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr, stdout is reserved for the prompts
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("starting yt2mp3 v{}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = cli.run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }

    // A cancelled prompt leaves the stdin reader parked in a blocking read;
    // exit directly instead of letting runtime shutdown wait for it
    std::process::exit(0);
}
