//! Main entry point for the Space Translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use space_translator::cli::commands::{self, Backend, Commands};
use space_translator::ServiceConfig;

/// Space Translator - tiered access to the space translation API
#[derive(Parser, Debug)]
#[command(name = "space-translator", version, about, long_about = None)]
struct Args {
    /// Catalog (JSON or YAML) seeding the simulated API
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Remote API endpoint (defaults to API_ENDPOINT env var)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    let default_filter = format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), log_level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ServiceConfig::load()?;

    let backend = Backend {
        catalog: args.catalog,
        endpoint: args.endpoint,
    };

    if let Err(e) = commands::execute(args.command, backend, config).await {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    Ok(())
}
