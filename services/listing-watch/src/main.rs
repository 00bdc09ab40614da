//! Listing Watch CLI
//!
//! Command-line interface for the listings keyword monitor.

use std::path::PathBuf;

use clap::Parser;
use listing_watch::load_config;
use tracing::Level;

#[derive(Parser)]
#[command(name = "listing-watch")]
#[command(about = "Listings page keyword monitor with threshold notifications")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Run a single monitoring cycle and exit
    #[arg(long)]
    once: bool,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, once={}, log_level={:?}",
        args.config,
        args.once,
        args.log_level
    );

    let mut config = load_config(&args.config)?;
    config.resolve_secrets()?;

    tracing::debug!(
        "Targets: {}, Notifiers: {}, Keyword: '{}'",
        config.targets.len(),
        config.notifiers.len(),
        config.keyword
    );

    if args.once {
        let reports = listing_watch::run_once(config).await?;
        let alerts = reports.iter().filter(|r| r.alerted()).count();
        let failures = reports.iter().filter(|r| r.error.is_some()).count();
        tracing::info!(
            "Checked {} target(s): {} alert(s), {} failure(s)",
            reports.len(),
            alerts,
            failures
        );
    } else {
        tracing::info!("Starting listing-watch service");
        listing_watch::run(config).await?;
    }

    Ok(())
}
