//! Listing Watch - keyword monitor for listings pages
//!
//! Fetches configured pages, counts a keyword in each one, and sends a
//! notification when a page's count reaches its threshold.

pub mod check;
pub mod config;
pub mod counter;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod io;
pub mod markup;
pub mod notifier;
pub mod telegram;

pub use config::{load_config, Config};
pub use error::{Result, WatchError};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::check::PageChecker;
use crate::config::NotifierConfig;
use crate::engine::{Engine, TargetReport};
use crate::fetcher::{PageFetcher, RetryPolicy};
use crate::io::ReqwestHttpClient;
use crate::notifier::Notifier;
use crate::telegram::TelegramNotifier;

/// Wire up the production engine from a validated configuration
pub fn build_engine(config: &Config, cancel: CancellationToken) -> Result<Engine> {
    config.validate()?;

    let monitoring = &config.monitoring;
    let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::new(
        monitoring.request_timeout(),
        monitoring.max_redirects,
    )?);

    let fetcher = PageFetcher::new(
        Arc::clone(&http),
        config.user_agents.clone(),
        RetryPolicy::from_config(monitoring),
    )?;
    let checker = Arc::new(PageChecker::new(fetcher, config.keyword.clone()));

    let mut notifiers: Vec<Arc<dyn Notifier>> = Vec::new();
    for notifier_config in &config.notifiers {
        let notifier: Arc<dyn Notifier> = match notifier_config {
            NotifierConfig::Telegram { .. } => {
                Arc::new(TelegramNotifier::new(notifier_config, Arc::clone(&http)))
            }
        };
        notifiers.push(notifier);
    }
    if notifiers.is_empty() {
        tracing::warn!("No notifiers configured, alerts will only be logged");
    }

    Ok(Engine::new(
        checker,
        notifiers,
        config.targets.clone(),
        monitoring.inter_target_pause(),
        cancel,
    ))
}

/// Run a single monitoring cycle
pub async fn run_once(config: Config) -> Result<Vec<TargetReport>> {
    let engine = build_engine(&config, CancellationToken::new())?;
    Ok(engine.run_cycle().await)
}

/// Run the listing-watch service until ctrl-c
pub async fn run(config: Config) -> Result<()> {
    let cancel = CancellationToken::new();
    let engine = build_engine(&config, cancel.clone())?;

    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received, stopping after current cycle"),
            Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
        }
        cancel_for_signal.cancel();
    });

    engine
        .announce_startup(&config.keyword, config.monitoring.interval_minutes)
        .await;

    tracing::info!(
        "Listing watch started, checking every {} minute(s)",
        config.monitoring.interval_minutes
    );
    engine.run(config.monitoring.interval()).await;
    tracing::info!("Listing watch stopped");

    Ok(())
}
