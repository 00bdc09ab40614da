//! BDD test world for listing-watch service

use std::sync::Arc;
use std::time::Duration;

use cucumber::World;
use listing_watch::check::CheckOutcome;
use listing_watch::config::MonitorTarget;
use listing_watch::counter::CountResult;
use listing_watch::engine::TargetReport;
use listing_watch::fetcher::{PageFetcher, RetryPolicy};

use crate::doubles::{RecordingNotifier, ScriptedSite};

#[derive(Debug, Default, World)]
pub struct WatchWorld {
    pub keyword: String,
    pub max_retries: u32,
    pub site: Arc<ScriptedSite>,

    // Counting
    pub count_result: Option<CountResult>,

    // Fetching and checking
    pub fetch_result: Option<listing_watch::Result<String>>,
    pub check_outcome: Option<CheckOutcome>,

    // Monitoring cycle
    pub targets: Vec<MonitorTarget>,
    pub failing_targets: Vec<String>,
    pub notifier: Option<Arc<RecordingNotifier>>,
    pub reports: Vec<TargetReport>,
}

impl WatchWorld {
    /// Retry policy with millisecond delays so scenarios run quickly
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            delays: vec![Duration::from_millis(1); self.max_retries as usize],
            fallback_delay: Duration::from_millis(1),
        }
    }

    pub fn fetcher(&self) -> PageFetcher {
        PageFetcher::new(
            Arc::clone(&self.site) as Arc<dyn listing_watch::io::HttpClient>,
            vec!["Mozilla/5.0 (BDD)".to_string()],
            self.policy(),
        )
        .expect("non-empty user agent pool")
    }
}
