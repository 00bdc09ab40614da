//! Per-target check loop
//!
//! A zero count is ambiguous: the page may really have no listings, or the
//! site served a page without results. The checker re-fetches while the
//! count stays at zero and reports the last count once the budget is spent.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::MonitorTarget;
use crate::counter;
use crate::fetcher::PageFetcher;

/// Result of checking one target in one cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub target: MonitorTarget,
    pub final_count: usize,
    pub attempts_used: u32,
}

/// Why a round ended without a positive count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecheckReason {
    NoOccurrences,
    FetchFailed,
}

impl RecheckReason {
    fn message(self, target: &str, delay: Duration) -> String {
        match self {
            Self::NoOccurrences => format!(
                "No occurrences for '{}', checking again in {:?}",
                target, delay
            ),
            Self::FetchFailed => format!(
                "Fetch failed for '{}', checking again in {:?}",
                target, delay
            ),
        }
    }
}

/// Produces a keyword count for a target
#[async_trait]
pub trait TargetChecker: Send + Sync + std::fmt::Debug {
    async fn check(&self, target: &MonitorTarget) -> crate::Result<CheckOutcome>;
}

/// Fetches and counts a target, re-checking while the count is zero
#[derive(Debug)]
pub struct PageChecker {
    fetcher: PageFetcher,
    keyword: String,
}

impl PageChecker {
    pub fn new(fetcher: PageFetcher, keyword: impl Into<String>) -> Self {
        Self {
            fetcher,
            keyword: keyword.into(),
        }
    }

    /// Run up to `max_retries + 1` fetch-and-count rounds, each with its own
    /// fetch retry budget. Returns on the first positive count; fetch errors
    /// count as zero.
    pub async fn check_with_retries(&self, target: &MonitorTarget) -> CheckOutcome {
        let policy = self.fetcher.policy();
        let max_attempts = policy.max_attempts();

        tracing::info!(
            "Checking '{}' at {} (threshold {})",
            target.name,
            target.url,
            target.threshold
        );

        let mut last_count = 0;
        let mut attempts = 0;
        while attempts < max_attempts {
            attempts += 1;

            let reason = match self.fetcher.fetch_with_retry(&target.url).await {
                Ok(body) => {
                    let count = counter::count_occurrences(&body, &self.keyword).reconciled;
                    tracing::info!(
                        "'{}' attempt {}: {} occurrence(s) of '{}'",
                        target.name,
                        attempts,
                        count,
                        self.keyword
                    );
                    if count > 0 {
                        return CheckOutcome {
                            target: target.clone(),
                            final_count: count,
                            attempts_used: attempts,
                        };
                    }
                    last_count = count;
                    RecheckReason::NoOccurrences
                }
                Err(e) => {
                    tracing::error!("'{}' attempt {} failed: {}", target.name, attempts, e);
                    last_count = 0;
                    RecheckReason::FetchFailed
                }
            };

            if attempts < max_attempts {
                let delay = policy.delay_for(attempts as usize - 1);
                tracing::warn!("{}", reason.message(&target.name, delay));
                tokio::time::sleep(delay).await;
            }
        }

        tracing::info!(
            "'{}' final result after {} attempts: {} occurrence(s)",
            target.name,
            max_attempts,
            last_count
        );
        CheckOutcome {
            target: target.clone(),
            final_count: last_count,
            attempts_used: attempts,
        }
    }
}

#[async_trait]
impl TargetChecker for PageChecker {
    async fn check(&self, target: &MonitorTarget) -> crate::Result<CheckOutcome> {
        Ok(self.check_with_retries(target).await)
    }
}
