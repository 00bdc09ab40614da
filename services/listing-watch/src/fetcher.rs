//! Page fetching with completeness validation and retry
//!
//! Anti-bot interstitials and error stubs usually come back as short pages,
//! sometimes with a 200 status. A page is only trusted when it has both an
//! `<html>` and a `<body>` element and is at least [`MIN_PAGE_BYTES`] long.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;

use crate::config::MonitoringConfig;
use crate::io::HttpClient;
use crate::markup;
use crate::WatchError;

/// Pages shorter than this are treated as incomplete
pub const MIN_PAGE_BYTES: usize = 1000;

/// Retry budget and backoff schedule shared by the fetcher and the checker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delays: Vec<Duration>,
    pub fallback_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &MonitoringConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delays: config
                .retry_delays_ms
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
            fallback_delay: Duration::from_millis(config.fallback_delay_ms),
        }
    }

    /// Total tries allowed, `max_retries + 1`
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay before retry number `index`
    pub fn delay_for(&self, index: usize) -> Duration {
        self.delays
            .get(index)
            .copied()
            .unwrap_or(self.fallback_delay)
    }
}

/// One network attempt
#[derive(Debug, Clone)]
pub struct FetchAttempt {
    pub index: u32,
    pub user_agent: String,
}

/// Structural checks on a fetched body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageValidation {
    pub has_root_tag: bool,
    pub has_body_tag: bool,
    pub byte_length: usize,
}

impl PageValidation {
    pub fn inspect(body: &str) -> Self {
        let tags = markup::StartTags::scan(body);
        Self {
            has_root_tag: tags.contains("html"),
            has_body_tag: tags.contains("body"),
            byte_length: body.len(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.has_root_tag && self.has_body_tag && self.byte_length >= MIN_PAGE_BYTES
    }
}

/// Fetches pages with a randomized user agent until a complete one arrives
pub struct PageFetcher {
    http: Arc<dyn HttpClient>,
    user_agents: Vec<String>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher")
            .field("user_agents", &self.user_agents.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl PageFetcher {
    /// Fails when the user-agent pool is empty
    pub fn new(
        http: Arc<dyn HttpClient>,
        user_agents: Vec<String>,
        policy: RetryPolicy,
    ) -> crate::Result<Self> {
        if user_agents.is_empty() {
            return Err(WatchError::Config(
                "user agent pool must not be empty".to_string(),
            ));
        }
        Ok(Self {
            http,
            user_agents,
            policy,
        })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn next_attempt(&self, index: u32) -> FetchAttempt {
        let user_agent = self
            .user_agents
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default();
        FetchAttempt { index, user_agent }
    }

    /// Fetch `url` until a complete page is returned or the retry budget is
    /// spent. Makes at most `max_retries + 1` requests.
    pub async fn fetch_with_retry(&self, url: &str) -> crate::Result<String> {
        let mut index = 0;
        loop {
            let attempt = self.next_attempt(index);
            tracing::debug!("Fetch attempt {} for {}", attempt.index + 1, url);

            let err = match self.fetch_once(url, &attempt).await {
                Ok(body) => return Ok(body),
                Err(e) => e,
            };
            tracing::debug!("Fetch attempt {} for {} failed: {}", attempt.index + 1, url, err);

            if index >= self.policy.max_retries {
                tracing::error!(
                    "Giving up on {} after {} attempts: {}",
                    url,
                    self.policy.max_attempts(),
                    err
                );
                return Err(WatchError::FetchExhausted {
                    attempts: self.policy.max_attempts(),
                    last_error: err.to_string(),
                });
            }

            let delay = self.policy.delay_for(index as usize);
            tracing::debug!("Retrying {} in {:?}", url, delay);
            tokio::time::sleep(delay).await;
            index += 1;
        }
    }

    async fn fetch_once(&self, url: &str, attempt: &FetchAttempt) -> crate::Result<String> {
        let response = self.http.get(url, &attempt.user_agent).await?;
        if !response.is_success() {
            return Err(WatchError::Http(format!(
                "GET {} returned status {}",
                url, response.status
            )));
        }

        let validation = PageValidation::inspect(&response.body);
        if !validation.is_complete() {
            tracing::warn!(
                "Incomplete page from {}: html={}, body={}, size={}",
                url,
                validation.has_root_tag,
                validation.has_body_tag,
                validation.byte_length
            );
            return Err(WatchError::Validation(format!(
                "html={}, body={}, {} bytes",
                validation.has_root_tag, validation.has_body_tag, validation.byte_length
            )));
        }

        tracing::debug!(
            "Complete page from {} ({:.2} KB)",
            url,
            validation.byte_length as f64 / 1024.0
        );
        Ok(response.body)
    }
}
