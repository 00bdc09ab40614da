//! Configuration types for the listing-watch service

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Word counted in every fetched page
    pub keyword: String,
    pub targets: Vec<MonitorTarget>,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,
    #[serde(default)]
    pub notifiers: Vec<NotifierConfig>,
}

/// A monitored page and the count at which it raises an alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorTarget {
    pub name: String,
    pub url: String,
    pub threshold: u32,
}

/// Longest accepted polling interval (one week)
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Timing and retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    /// Retry budget for a single page fetch. The same value bounds the
    /// zero-count re-check loop around it, so one target can cost up to
    /// `(max_retries + 1)^2` requests per cycle.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before retry `i`, indexed by retry number. Must hold at least
    /// `max_retries` entries.
    #[serde(default = "default_retry_delays")]
    pub retry_delays_ms: Vec<u64>,
    /// Used by the re-check loop when the schedule has no entry for an index
    #[serde(default = "default_fallback_delay")]
    pub fallback_delay_ms: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    #[serde(default = "default_inter_target_pause")]
    pub inter_target_pause_ms: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            max_retries: default_max_retries(),
            retry_delays_ms: default_retry_delays(),
            fallback_delay_ms: default_fallback_delay(),
            request_timeout_ms: default_request_timeout(),
            max_redirects: default_max_redirects(),
            inter_target_pause_ms: default_inter_target_pause(),
        }
    }
}

impl MonitoringConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn inter_target_pause(&self) -> Duration {
        Duration::from_millis(self.inter_target_pause_ms)
    }
}

/// Notifier configuration with tagged enum for extensibility
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NotifierConfig {
    #[serde(rename = "telegram")]
    Telegram {
        #[serde(default)]
        bot_token: String,
        #[serde(default)]
        chat_id: String,
        #[serde(default = "default_bot_token_env")]
        bot_token_env: String,
        #[serde(default = "default_chat_id_env")]
        chat_id_env: String,
    },
}

impl NotifierConfig {
    pub fn type_name(&self) -> &str {
        match self {
            NotifierConfig::Telegram { .. } => "telegram",
        }
    }
}

impl Config {
    /// Check the preconditions the monitoring loop relies on
    pub fn validate(&self) -> crate::Result<()> {
        if self.keyword.is_empty() {
            return Err(config_error("keyword must not be empty"));
        }
        if self.targets.is_empty() {
            return Err(config_error("at least one target is required"));
        }
        if let Some(target) = self.targets.iter().find(|t| t.url.is_empty()) {
            return Err(config_error(&format!(
                "target '{}' has an empty url",
                target.name
            )));
        }
        if self.user_agents.is_empty() {
            return Err(config_error("user_agents must not be empty"));
        }
        let monitoring = &self.monitoring;
        if monitoring.interval_minutes == 0 || monitoring.interval_minutes > MAX_INTERVAL_MINUTES {
            return Err(config_error(&format!(
                "interval_minutes must be between 1 and {}, got {}",
                MAX_INTERVAL_MINUTES, monitoring.interval_minutes
            )));
        }
        if monitoring.retry_delays_ms.len() < monitoring.max_retries as usize {
            return Err(config_error(&format!(
                "retry_delays_ms has {} entries but max_retries is {}",
                monitoring.retry_delays_ms.len(),
                monitoring.max_retries
            )));
        }
        Ok(())
    }

    /// Fill empty notifier credentials from the environment
    pub fn resolve_secrets(&mut self) -> crate::Result<()> {
        for notifier in &mut self.notifiers {
            match notifier {
                NotifierConfig::Telegram {
                    bot_token,
                    chat_id,
                    bot_token_env,
                    chat_id_env,
                } => {
                    resolve_from_env(bot_token, bot_token_env)?;
                    resolve_from_env(chat_id, chat_id_env)?;
                }
            }
        }
        Ok(())
    }
}

fn resolve_from_env(value: &mut String, var: &str) -> crate::Result<()> {
    if !value.is_empty() {
        return Ok(());
    }
    match std::env::var(var) {
        Ok(resolved) if !resolved.is_empty() => {
            tracing::debug!("Resolved notifier secret from ${}", var);
            *value = resolved;
            Ok(())
        }
        _ => Err(config_error(&format!(
            "notifier secret not set in config and ${} is empty or unset",
            var
        ))),
    }
}

fn config_error(msg: &str) -> crate::WatchError {
    crate::WatchError::Config(msg.to_string())
}

fn default_interval_minutes() -> u64 {
    5
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delays() -> Vec<u64> {
    vec![2000, 5000, 10000]
}

fn default_fallback_delay() -> u64 {
    5000
}

fn default_request_timeout() -> u64 {
    30000
}

fn default_max_redirects() -> usize {
    5
}

fn default_inter_target_pause() -> u64 {
    2000
}

fn default_bot_token_env() -> String {
    "TELEGRAM_BOT_TOKEN".to_string()
}

fn default_chat_id_env() -> String {
    "TELEGRAM_CHAT_ID".to_string()
}

fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
        "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::WatchError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
