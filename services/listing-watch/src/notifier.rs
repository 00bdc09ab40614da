//! Notifier trait for sending alerts

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::MonitorTarget;

/// A notification to be sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// HTML-formatted message body
    pub message: String,
}

impl Notification {
    /// Alert for a target whose count reached its threshold
    pub fn threshold_alert(target: &MonitorTarget, count: usize) -> Self {
        let message = format!(
            "🏠 <b>ALERT {}</b>\n\n\
             📊 <b>{}</b> listing(s) found\n\
             ⚠️ Threshold reached (≥{})\n\n\
             🔗 <a href=\"{}\">View listings</a>",
            escape_html(&target.name),
            count,
            target.threshold,
            escape_html(&target.url)
        );
        Self { message }
    }

    /// Announcement sent once when the service starts
    pub fn startup(targets: &[MonitorTarget], keyword: &str, interval_minutes: u64) -> Self {
        let target_lines = targets
            .iter()
            .enumerate()
            .map(|(i, t)| {
                format!(
                    "{}. {} (threshold: ≥{})",
                    i + 1,
                    escape_html(&t.name),
                    t.threshold
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let message = format!(
            "🚀 <b>Listing Watch started</b>\n\n\
             ⏱ Checking every {} minute(s)\n\n\
             📍 <b>Monitored pages:</b>\n{}\n\n\
             🔍 Keyword: \"{}\"",
            interval_minutes,
            target_lines,
            escape_html(keyword)
        );
        Self { message }
    }
}

/// Record of a sent notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub target_name: String,
    pub notifier_type: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Trait for sending notifications
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Get the notifier type name (e.g. "telegram")
    fn type_name(&self) -> &str;

    /// Send a notification
    async fn notify(&self, notification: &Notification) -> crate::Result<()>;
}

/// Escape text for Telegram's HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
