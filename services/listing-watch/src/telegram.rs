//! Telegram bot notification client

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::NotifierConfig;
use crate::io::HttpClient;
use crate::notifier::{Notification, Notifier};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram notification sender
pub struct TelegramNotifier {
    api_url: String,
    chat_id: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramNotifier {
    pub fn new(config: &NotifierConfig, http: Arc<dyn HttpClient>) -> Self {
        let NotifierConfig::Telegram {
            bot_token, chat_id, ..
        } = config;

        tracing::debug!("Created TelegramNotifier for chat '{}'", chat_id);

        Self {
            api_url: format!("{}/bot{}/sendMessage", TELEGRAM_API_BASE, bot_token),
            chat_id: chat_id.clone(),
            http,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn type_name(&self) -> &str {
        "telegram"
    }

    async fn notify(&self, notification: &Notification) -> crate::Result<()> {
        let params = vec![
            ("chat_id", self.chat_id.as_str()),
            ("text", notification.message.as_str()),
            ("parse_mode", "HTML"),
        ];

        tracing::debug!("Sending Telegram message to chat '{}'", self.chat_id);

        let response = self.http.post_form(&self.api_url, &params).await?;

        if response.status != 200 {
            return Err(crate::WatchError::Notifier(format!(
                "Telegram API returned status {}: {}",
                response.status, response.body
            )));
        }

        tracing::info!("Telegram message sent");
        Ok(())
    }
}
