//! Telegram Bot API client for owner notifications.
//!
//! Used to alert the store owner about new wholesale requests. Delivery is
//! best effort; callers log failures and never surface them to the user.

use secrecy::ExposeSecret;
use thiserror::Error;

use bazaar_core::{ChatId, RequestId, UserId};

use crate::config::TelegramConfig;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Errors that can occur when sending a Telegram notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Telegram API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Telegram Bot API client.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    send_message_url: String,
    owner_chat_id: ChatId,
}

impl Notifier {
    /// Create a new notifier.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &TelegramConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().build()?;
        let send_message_url = format!(
            "{TELEGRAM_API_BASE}/bot{}/sendMessage",
            config.bot_token.expose_secret()
        );

        Ok(Self {
            client,
            send_message_url,
            owner_chat_id: config.owner_chat_id,
        })
    }

    /// Notify the owner about a new wholesale request.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or Telegram rejects the
    /// message.
    pub async fn notify_wholesale(
        &self,
        request_id: RequestId,
        user_id: UserId,
        name: &str,
        contact: &str,
        question: &str,
    ) -> Result<(), NotifyError> {
        let text = format!(
            "<b>New wholesale request</b>\n\
             ID: {request_id}\n\
             User: {user_id}\n\n\
             Name: {name}\n\
             Contact: {contact}\n\
             Question: {question}"
        );
        self.send_to_owner(&text).await
    }

    /// Send an HTML-formatted message to the owner chat.
    async fn send_to_owner(&self, text: &str) -> Result<(), NotifyError> {
        let body = serde_json::json!({
            "chat_id": self.owner_chat_id,
            "text": text,
            "parse_mode": "HTML",
        });

        let response = self
            .client
            .post(&self.send_message_url)
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
