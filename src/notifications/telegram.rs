//! Telegram Bot API transport
//!
//! Sends HTML messages, optionally as an animation caption, with an inline
//! keyboard of URL buttons.

use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{ChatTransport, OutgoingMessage};
use crate::config::TelegramConfig;

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram transport
pub struct TelegramTransport {
    /// Bot API base URL
    api_url: String,
    /// Bot token
    bot_token: String,
    /// HTTP client
    client: reqwest::Client,
}

impl TelegramTransport {
    /// Create a new Telegram transport
    pub fn new(config: &TelegramConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            client,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.bot_token, method)
    }
}

/// Bot API method and JSON body for `message`
pub fn build_request(message: &OutgoingMessage) -> (&'static str, Value) {
    let (method, mut payload) = match &message.animation {
        Some(animation) => (
            "sendAnimation",
            json!({
                "chat_id": message.chat_id,
                "animation": animation,
                "caption": message.text,
                "parse_mode": "HTML",
            }),
        ),
        None => (
            "sendMessage",
            json!({
                "chat_id": message.chat_id,
                "text": message.text,
                "parse_mode": "HTML",
                "disable_web_page_preview": true,
            }),
        ),
    };

    if message.thread_id != 0 {
        payload["message_thread_id"] = json!(message.thread_id);
    }

    if !message.buttons.is_empty() {
        payload["reply_markup"] = json!({ "inline_keyboard": [message.buttons] });
    }

    (method, payload)
}

#[async_trait::async_trait]
impl ChatTransport for TelegramTransport {
    async fn send(&self, message: &OutgoingMessage) -> anyhow::Result<()> {
        let (method, payload) = build_request(message);

        let response = self
            .client
            .post(self.method_url(method))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let api: Option<ApiResponse> = serde_json::from_str(&body).ok();
        match api {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(ApiResponse {
                description: Some(description),
                ..
            }) => anyhow::bail!("Telegram API error: {} - {}", status, description),
            _ => anyhow::bail!("Telegram API error: {} - {}", status, body),
        }
    }
}
