//! Outbound chat messaging
//!
//! - `ChatTransport`: the seam between alert formatting and the chat API
//! - `TelegramTransport`: Bot API implementation
//! - `SignalSender`: fans buy alerts out to subscribed recipients

pub mod signal_sender;
pub mod telegram;

pub use signal_sender::{format_buy_message, SignalSender};
pub use telegram::TelegramTransport;

use serde::Serialize;

/// URL button shown under a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub url: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// A single message addressed to one chat
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    /// Forum thread, 0 for the main chat
    pub thread_id: i32,
    /// HTML text, used as the caption when an animation is attached
    pub text: String,
    /// Telegram file id or URL
    pub animation: Option<String>,
    pub buttons: Vec<InlineButton>,
}

/// Chat delivery service
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Deliver one message
    async fn send(&self, message: &OutgoingMessage) -> anyhow::Result<()>;
}
