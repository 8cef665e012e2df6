//! Chat recipients of bot signals, persisted in the key-value store

use serde::{Deserialize, Serialize};

use super::SignalType;
use crate::constants::RECIPIENT_KEY_PREFIX;
use crate::error::AppResult;
use crate::store::Store;

/// Telegram chat kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    Private,
    Group,
    Supergroup,
    Channel,
}

/// A chat that receives signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    /// Telegram chat id
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: RecipientType,
    /// Default forum thread for general messages (0 = none)
    #[serde(default)]
    pub thread_id: i32,
    /// Forum thread that receives buy alerts (0 = not subscribed)
    #[serde(default)]
    pub buys_thread_id: i32,
    #[serde(default = "default_receiving")]
    pub receiving: bool,
    /// Per-chat overrides of the project defaults
    #[serde(default)]
    pub token_ticker: String,
    #[serde(default)]
    pub dex_url: String,
    #[serde(default)]
    pub axiom_url: String,
}

fn default_receiving() -> bool {
    true
}

/// `value` unless it is empty
pub fn with_fallback<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

impl Recipient {
    pub fn new(id: i64, kind: RecipientType, thread_id: i32) -> Self {
        Self {
            id,
            kind,
            thread_id,
            buys_thread_id: 0,
            receiving: true,
            token_ticker: String::new(),
            dex_url: String::new(),
            axiom_url: String::new(),
        }
    }

    pub fn key(id: i64) -> String {
        format!("{}{}", RECIPIENT_KEY_PREFIX, id)
    }

    pub fn enable_receiving(&mut self) {
        self.receiving = true;
    }

    pub fn disable_receiving(&mut self) {
        self.receiving = false;
    }

    pub fn is_receiving(&self) -> bool {
        self.receiving
    }

    /// Thread that `signal_type` is delivered to, 0 when the chat is not subscribed
    pub fn thread_id_for(&self, signal_type: SignalType) -> i32 {
        match signal_type {
            SignalType::Buys => self.buys_thread_id,
            SignalType::Retransmit => self.thread_id,
        }
    }

    pub fn define_thread_id_for(&mut self, signal_type: SignalType, thread_id: i32) {
        match signal_type {
            SignalType::Buys => self.buys_thread_id = thread_id,
            SignalType::Retransmit => self.thread_id = thread_id,
        }
    }

    pub async fn save(&self, store: &Store) -> AppResult<()> {
        store.put_json(&Self::key(self.id), self).await
    }

    pub async fn delete(&self, store: &Store) -> AppResult<()> {
        store.delete(&Self::key(self.id)).await
    }

    pub async fn find(store: &Store, id: i64) -> AppResult<Option<Self>> {
        store.get_json(&Self::key(id)).await
    }

    /// Every stored recipient in key order. Entries that fail to decode are skipped.
    pub async fn find_all(store: &Store) -> AppResult<Vec<Self>> {
        let entries = store.scan_prefix(RECIPIENT_KEY_PREFIX).await?;

        let recipients = entries
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_slice::<Recipient>(&value) {
                Ok(recipient) => Some(recipient),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Skipping undecodable recipient");
                    None
                }
            })
            .collect();

        Ok(recipients)
    }

    /// Register a chat, or update the kind of an already known one
    pub async fn upsert(
        store: &Store,
        id: i64,
        kind: RecipientType,
        thread_id: i32,
    ) -> AppResult<Self> {
        let recipient = match Self::find(store, id).await? {
            Some(mut existing) => {
                existing.kind = kind;
                existing
            }
            None => Self::new(id, kind, thread_id),
        };
        recipient.save(store).await?;
        Ok(recipient)
    }
}
