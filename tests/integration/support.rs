//! Shared fakes for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tempfile::TempDir;

use consul_bot::buybot::rpc::{TokenBalance, TransactionMeta, TransactionResponse, UiTokenAmount};
use consul_bot::buybot::{ChainRpc, SignatureInfo};
use consul_bot::config::StoreConfig;
use consul_bot::error::RpcError;
use consul_bot::notifications::{ChatTransport, OutgoingMessage};
use consul_bot::store::Store;

pub const MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

/// Create a store in a temporary directory
pub async fn create_test_store() -> (Store, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig {
        path: temp_dir.path().join("store.db"),
        max_connections: 2,
    };
    let store = Store::open(&config).await.unwrap();
    (store, temp_dir)
}

pub fn signature(name: &str) -> SignatureInfo {
    SignatureInfo {
        signature: name.to_string(),
        slot: 1,
        err: None,
        memo: None,
        block_time: None,
    }
}

pub fn failed_signature(name: &str) -> SignatureInfo {
    SignatureInfo {
        err: Some(serde_json::json!({"InstructionError": [0, "Custom"]})),
        ..signature(name)
    }
}

/// Transaction in which `buyer` gains `amount` of `MINT`
pub fn buy_transaction(buyer: &str, amount: f64) -> TransactionResponse {
    let post = TokenBalance {
        account_index: 2,
        mint: MINT.to_string(),
        owner: buyer.to_string(),
        program_id: String::new(),
        ui_token_amount: UiTokenAmount {
            amount: String::new(),
            decimals: 6,
            ui_amount: Some(amount),
            ui_amount_string: amount.to_string(),
        },
    };

    TransactionResponse {
        slot: 1,
        block_time: Some(1_700_000_000),
        meta: Some(TransactionMeta {
            fee: 5_000,
            post_token_balances: vec![post],
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Transaction that touches no balances of `MINT`
pub fn plain_transaction() -> TransactionResponse {
    TransactionResponse {
        slot: 1,
        meta: Some(TransactionMeta::default()),
        ..Default::default()
    }
}

/// In-memory chain with a scripted signature list
#[derive(Default)]
pub struct FakeRpc {
    /// Newest first
    signatures: Mutex<Vec<SignatureInfo>>,
    transactions: Mutex<HashMap<String, TransactionResponse>>,
    broken_transactions: Mutex<HashSet<String>>,
    fail_signature_list: Mutex<bool>,
    fetched: Mutex<Vec<String>>,
}

impl FakeRpc {
    pub fn set_signatures(&self, signatures: Vec<SignatureInfo>) {
        *self.signatures.lock() = signatures;
    }

    pub fn add_transaction(&self, signature: &str, tx: TransactionResponse) {
        self.transactions.lock().insert(signature.to_string(), tx);
    }

    pub fn break_transaction(&self, signature: &str) {
        self.broken_transactions.lock().insert(signature.to_string());
    }

    pub fn fail_signature_list(&self, fail: bool) {
        *self.fail_signature_list.lock() = fail;
    }

    /// Signatures passed to `get_transaction`, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().clone()
    }

    pub fn clear_fetched(&self) {
        self.fetched.lock().clear();
    }
}

#[async_trait]
impl ChainRpc for FakeRpc {
    async fn get_signatures_for_address(
        &self,
        _address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, RpcError> {
        if *self.fail_signature_list.lock() {
            return Err(RpcError::Transport("connection refused".to_string()));
        }
        Ok(self.signatures.lock().iter().take(limit).cloned().collect())
    }

    async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionResponse>, RpcError> {
        self.fetched.lock().push(signature.to_string());
        if self.broken_transactions.lock().contains(signature) {
            return Err(RpcError::protocol("invalid transaction payload"));
        }
        Ok(self.transactions.lock().get(signature).cloned())
    }
}

/// Records every message; fails for the listed chats
#[derive(Default)]
pub struct FakeTransport {
    sent: Mutex<Vec<OutgoingMessage>>,
    failing_chats: Mutex<HashSet<i64>>,
}

impl FakeTransport {
    pub fn fail_for(&self, chat_id: i64) {
        self.failing_chats.lock().insert(chat_id);
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn send(&self, message: &OutgoingMessage) -> anyhow::Result<()> {
        if self.failing_chats.lock().contains(&message.chat_id) {
            anyhow::bail!("Telegram API error: 403 Forbidden - bot was kicked");
        }
        self.sent.lock().push(message.clone());
        Ok(())
    }
}
