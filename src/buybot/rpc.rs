//! Minimal Solana JSON-RPC client
//!
//! Speaks JSON-RPC 2.0 over HTTPS directly and implements only the two
//! calls the buy monitor needs: `getSignaturesForAddress` and
//! `getTransaction`. No retries are performed here.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::error::RpcError;

/// Source of signatures and transactions for the monitor
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Most recent signatures touching `address`, newest first
    async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, RpcError>;

    /// Parsed transaction, `None` when the provider does not have it (yet)
    async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionResponse>, RpcError>;
}

/// JSON-RPC request envelope
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// JSON-RPC response envelope
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct RpcResponse<T> {
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Entry of `getSignaturesForAddress`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    /// Transaction-level error; `None` for successful transactions
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub block_time: Option<i64>,
}

impl SignatureInfo {
    pub fn is_failed(&self) -> bool {
        self.err.is_some()
    }
}

/// Result of `getTransaction` with `encoding: "json"`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub slot: u64,
    #[serde(default)]
    pub transaction: TransactionData,
    #[serde(default)]
    pub meta: Option<TransactionMeta>,
    #[serde(default)]
    pub block_time: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    #[serde(default)]
    pub message: MessageData,
    #[serde(default)]
    pub signatures: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageData {
    #[serde(default)]
    pub account_keys: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub recent_blockhash: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    pub program_id_index: usize,
    #[serde(default)]
    pub accounts: Vec<usize>,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub fee: u64,
    /// Lamport balances indexed by account position
    #[serde(default, deserialize_with = "null_as_default")]
    pub pre_balances: Vec<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub post_balances: Vec<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pre_token_balances: Vec<TokenBalance>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub post_token_balances: Vec<TokenBalance>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub log_messages: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub account_index: usize,
    pub mint: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub program_id: String,
    #[serde(default)]
    pub ui_token_amount: UiTokenAmount,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiTokenAmount {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub decimals: u8,
    /// Older nodes report `null` here for zero balances
    #[serde(default)]
    pub ui_amount: Option<f64>,
    #[serde(default)]
    pub ui_amount_string: String,
}

impl UiTokenAmount {
    /// Human-readable amount, falling back to the string form
    pub fn value(&self) -> f64 {
        self.ui_amount
            .or_else(|| self.ui_amount_string.parse().ok())
            .unwrap_or(0.0)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// HTTP JSON-RPC client for a single Solana endpoint
pub struct SolanaRpcClient {
    url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl SolanaRpcClient {
    /// Create a client whose every request is bounded by `timeout`
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Make a JSON-RPC call; `Ok(None)` when the result is `null`
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        debug!(method, id = request.id, "RPC call");

        let response = self.client.post(&self.url).json(&request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(RpcError::Transport(format!("HTTP {}: {}", status, body)));
        }

        let rpc_response: RpcResponse<T> = serde_json::from_str(&body)?;

        if let Some(error) = rpc_response.error {
            return Err(RpcError::Protocol {
                code: Some(error.code),
                message: error.message,
            });
        }

        Ok(rpc_response.result)
    }
}

#[async_trait]
impl ChainRpc for SolanaRpcClient {
    async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, RpcError> {
        let params = json!([address, { "limit": limit }]);

        self.call::<Vec<SignatureInfo>>("getSignaturesForAddress", params)
            .await?
            .ok_or_else(|| RpcError::protocol("getSignaturesForAddress returned no result"))
    }

    async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionResponse>, RpcError> {
        let params = json!([
            signature,
            {
                "encoding": "json",
                "maxSupportedTransactionVersion": 0
            }
        ]);

        self.call("getTransaction", params).await
    }
}
