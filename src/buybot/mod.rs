//! Buy monitor for the watched token
//!
//! - `rpc`: JSON-RPC client for the two calls the monitor makes
//! - `classifier`: turns a transaction into a `BuyEvent`, or nothing
//! - `dedup` / `throttle`: monitor state guarded by independent locks
//! - `monitor`: the polling loop

pub mod classifier;
pub mod dedup;
pub mod monitor;
pub mod rpc;
pub mod throttle;

pub use classifier::{classify, explorer_url};
pub use dedup::ProcessedSignatures;
pub use monitor::{collect_new_signatures, select_largest, BuyMonitor, Delivery, PollOutcome};
pub use rpc::{ChainRpc, SignatureInfo, SolanaRpcClient, TransactionMeta, TransactionResponse};
pub use throttle::NotificationThrottle;
