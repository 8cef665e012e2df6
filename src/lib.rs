//! Consul Bot Library
//!
//! Telegram buy alerts for a single Solana token.
//! This library exposes core modules for the binaries and tests.

pub mod buybot;
pub mod config;
pub mod constants;
pub mod error;
pub mod metrics;
pub mod models;
pub mod notifications;
pub mod store;
pub mod utils;

// Re-export commonly used types for tests
pub use buybot::{BuyMonitor, ChainRpc, Delivery, PollOutcome, SolanaRpcClient};
pub use config::AppConfig;
pub use error::{AppError, AppResult, RpcError};
pub use metrics::MetricsState;
pub use models::{BuyEvent, Recipient, RecipientType, SignalType};
pub use notifications::{ChatTransport, OutgoingMessage, SignalSender, TelegramTransport};
pub use store::Store;
