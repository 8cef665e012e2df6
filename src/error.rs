//! Error types for the Consul bot

use thiserror::Error;

/// Failures talking to the blockchain JSON-RPC provider.
///
/// No retries happen at the client layer; callers decide what a failure
/// means for the current poll cycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RpcError {
    /// Request could not be sent, timed out, or the HTTP status was not 2xx
    #[error("transport error: {0}")]
    Transport(String),

    /// Malformed body or a JSON-RPC error envelope
    #[error("protocol error{}: {message}", .code.map(|c| format!(" ({})", c)).unwrap_or_default())]
    Protocol { code: Option<i64>, message: String },
}

impl RpcError {
    pub fn protocol(message: impl Into<String>) -> Self {
        RpcError::Protocol {
            code: None,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RpcError::protocol(e.to_string())
        } else {
            RpcError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(e: serde_json::Error) -> Self {
        RpcError::protocol(e.to_string())
    }
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// RPC/Solana error
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
