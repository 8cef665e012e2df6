//! Configuration management for the Consul bot
//!
//! Loads configuration from YAML/TOML files and environment variables.
//! Environment variables override file values.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_PROCESSED_CAPACITY,
    DEFAULT_SIGNATURE_PAGE_SIZE, DEFAULT_THROTTLE_WINDOW_SECS,
};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Metrics/health HTTP server
    #[serde(default)]
    pub server: ServerConfig,
    /// Telegram Bot API settings
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Key-value store location
    #[serde(default)]
    pub store: StoreConfig,
    /// Blockchain JSON-RPC endpoint
    #[serde(default)]
    pub rpc: RpcConfig,
    /// Buy monitor tuning
    #[serde(default)]
    pub buybot: BuyBotConfig,
    /// Project presentation defaults
    #[serde(default)]
    pub project: ProjectConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Telegram Bot API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather
    #[serde(default)]
    pub bot_token: String,
    /// Bot API base URL
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_telegram_timeout")]
    pub request_timeout_ms: u64,
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_telegram_timeout() -> u64 {
    10_000
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_url: default_telegram_api_url(),
            request_timeout_ms: default_telegram_timeout(),
        }
    }
}

/// Key-value store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite file backing the store
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Maximum connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/store.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// RPC endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL (Helius or any Solana RPC); empty disables the buy bot
    #[serde(default)]
    pub url: String,
    /// Client-side timeout in milliseconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_ms: u64,
}

fn default_rpc_timeout() -> u64 {
    30_000
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_ms: default_rpc_timeout(),
        }
    }
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Buy monitor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BuyBotConfig {
    /// Token mint to watch; empty disables the buy bot
    #[serde(default)]
    pub token_address: String,
    /// Seconds between poll cycles
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Signatures requested per poll
    #[serde(default = "default_page_size")]
    pub signature_page_size: usize,
    /// Processed-signature set is cleared once it grows past this
    #[serde(default = "default_processed_capacity")]
    pub processed_capacity: usize,
    /// Cooldown after an emitted notification (seconds)
    #[serde(default = "default_throttle_window")]
    pub throttle_window_secs: u64,
    /// Buffer between the monitor and the signal sender
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_page_size() -> usize {
    DEFAULT_SIGNATURE_PAGE_SIZE
}

fn default_processed_capacity() -> usize {
    DEFAULT_PROCESSED_CAPACITY
}

fn default_throttle_window() -> u64 {
    DEFAULT_THROTTLE_WINDOW_SECS
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

impl Default for BuyBotConfig {
    fn default() -> Self {
        Self {
            token_address: String::new(),
            poll_interval_secs: default_poll_interval(),
            signature_page_size: default_page_size(),
            processed_capacity: default_processed_capacity(),
            throttle_window_secs: default_throttle_window(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Project presentation defaults, overridable per recipient
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
    /// Token ticker shown in alerts
    #[serde(default)]
    pub token_ticker: String,
    /// Dexscreener link for the buy button
    #[serde(default)]
    pub dex_url: String,
    /// Axiom link for the buy button
    #[serde(default)]
    pub axiom_url: String,
    /// Telegram file ids or URLs of animations attached to buy alerts
    #[serde(default)]
    pub animations: Vec<String>,
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (CONSUL_*)
    /// 2. config/config.{yaml,toml,json} (if exists)
    /// 3. config.{yaml,toml,json} (if exists)
    /// 4. Default values
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("store.path", "data/store.db")?
            .set_default("store.max_connections", 5)?
            .set_default("rpc.timeout_ms", 30_000)?
            .set_default("buybot.poll_interval_secs", DEFAULT_POLL_INTERVAL_SECS)?
            .set_default("buybot.signature_page_size", DEFAULT_SIGNATURE_PAGE_SIZE as u64)?
            .set_default("buybot.processed_capacity", DEFAULT_PROCESSED_CAPACITY as u64)?
            .set_default("buybot.throttle_window_secs", DEFAULT_THROTTLE_WINDOW_SECS)?
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config/config").required(false))
            // CONSUL_BUYBOT__TOKEN_ADDRESS=... -> buybot.token_address
            // CONSUL_PROJECT__ANIMATIONS=a,b,c -> project.animations
            .add_source(
                Environment::with_prefix("CONSUL")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("project.animations"),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buybot.poll_interval_secs == 0 {
            return Err(ConfigError::Message(
                "buybot.poll_interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.buybot.signature_page_size == 0 {
            return Err(ConfigError::Message(
                "buybot.signature_page_size must be greater than 0".to_string(),
            ));
        }

        if self.buybot.processed_capacity == 0 {
            return Err(ConfigError::Message(
                "buybot.processed_capacity must be greater than 0".to_string(),
            ));
        }

        if self.buybot.channel_capacity == 0 {
            return Err(ConfigError::Message(
                "buybot.channel_capacity must be greater than 0".to_string(),
            ));
        }

        if !self.buybot.token_address.is_empty()
            && Pubkey::from_str(&self.buybot.token_address).is_err()
        {
            return Err(ConfigError::Message(format!(
                "buybot.token_address is not a valid public key: {}",
                self.buybot.token_address
            )));
        }

        if self.buybot_enabled() && self.telegram.bot_token.is_empty() {
            return Err(ConfigError::Message(
                "Telegram bot token must be set via CONSUL_TELEGRAM__BOT_TOKEN".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether the buy monitor should run at all
    pub fn buybot_enabled(&self) -> bool {
        !self.rpc.url.is_empty() && !self.buybot.token_address.is_empty()
    }
}
