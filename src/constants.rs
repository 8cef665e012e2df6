/// Lamports per SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Explorer transaction link prefix; the signature is appended
pub const EXPLORER_TX_URL: &str = "https://solscan.io/tx/";

/// Seconds between monitor poll cycles
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Signatures requested per poll cycle
pub const DEFAULT_SIGNATURE_PAGE_SIZE: usize = 10;

/// Processed-signature set is cleared once it holds more than this
pub const DEFAULT_PROCESSED_CAPACITY: usize = 1000;

/// Cooldown after an emitted buy notification
pub const DEFAULT_THROTTLE_WINDOW_SECS: u64 = 60;

/// Buffered buy events between monitor and signal sender
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Store key prefix for recipients
pub const RECIPIENT_KEY_PREFIX: &str = "recipient:";
