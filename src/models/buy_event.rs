//! Buy event - a transaction classified as a net token purchase

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

/// A detected buy of the watched token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuyEvent {
    /// Transaction signature the buy was found in
    pub signature: String,
    /// Owner of the token account whose balance increased
    pub buyer: String,
    /// Tokens gained (UI units)
    pub amount: f64,
    /// SOL spent net of the transaction fee, never negative
    pub sol_amount: f64,
    /// Block time in Unix seconds, 0 when the provider did not report one
    pub block_time: i64,
    /// Explorer link for the transaction
    pub tx_url: String,
}

impl BuyEvent {
    /// Block time as a UTC timestamp, if known
    pub fn block_time_utc(&self) -> Option<DateTime<Utc>> {
        if self.block_time == 0 {
            return None;
        }
        Utc.timestamp_opt(self.block_time, 0).single()
    }
}
