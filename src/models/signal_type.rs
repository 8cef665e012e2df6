//! Kinds of signals a recipient can subscribe a thread to

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    /// Buy alerts from the token monitor
    Buys,
    /// Retransmitted announcements
    Retransmit,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Buys => "buys",
            SignalType::Retransmit => "retransmit",
        }
    }
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buys" => Ok(SignalType::Buys),
            "retransmit" => Ok(SignalType::Retransmit),
            other => Err(format!("unknown signal type: {}", other)),
        }
    }
}
