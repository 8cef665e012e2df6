//! Data models for buy alerts and chat recipients

pub mod buy_event;
pub mod recipient;
pub mod signal_type;

pub use buy_event::BuyEvent;
pub use recipient::{Recipient, RecipientType};
pub use signal_type::SignalType;
