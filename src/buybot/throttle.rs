//! Cooldown gate for buy notifications
//!
//! After an emission, further candidates are suppressed for `window`
//! unless they are strictly larger than the last emitted amount. The
//! window is measured from the last emission, so suppressed candidates
//! never extend it.

use parking_lot::RwLock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct LastEmission {
    at: Instant,
    amount: f64,
}

pub struct NotificationThrottle {
    last: RwLock<Option<LastEmission>>,
    window: Duration,
}

impl NotificationThrottle {
    pub fn new(window: Duration) -> Self {
        Self {
            last: RwLock::new(None),
            window,
        }
    }

    pub fn should_emit(&self, amount: f64) -> bool {
        self.should_emit_at(amount, Instant::now())
    }

    /// Decision for a candidate of `amount` observed at `now`
    pub fn should_emit_at(&self, amount: f64, now: Instant) -> bool {
        let Some(last) = *self.last.read() else {
            return true;
        };

        if now.saturating_duration_since(last.at) < self.window {
            if amount > last.amount {
                tracing::info!(
                    amount,
                    last_amount = last.amount,
                    "Larger buy interrupts cooldown"
                );
                return true;
            }
            return false;
        }

        true
    }

    pub fn record_emission(&self, amount: f64) {
        self.record_emission_at(amount, Instant::now());
    }

    /// Time and amount are replaced together under one write lock
    pub fn record_emission_at(&self, amount: f64, at: Instant) {
        *self.last.write() = Some(LastEmission { at, amount });
    }

    /// Amount of the last emission, if any
    pub fn last_amount(&self) -> Option<f64> {
        self.last.read().map(|l| l.amount)
    }
}
