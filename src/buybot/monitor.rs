//! Buy monitor polling loop
//!
//! Polls the watched mint's recent signatures on a fixed interval, resolves
//! every signature newer than the frontier to a transaction, classifies it
//! and forwards the single largest buy of the cycle to the signal sender,
//! subject to the notification throttle.
//!
//! Cycles are sequential: the next tick is not awaited until the current
//! cycle has finished, and ticks missed meanwhile are skipped.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use super::classifier::classify;
use super::dedup::ProcessedSignatures;
use super::rpc::{ChainRpc, SignatureInfo};
use super::throttle::NotificationThrottle;
use crate::config::BuyBotConfig;
use crate::error::RpcError;
use crate::metrics::MetricsState;
use crate::models::BuyEvent;

/// What happened to the cycle's largest buy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Throttled,
    /// Sender channel full or closed
    Dropped,
}

impl Delivery {
    pub fn as_str(&self) -> &'static str {
        match self {
            Delivery::Sent => "sent",
            Delivery::Throttled => "throttled",
            Delivery::Dropped => "dropped",
        }
    }
}

/// Summary of one poll cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollOutcome {
    /// Signatures returned by the provider
    pub fetched: usize,
    /// Signatures newer than the frontier, oldest first
    pub new_signatures: Vec<String>,
    /// Transactions classified as buys
    pub buys: usize,
    /// Largest buy of the cycle and its fate
    pub selected: Option<(BuyEvent, Delivery)>,
}

pub struct BuyMonitor {
    rpc: Arc<dyn ChainRpc>,
    token_address: String,
    page_size: usize,
    poll_interval: Duration,
    last_signature: RwLock<Option<String>>,
    processed: ProcessedSignatures,
    throttle: NotificationThrottle,
    events: mpsc::Sender<BuyEvent>,
    metrics: Option<Arc<MetricsState>>,
}

impl BuyMonitor {
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        config: &BuyBotConfig,
        events: mpsc::Sender<BuyEvent>,
    ) -> Self {
        Self {
            rpc,
            token_address: config.token_address.clone(),
            page_size: config.signature_page_size,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            last_signature: RwLock::new(None),
            processed: ProcessedSignatures::new(config.processed_capacity),
            throttle: NotificationThrottle::new(Duration::from_secs(config.throttle_window_secs)),
            events,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsState>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn last_signature(&self) -> Option<String> {
        self.last_signature.read().clone()
    }

    pub fn processed_len(&self) -> usize {
        self.processed.len()
    }

    pub fn throttle(&self) -> &NotificationThrottle {
        &self.throttle
    }

    /// Set the frontier to the newest existing signature without classifying it
    pub async fn seed(&self) -> Result<Option<String>, RpcError> {
        let newest = self
            .rpc
            .get_signatures_for_address(&self.token_address, 1)
            .await
            .inspect_err(|_| self.record_rpc_error("getSignaturesForAddress"))?;

        let Some(first) = newest.into_iter().next() else {
            tracing::info!(token = %self.token_address, "No existing signatures, starting from empty frontier");
            return Ok(None);
        };

        tracing::info!(
            token = %self.token_address,
            signature = %first.signature,
            slot = first.slot,
            "Seeded signature frontier"
        );
        if let Some(metrics) = &self.metrics {
            metrics.last_signature_slot.set(first.slot as i64);
        }
        *self.last_signature.write() = Some(first.signature.clone());
        Ok(Some(first.signature))
    }

    /// Run one poll cycle to completion
    ///
    /// Only the signature list fetch can fail the cycle. Per-transaction
    /// failures are logged and the signature is marked processed.
    pub async fn poll_once(&self) -> Result<PollOutcome, RpcError> {
        let fetched = self
            .rpc
            .get_signatures_for_address(&self.token_address, self.page_size)
            .await
            .inspect_err(|_| self.record_rpc_error("getSignaturesForAddress"))?;

        let mut outcome = PollOutcome {
            fetched: fetched.len(),
            ..Default::default()
        };

        let Some(newest) = fetched.first() else {
            return Ok(outcome);
        };

        let last = self.last_signature();
        let mut new_signatures = collect_new_signatures(&fetched, last.as_deref());
        if new_signatures.is_empty() {
            return Ok(outcome);
        }

        *self.last_signature.write() = Some(newest.signature.clone());
        if let Some(metrics) = &self.metrics {
            metrics.last_signature_slot.set(newest.slot as i64);
        }

        new_signatures.reverse();
        tracing::debug!(count = new_signatures.len(), "Processing new signatures");

        let mut buys = Vec::new();
        for info in &new_signatures {
            outcome.new_signatures.push(info.signature.clone());

            if self.processed.contains(&info.signature) {
                continue;
            }
            if info.is_failed() {
                self.processed.mark(&info.signature);
                continue;
            }

            match self.rpc.get_transaction(&info.signature).await {
                Ok(tx) => {
                    if let Some(event) = classify(tx.as_ref(), &self.token_address, &info.signature) {
                        tracing::info!(
                            signature = %event.signature,
                            buyer = %event.buyer,
                            amount = event.amount,
                            sol = event.sol_amount,
                            "Buy detected"
                        );
                        buys.push(event);
                    }
                }
                Err(e) => {
                    self.record_rpc_error("getTransaction");
                    tracing::warn!(signature = %info.signature, error = %e, "Failed to fetch transaction");
                }
            }
            self.processed.mark(&info.signature);
        }

        outcome.buys = buys.len();
        if let Some(metrics) = &self.metrics {
            metrics.buys_detected.inc_by(buys.len() as u64);
        }

        if let Some(largest) = select_largest(buys) {
            let delivery = self.deliver(&largest);
            if let Some(metrics) = &self.metrics {
                metrics
                    .buy_notifications
                    .with_label_values(&[delivery.as_str()])
                    .inc();
            }
            outcome.selected = Some((largest, delivery));
        }

        let dropped = self.processed.enforce_capacity();
        if dropped > 0 {
            tracing::info!(dropped, "Processed signature set reset");
        }

        Ok(outcome)
    }

    /// Gate `event` through the throttle and hand it to the sender
    fn deliver(&self, event: &BuyEvent) -> Delivery {
        if !self.throttle.should_emit(event.amount) {
            tracing::debug!(amount = event.amount, "Buy notification throttled");
            return Delivery::Throttled;
        }

        match self.events.try_send(event.clone()) {
            Ok(()) => {
                self.throttle.record_emission(event.amount);
                Delivery::Sent
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(signature = %event.signature, "Signal sender busy, dropping buy notification");
                Delivery::Dropped
            }
            Err(TrySendError::Closed(_)) => {
                tracing::error!(signature = %event.signature, "Signal sender gone, dropping buy notification");
                Delivery::Dropped
            }
        }
    }

    fn record_rpc_error(&self, method: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.rpc_errors.with_label_values(&[method]).inc();
        }
    }

    /// Seed the frontier, then poll until cancelled
    ///
    /// A failed seed is retried on the following ticks; no cycle runs
    /// before the frontier is seeded.
    pub async fn run(self: Arc<Self>, cancel_token: CancellationToken) {
        tracing::info!(
            token = %self.token_address,
            interval_secs = self.poll_interval.as_secs(),
            page_size = self.page_size,
            "Starting buy monitor"
        );

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut seeded = false;

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    tracing::info!("Buy monitor shutting down");
                    break;
                }
                _ = interval.tick() => {
                    if !seeded {
                        match self.seed().await {
                            Ok(_) => seeded = true,
                            Err(e) => tracing::error!(error = %e, "Failed to seed signature frontier"),
                        }
                        continue;
                    }

                    let label = match self.poll_once().await {
                        Ok(outcome) if outcome.new_signatures.is_empty() => "idle",
                        Ok(outcome) => {
                            tracing::debug!(
                                new = outcome.new_signatures.len(),
                                buys = outcome.buys,
                                "Poll cycle complete"
                            );
                            "new"
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Poll cycle failed");
                            "failed"
                        }
                    };
                    if let Some(metrics) = &self.metrics {
                        metrics.poll_cycles.with_label_values(&[label]).inc();
                    }
                }
            }
        }
    }
}

/// Signatures strictly newer than `last`, newest first
///
/// When `last` is absent from `fetched` every fetched signature is new.
pub fn collect_new_signatures<'a>(
    fetched: &'a [SignatureInfo],
    last: Option<&str>,
) -> Vec<&'a SignatureInfo> {
    fetched
        .iter()
        .take_while(|info| Some(info.signature.as_str()) != last)
        .collect()
}

/// Buy with the largest token amount; the earliest wins ties
pub fn select_largest(buys: Vec<BuyEvent>) -> Option<BuyEvent> {
    buys.into_iter().fold(None, |best, event| match best {
        Some(b) if event.amount <= b.amount => Some(b),
        _ => Some(event),
    })
}
