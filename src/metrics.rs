//! Prometheus metrics for the Consul bot
//!
//! Exposes metrics endpoint for monitoring:
//! - Poll cycle outcomes and RPC failures
//! - Detected buys and notification decisions
//! - Outbound Telegram messages
//! - Key-value store operations

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::Instant;

/// Metrics state
pub struct MetricsState {
    /// Prometheus registry
    registry: Registry,
    /// Process start, for the uptime gauge
    started_at: Instant,
    /// Poll cycles by outcome (idle, new, failed)
    pub poll_cycles: IntCounterVec,
    /// RPC failures by method
    pub rpc_errors: IntCounterVec,
    /// Classified buys
    pub buys_detected: IntCounter,
    /// Buy notification decisions by status (sent, throttled, dropped)
    pub buy_notifications: IntCounterVec,
    /// Telegram messages by status (success, error)
    pub messages_sent: IntCounterVec,
    /// Store operations by operation and status
    pub store_operations: IntCounterVec,
    /// Slot of the newest signature seen by the monitor
    pub last_signature_slot: IntGauge,
    /// Seconds since start
    pub uptime_seconds: IntGauge,
}

fn counter_vec(registry: &Registry, name: &str, help: &str, labels: &[&str]) -> IntCounterVec {
    let counter = IntCounterVec::new(Opts::new(name, help), labels)
        .unwrap_or_else(|e| panic!("Failed to create {}: {}", name, e));
    registry
        .register(Box::new(counter.clone()))
        .unwrap_or_else(|e| panic!("Failed to register {}: {}", name, e));
    counter
}

impl MetricsState {
    /// Create a new metrics state with all metrics registered
    pub fn new() -> Self {
        let registry = Registry::new();

        let poll_cycles = counter_vec(
            &registry,
            "consul_bot_poll_cycles_total",
            "Buy monitor poll cycles by outcome",
            &["outcome"],
        );

        let rpc_errors = counter_vec(
            &registry,
            "consul_bot_rpc_errors_total",
            "Failed JSON-RPC calls by method",
            &["method"],
        );

        let buys_detected = IntCounter::with_opts(Opts::new(
            "consul_bot_buys_detected_total",
            "Transactions classified as buys",
        ))
        .expect("Failed to create buys_detected counter");
        registry
            .register(Box::new(buys_detected.clone()))
            .expect("Failed to register buys_detected");

        let buy_notifications = counter_vec(
            &registry,
            "consul_bot_buy_notifications_total",
            "Buy notification decisions by status",
            &["status"],
        );

        let messages_sent = counter_vec(
            &registry,
            "consul_bot_messages_sent_total",
            "Telegram messages sent by status",
            &["status"],
        );

        let store_operations = counter_vec(
            &registry,
            "consul_bot_store_operations_total",
            "Key-value store operations",
            &["operation", "status"],
        );

        let last_signature_slot = IntGauge::with_opts(Opts::new(
            "consul_bot_last_signature_slot",
            "Slot of the newest signature seen by the buy monitor",
        ))
        .expect("Failed to create last_signature_slot gauge");
        registry
            .register(Box::new(last_signature_slot.clone()))
            .expect("Failed to register last_signature_slot");

        let uptime_seconds = IntGauge::with_opts(Opts::new(
            "consul_bot_uptime_seconds",
            "Service uptime in seconds",
        ))
        .expect("Failed to create uptime_seconds gauge");
        registry
            .register(Box::new(uptime_seconds.clone()))
            .expect("Failed to register uptime_seconds");

        Self {
            registry,
            started_at: Instant::now(),
            poll_cycles,
            rpc_errors,
            buys_detected,
            buy_notifications,
            messages_sent,
            store_operations,
            last_signature_slot,
            uptime_seconds,
        }
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render all metrics in the text exposition format
    pub fn render(&self) -> Result<Vec<u8>, prometheus::Error> {
        self.uptime_seconds
            .set(self.started_at.elapsed().as_secs() as i64);

        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

impl Default for MetricsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics handler - returns Prometheus metrics in text format
///
/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<MetricsState>>) -> impl IntoResponse {
    match state.render() {
        Ok(buffer) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            buffer,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// GET /health
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Create metrics router
pub fn metrics_router(state: Arc<MetricsState>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
