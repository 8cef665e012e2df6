//! Metrics Endpoint Tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use std::sync::Arc;
use tower::ServiceExt;

use consul_bot::metrics::{metrics_router, MetricsState};

async fn get(state: Arc<MetricsState>, uri: &str) -> (StatusCode, String) {
    let response = metrics_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let (status, body) = get(Arc::new(MetricsState::new()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_metrics_exposition() {
    let state = Arc::new(MetricsState::new());
    state.poll_cycles.with_label_values(&["new"]).inc();
    state.buys_detected.inc_by(3);
    state.last_signature_slot.set(250_000_000);

    let (status, body) = get(state, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("consul_bot_poll_cycles_total{outcome=\"new\"} 1"));
    assert!(body.contains("consul_bot_buys_detected_total 3"));
    assert!(body.contains("consul_bot_last_signature_slot 250000000"));
    assert!(body.contains("consul_bot_uptime_seconds"));
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _) = get(Arc::new(MetricsState::new()), "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
