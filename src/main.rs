//! Consul Bot - Telegram buy alerts for a Solana token
//!
//! This is the main entry point for the bot service.
//! It serves metrics over Axum and runs the buy monitor in the background.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use consul_bot::buybot::{BuyMonitor, SolanaRpcClient};
use consul_bot::config::AppConfig;
use consul_bot::metrics::{metrics_router, MetricsState};
use consul_bot::notifications::{SignalSender, TelegramTransport};
use consul_bot::store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    tracing::info!("Starting Consul Bot v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        buybot_enabled = config.buybot_enabled(),
        "Configuration loaded"
    );

    let metrics = Arc::new(MetricsState::new());

    // Open key-value store
    let store = Store::open(&config.store)
        .await?
        .with_metrics(metrics.clone());
    tracing::info!(path = %config.store.path.display(), "Store opened");

    let cancel_token = CancellationToken::new();
    let mut tasks: Vec<JoinHandle<()>> = Vec::new();

    // Metrics server
    let app = metrics_router(metrics.clone()).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Metrics server listening");

    let server_cancel = cancel_token.clone();
    tasks.push(tokio::spawn(async move {
        let shutdown = async move { server_cancel.cancelled().await };
        if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
            tracing::error!(error = %e, "Metrics server failed");
        }
    }));

    // Buy monitor and signal sender
    if config.buybot_enabled() {
        let rpc = Arc::new(SolanaRpcClient::new(config.rpc.url.clone(), config.rpc.timeout())?);
        let (events_tx, events_rx) = mpsc::channel(config.buybot.channel_capacity);

        let monitor = Arc::new(
            BuyMonitor::new(rpc, &config.buybot, events_tx).with_metrics(metrics.clone()),
        );

        let transport = Arc::new(TelegramTransport::new(&config.telegram)?);
        let sender = Arc::new(
            SignalSender::new(store.clone(), transport, config.project.clone())
                .with_metrics(metrics.clone()),
        );

        tasks.push(tokio::spawn(sender.run(events_rx, cancel_token.clone())));
        tasks.push(tokio::spawn(monitor.run(cancel_token.clone())));
        tracing::info!(token = %config.buybot.token_address, "Buy bot started");
    } else {
        tracing::info!("Buy bot disabled: rpc.url or buybot.token_address not set");
    }

    wait_for_shutdown().await;
    tracing::info!("Shutdown requested");
    cancel_token.cancel();

    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Task panicked during shutdown");
        }
    }

    store.close().await;
    tracing::info!("Consul Bot stopped");

    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on Unix
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "consul_bot=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Load and validate configuration
fn load_config() -> anyhow::Result<AppConfig> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    Ok(config)
}
