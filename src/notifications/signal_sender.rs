//! Buy alert fan-out
//!
//! Consumes buy events from the monitor and delivers one alert to every
//! recipient that is receiving and subscribed to the buys thread.

use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{ChatTransport, InlineButton, OutgoingMessage};
use crate::config::ProjectConfig;
use crate::error::AppResult;
use crate::metrics::MetricsState;
use crate::models::recipient::with_fallback;
use crate::models::{BuyEvent, Recipient, SignalType};
use crate::store::Store;
use crate::utils::{escape_html, format_number, shorten_address};

const DEFAULT_TICKER: &str = "TOKEN";

pub struct SignalSender {
    store: Store,
    transport: Arc<dyn ChatTransport>,
    project: ProjectConfig,
    metrics: Option<Arc<MetricsState>>,
}

impl SignalSender {
    pub fn new(store: Store, transport: Arc<dyn ChatTransport>, project: ProjectConfig) -> Self {
        Self {
            store,
            transport,
            project,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsState>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Deliver events from `rx` until it closes or `cancel_token` fires
    pub async fn run(self: Arc<Self>, mut rx: mpsc::Receiver<BuyEvent>, cancel_token: CancellationToken) {
        tracing::info!("Starting signal sender");

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    tracing::info!("Signal sender shutting down");
                    break;
                }
                event = rx.recv() => {
                    let Some(event) = event else {
                        tracing::info!("Buy event channel closed");
                        break;
                    };
                    match self.send_buy_signal(&event).await {
                        Ok(delivered) => tracing::info!(
                            signature = %event.signature,
                            delivered,
                            "Buy signal sent"
                        ),
                        Err(e) => tracing::error!(
                            signature = %event.signature,
                            error = %e,
                            "Failed to send buy signal"
                        ),
                    }
                }
            }
        }
    }

    /// Send `event` to every subscribed recipient
    ///
    /// Every chat gets the same animation. Returns the number of chats the
    /// alert reached. A failed chat is logged and skipped.
    pub async fn send_buy_signal(&self, event: &BuyEvent) -> AppResult<usize> {
        let recipients = Recipient::find_all(&self.store).await?;
        let animation = self.pick_animation();
        let mut delivered = 0;

        for recipient in recipients {
            let thread_id = recipient.thread_id_for(SignalType::Buys);
            if !recipient.is_receiving() || thread_id == 0 {
                continue;
            }

            let message = self.build_message(&recipient, thread_id, event, animation.clone());
            match self.transport.send(&message).await {
                Ok(()) => {
                    delivered += 1;
                    self.record_message("success");
                }
                Err(e) => {
                    self.record_message("error");
                    tracing::warn!(
                        chat_id = recipient.id,
                        thread_id,
                        error = %e,
                        "Failed to deliver buy signal"
                    );
                }
            }
        }

        Ok(delivered)
    }

    fn build_message(
        &self,
        recipient: &Recipient,
        thread_id: i32,
        event: &BuyEvent,
        animation: Option<String>,
    ) -> OutgoingMessage {
        let ticker = with_fallback(
            &recipient.token_ticker,
            with_fallback(&self.project.token_ticker, DEFAULT_TICKER),
        );
        let dex_url = with_fallback(&recipient.dex_url, &self.project.dex_url);
        let axiom_url = with_fallback(&recipient.axiom_url, &self.project.axiom_url);

        OutgoingMessage {
            chat_id: recipient.id,
            thread_id,
            text: format_buy_message(event, ticker),
            animation,
            buttons: buy_buttons(dex_url, axiom_url),
        }
    }

    fn pick_animation(&self) -> Option<String> {
        self.project
            .animations
            .choose(&mut rand::thread_rng())
            .cloned()
    }

    fn record_message(&self, status: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.messages_sent.with_label_values(&[status]).inc();
        }
    }
}

/// HTML caption of a buy alert
pub fn format_buy_message(event: &BuyEvent, ticker: &str) -> String {
    let ticker = escape_html(ticker);
    format!(
        "<b>${ticker} BUY 🥬🥦🌿🌵🌳☘️</b>\n\n\
         <b>💰 Amount:</b> {amount}\n\
         <b>🦊 Buyer:</b> {buyer}\n\
         <b>🔎 Transaction:</b> <a href=\"{url}\">{signature}</a>",
        ticker = ticker,
        amount = format_number(event.amount, &ticker),
        buyer = escape_html(&shorten_address(&event.buyer)),
        url = escape_html(&event.tx_url),
        signature = escape_html(&shorten_address(&event.signature)),
    )
}

fn buy_buttons(dex_url: &str, axiom_url: &str) -> Vec<InlineButton> {
    let mut buttons = Vec::new();
    if !dex_url.is_empty() {
        buttons.push(InlineButton::new("Buy on Dexscreener", dex_url));
    }
    if !axiom_url.is_empty() {
        buttons.push(InlineButton::new("Buy on Axiom", axiom_url));
    }
    buttons
}
