//! Signal Sender Tests
//!
//! Tests buy alert fan-out:
//! - Recipient filtering (receiving, buys thread)
//! - Per-chat failures do not stop delivery
//! - Project defaults and per-chat overrides
//! - Channel-driven run loop

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use consul_bot::config::ProjectConfig;
use consul_bot::models::{BuyEvent, Recipient, RecipientType};
use consul_bot::notifications::{InlineButton, SignalSender};
use consul_bot::store::Store;

use crate::support::{create_test_store, FakeTransport};

fn event(amount: f64) -> BuyEvent {
    BuyEvent {
        signature: "4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi".to_string(),
        buyer: "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU".to_string(),
        amount,
        sol_amount: 0.25,
        block_time: 1_700_000_000,
        tx_url: "https://solscan.io/tx/4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi".to_string(),
    }
}

fn project() -> ProjectConfig {
    ProjectConfig {
        token_ticker: "PEPE".to_string(),
        dex_url: "https://dexscreener.com/solana/pepe".to_string(),
        axiom_url: "https://axiom.trade/t/pepe".to_string(),
        animations: vec!["CgACAgQAAxkBAAIB".to_string()],
    }
}

async fn subscribe(store: &Store, id: i64, buys_thread_id: i32, receiving: bool) -> Recipient {
    let mut recipient = Recipient::new(id, RecipientType::Supergroup, 0);
    recipient.buys_thread_id = buys_thread_id;
    recipient.receiving = receiving;
    recipient.save(store).await.unwrap();
    recipient
}

#[tokio::test]
async fn test_only_subscribed_receiving_chats() {
    let (store, _dir) = create_test_store().await;
    subscribe(&store, 1, 5, true).await;
    subscribe(&store, 2, 6, false).await;
    subscribe(&store, 3, 0, true).await;

    let transport = Arc::new(FakeTransport::default());
    let sender = SignalSender::new(store, transport.clone(), project());

    let delivered = sender.send_buy_signal(&event(1_200.0)).await.unwrap();

    assert_eq!(delivered, 1);
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat_id, 1);
    assert_eq!(sent[0].thread_id, 5);
}

#[tokio::test]
async fn test_failure_for_one_chat_continues() {
    let (store, _dir) = create_test_store().await;
    subscribe(&store, 1, 5, true).await;
    subscribe(&store, 2, 6, true).await;
    subscribe(&store, 3, 7, true).await;

    let transport = Arc::new(FakeTransport::default());
    transport.fail_for(2);
    let sender = SignalSender::new(store, transport.clone(), project());

    let delivered = sender.send_buy_signal(&event(10.0)).await.unwrap();

    assert_eq!(delivered, 2);
    let chats: Vec<i64> = transport.sent().iter().map(|m| m.chat_id).collect();
    assert_eq!(chats, vec![1, 3]);
}

#[tokio::test]
async fn test_message_content_with_project_defaults() {
    let (store, _dir) = create_test_store().await;
    subscribe(&store, 1, 5, true).await;

    let transport = Arc::new(FakeTransport::default());
    let sender = SignalSender::new(store, transport.clone(), project());
    sender.send_buy_signal(&event(1_200.0)).await.unwrap();

    let message = &transport.sent()[0];
    assert!(message.text.starts_with("<b>$PEPE BUY"));
    assert!(message.text.contains("<b>💰 Amount:</b> 1.2K PEPE"));
    assert!(message.text.contains("<b>🦊 Buyer:</b> 7xKXtg...gAsU"));
    assert!(message.text.contains(">4vJ9JU...kLKi</a>"));
    assert_eq!(message.animation.as_deref(), Some("CgACAgQAAxkBAAIB"));
    assert_eq!(
        message.buttons,
        vec![
            InlineButton::new("Buy on Dexscreener", "https://dexscreener.com/solana/pepe"),
            InlineButton::new("Buy on Axiom", "https://axiom.trade/t/pepe"),
        ]
    );
}

#[tokio::test]
async fn test_one_animation_per_event() {
    let (store, _dir) = create_test_store().await;
    for id in 1..=4 {
        subscribe(&store, id, 5, true).await;
    }

    let transport = Arc::new(FakeTransport::default());
    let project = ProjectConfig {
        animations: (0..10).map(|i| format!("animation-{}", i)).collect(),
        ..project()
    };
    let sender = SignalSender::new(store, transport.clone(), project);

    for round in 0..5 {
        sender.send_buy_signal(&event(10.0)).await.unwrap();

        let sent = transport.sent();
        let batch = &sent[round * 4..];
        assert_eq!(batch.len(), 4);
        assert!(batch[0].animation.is_some());
        assert!(batch.iter().all(|m| m.animation == batch[0].animation));
    }
}

#[tokio::test]
async fn test_recipient_overrides_and_fallbacks() {
    let (store, _dir) = create_test_store().await;
    let mut recipient = subscribe(&store, 1, 5, true).await;
    recipient.token_ticker = "WIF".to_string();
    recipient.dex_url = "https://dexscreener.com/solana/wif".to_string();
    recipient.save(&store).await.unwrap();

    let transport = Arc::new(FakeTransport::default());
    let sender = SignalSender::new(store, transport.clone(), ProjectConfig::default());
    sender.send_buy_signal(&event(3.0)).await.unwrap();

    let message = &transport.sent()[0];
    assert!(message.text.contains("$WIF BUY"));
    assert!(message.text.contains("3.00 WIF"));
    assert!(message.animation.is_none());
    assert_eq!(
        message.buttons,
        vec![InlineButton::new(
            "Buy on Dexscreener",
            "https://dexscreener.com/solana/wif"
        )]
    );
}

#[tokio::test]
async fn test_default_ticker() {
    let (store, _dir) = create_test_store().await;
    subscribe(&store, 1, 5, true).await;

    let transport = Arc::new(FakeTransport::default());
    let sender = SignalSender::new(store, transport.clone(), ProjectConfig::default());
    sender.send_buy_signal(&event(3.0)).await.unwrap();

    assert!(transport.sent()[0].text.contains("$TOKEN BUY"));
}

#[tokio::test]
async fn test_no_recipients() {
    let (store, _dir) = create_test_store().await;
    let transport = Arc::new(FakeTransport::default());
    let sender = SignalSender::new(store, transport.clone(), project());

    assert_eq!(sender.send_buy_signal(&event(1.0)).await.unwrap(), 0);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_run_drains_channel_until_closed() {
    let (store, _dir) = create_test_store().await;
    subscribe(&store, 1, 5, true).await;

    let transport = Arc::new(FakeTransport::default());
    let sender = Arc::new(SignalSender::new(store, transport.clone(), project()));

    let (tx, rx) = mpsc::channel(4);
    tx.send(event(1.0)).await.unwrap();
    tx.send(event(2.0)).await.unwrap();
    drop(tx);

    sender.run(rx, CancellationToken::new()).await;

    assert_eq!(transport.sent().len(), 2);
}

#[tokio::test]
async fn test_run_stops_on_cancel() {
    let (store, _dir) = create_test_store().await;
    let transport = Arc::new(FakeTransport::default());
    let sender = Arc::new(SignalSender::new(store, transport, project()));

    let (_tx, rx) = mpsc::channel::<BuyEvent>(4);
    let cancel = CancellationToken::new();
    cancel.cancel();

    sender.run(rx, cancel).await;
}
