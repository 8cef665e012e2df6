//! Buy Classifier Tests
//!
//! Tests classification of parsed transactions:
//! - Token balance increase detection
//! - SOL spent net of fee
//! - Provider order as the buyer tie-break
//! - Non-buys (failed, decreased, missing data)

use consul_bot::buybot::rpc::{TokenBalance, TransactionMeta, TransactionResponse, UiTokenAmount};
use consul_bot::buybot::{classify, explorer_url};
use serde_json::json;

const MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

fn balance(index: usize, owner: &str, amount: f64) -> TokenBalance {
    TokenBalance {
        account_index: index,
        mint: MINT.to_string(),
        owner: owner.to_string(),
        program_id: "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA".to_string(),
        ui_token_amount: UiTokenAmount {
            amount: String::new(),
            decimals: 5,
            ui_amount: Some(amount),
            ui_amount_string: amount.to_string(),
        },
    }
}

fn transaction(meta: TransactionMeta) -> TransactionResponse {
    TransactionResponse {
        slot: 250_000_000,
        block_time: Some(1_700_000_000),
        meta: Some(meta),
        ..Default::default()
    }
}

// =============================================================================
// BUY DETECTION
// =============================================================================

#[test]
fn test_alice_buys_fifteen_tokens_for_one_sol() {
    let meta = TransactionMeta {
        fee: 500_000_000,
        pre_balances: vec![100_000_000_000],
        post_balances: vec![98_500_000_000],
        pre_token_balances: vec![balance(4, "Alice", 10.0)],
        post_token_balances: vec![balance(4, "Alice", 25.0)],
        ..Default::default()
    };

    let event = classify(Some(&transaction(meta)), MINT, "sigA").expect("buy");
    assert_eq!(event.buyer, "Alice");
    assert_eq!(event.amount, 15.0);
    assert_eq!(event.sol_amount, 1.0);
    assert_eq!(event.signature, "sigA");
    assert_eq!(event.tx_url, explorer_url("sigA"));
    assert_eq!(event.block_time, 1_700_000_000);
}

#[test]
fn test_missing_block_time_defaults_to_zero() {
    let meta = TransactionMeta {
        post_token_balances: vec![balance(1, "Alice", 3.0)],
        ..Default::default()
    };
    let mut tx = transaction(meta);
    tx.block_time = None;

    let event = classify(Some(&tx), MINT, "sig").expect("buy");
    assert_eq!(event.block_time, 0);
    assert!(event.block_time_utc().is_none());
}

#[test]
fn test_pool_outflow_does_not_hide_buyer() {
    let meta = TransactionMeta {
        pre_token_balances: vec![balance(1, "Pool", 5_000.0), balance(2, "Bob", 1.0)],
        post_token_balances: vec![balance(1, "Pool", 4_000.0), balance(2, "Bob", 1_001.0)],
        ..Default::default()
    };

    let event = classify(Some(&transaction(meta)), MINT, "sig").expect("buy");
    assert_eq!(event.buyer, "Bob");
    assert_eq!(event.amount, 1_000.0);
}

#[test]
fn test_first_in_post_order_wins() {
    let meta = TransactionMeta {
        post_token_balances: vec![balance(7, "Carol", 2.0), balance(3, "Dave", 50.0)],
        ..Default::default()
    };

    let event = classify(Some(&transaction(meta)), MINT, "sig").expect("buy");
    assert_eq!(event.buyer, "Carol");
    assert_eq!(event.amount, 2.0);
}

#[test]
fn test_ui_amount_string_used_when_number_missing() {
    let mut post = balance(1, "Erin", 0.0);
    post.ui_token_amount.ui_amount = None;
    post.ui_token_amount.ui_amount_string = "42.5".to_string();

    let meta = TransactionMeta {
        post_token_balances: vec![post],
        ..Default::default()
    };

    let event = classify(Some(&transaction(meta)), MINT, "sig").expect("buy");
    assert_eq!(event.amount, 42.5);
}

// =============================================================================
// NOT A BUY
// =============================================================================

#[test]
fn test_failed_transaction_never_classified() {
    let meta = TransactionMeta {
        err: Some(json!({"InstructionError": [2, {"Custom": 6001}]})),
        pre_token_balances: vec![balance(4, "Alice", 10.0)],
        post_token_balances: vec![balance(4, "Alice", 25.0)],
        ..Default::default()
    };
    assert!(classify(Some(&transaction(meta)), MINT, "sig").is_none());
}

#[test]
fn test_sell_is_not_buy() {
    let meta = TransactionMeta {
        pre_token_balances: vec![balance(4, "Alice", 25.0)],
        post_token_balances: vec![balance(4, "Alice", 10.0)],
        ..Default::default()
    };
    assert!(classify(Some(&transaction(meta)), MINT, "sig").is_none());
}

#[test]
fn test_unchanged_balance_is_not_buy() {
    let meta = TransactionMeta {
        pre_token_balances: vec![balance(4, "Alice", 25.0)],
        post_token_balances: vec![balance(4, "Alice", 25.0)],
        ..Default::default()
    };
    assert!(classify(Some(&transaction(meta)), MINT, "sig").is_none());
}

#[test]
fn test_empty_owner_is_not_buy() {
    let meta = TransactionMeta {
        post_token_balances: vec![balance(4, "", 25.0)],
        ..Default::default()
    };
    assert!(classify(Some(&transaction(meta)), MINT, "sig").is_none());
}

#[test]
fn test_missing_transaction() {
    assert!(classify(None, MINT, "sig").is_none());
    assert!(classify(Some(&TransactionResponse::default()), MINT, "sig").is_none());
}

// =============================================================================
// SOL SPENT
// =============================================================================

#[test]
fn test_sol_spent_zero_without_balances() {
    let meta = TransactionMeta {
        fee: 5_000,
        post_token_balances: vec![balance(4, "Alice", 1.0)],
        ..Default::default()
    };
    let event = classify(Some(&transaction(meta)), MINT, "sig").expect("buy");
    assert_eq!(event.sol_amount, 0.0);
}

#[test]
fn test_sol_spent_never_negative() {
    let meta = TransactionMeta {
        fee: 5_000,
        pre_balances: vec![1_000_000_000],
        post_balances: vec![1_500_000_000],
        post_token_balances: vec![balance(4, "Alice", 1.0)],
        ..Default::default()
    };
    let event = classify(Some(&transaction(meta)), MINT, "sig").expect("buy");
    assert_eq!(event.sol_amount, 0.0);
}
