//! Buy classification from token balance deltas
//!
//! A transaction is a buy of the watched mint when some account's
//! post-transaction balance of that mint exceeds its pre-transaction
//! balance. The first such account in the provider's `postTokenBalances`
//! order is reported; multiple buyers in one transaction are not
//! disambiguated.

use crate::constants::EXPLORER_TX_URL;
use crate::models::BuyEvent;
use crate::utils::lamports_to_sol;

use super::rpc::{TransactionMeta, TransactionResponse};

/// Classify `tx` as a buy of `token_mint`, or `None` if it is not one
pub fn classify(
    tx: Option<&TransactionResponse>,
    token_mint: &str,
    signature: &str,
) -> Option<BuyEvent> {
    let tx = tx?;
    let meta = tx.meta.as_ref()?;
    if meta.err.is_some() {
        return None;
    }

    let (buyer, amount) = find_buyer(meta, token_mint)?;
    if amount == 0.0 || buyer.is_empty() {
        return None;
    }

    Some(BuyEvent {
        signature: signature.to_string(),
        buyer,
        amount,
        sol_amount: sol_spent(meta),
        block_time: tx.block_time.unwrap_or(0),
        tx_url: explorer_url(signature),
    })
}

/// First account whose balance of `token_mint` increased, with the gain
fn find_buyer(meta: &TransactionMeta, token_mint: &str) -> Option<(String, f64)> {
    for post in meta.post_token_balances.iter().filter(|b| b.mint == token_mint) {
        // A missing pre entry means the token account was created in this transaction
        let pre_amount = meta
            .pre_token_balances
            .iter()
            .find(|pre| pre.account_index == post.account_index)
            .map(|pre| pre.ui_token_amount.value())
            .unwrap_or(0.0);

        let post_amount = post.ui_token_amount.value();

        if post_amount > pre_amount {
            return Some((post.owner.clone(), post_amount - pre_amount));
        }
    }

    None
}

/// SOL leaving the fee payer (account 0) minus the fee, floored at zero
fn sol_spent(meta: &TransactionMeta) -> f64 {
    let (Some(&pre), Some(&post)) = (meta.pre_balances.first(), meta.post_balances.first()) else {
        return 0.0;
    };

    let spent = lamports_to_sol(pre) - lamports_to_sol(post) - lamports_to_sol(meta.fee);
    spent.max(0.0)
}

pub fn explorer_url(signature: &str) -> String {
    format!("{}{}", EXPLORER_TX_URL, signature)
}
