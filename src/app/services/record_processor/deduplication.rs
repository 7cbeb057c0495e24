//! Product key deduplication
//!
//! A chunk of trades usually references far fewer products than it has
//! trades. Only the distinct keys are sent to the store, in first-seen order
//! so that lookups are deterministic for a given input.

use crate::app::models::TradeRecord;
use std::collections::HashSet;
use tracing::debug;

/// Distinct product keys of a batch, in first-seen order
pub fn unique_product_keys(trades: &[TradeRecord]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(trades.len());
    let keys: Vec<String> = trades
        .iter()
        .filter(|trade| seen.insert(trade.product_key.as_str()))
        .map(|trade| trade.product_key.clone())
        .collect();

    debug!(
        "Deduplicated {} trades to {} product keys",
        trades.len(),
        keys.len()
    );
    keys
}
