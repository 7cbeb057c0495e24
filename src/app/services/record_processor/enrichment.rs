//! Merging lookup results into trades
//!
//! Every trade is emitted exactly once. A key with no stored name is not an
//! error: the trade keeps its raw key and carries no resolved name, which
//! renders as the missing-product sentinel on output.

use super::stats::ProcessingStats;
use crate::app::models::{EnrichedTrade, TradeRecord};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

const MISSING_KEY_LOG_LIMIT: usize = 10;

/// Collect the found names of a lookup into a map, dropping absent keys
pub fn name_map(lookups: Vec<(String, Option<String>)>) -> HashMap<String, String> {
    lookups
        .into_iter()
        .filter_map(|(key, name)| name.map(|name| (key, name)))
        .collect()
}

/// Enrich trades from a resolved name map, preserving order
pub fn enrich_trades(
    trades: Vec<TradeRecord>,
    names: &HashMap<String, String>,
    stats: &mut ProcessingStats,
) -> Vec<EnrichedTrade> {
    let enriched: Vec<EnrichedTrade> = trades
        .into_iter()
        .map(|trade| {
            let resolved = names.get(&trade.product_key).cloned();
            if resolved.is_some() {
                stats.resolved += 1;
            } else {
                stats.missing += 1;
            }
            trade.enrich(resolved)
        })
        .collect();

    let missing_keys: BTreeSet<&str> = enriched
        .iter()
        .filter(|trade| !trade.is_resolved())
        .map(|trade| trade.product_key.as_str())
        .collect();

    if !missing_keys.is_empty() {
        let sample: Vec<&str> = missing_keys.iter().take(MISSING_KEY_LOG_LIMIT).copied().collect();
        warn!(
            "No product name stored for {} key(s): {}{}",
            missing_keys.len(),
            sample.join(", "),
            if missing_keys.len() > sample.len() { ", ..." } else { "" }
        );
    }
    debug!(
        "Enriched {} trades ({} resolved, {} missing)",
        enriched.len(),
        stats.resolved,
        stats.missing
    );

    enriched
}
