//! Tests for the record processor module
//!
//! This module provides unit tests for deduplication, enrichment and the
//! processor's lookup behaviour.

pub mod enrichment_tests;
pub mod stats_tests;

// Test helper functions and fixtures
pub use crate::app::models::{EnrichedTrade, TradeRecord};
pub use crate::app::services::product_store::MemoryStore;
pub use crate::constants::MISSING_PRODUCT_NAME;
use std::collections::HashMap;

/// Create a valid trade for `product_key`
pub fn create_test_trade(product_key: &str, price: &str) -> TradeRecord {
    TradeRecord::new("20240315", product_key, "USD", price).unwrap()
}

/// Create trades cycling through `distinct` product keys
pub fn create_trades(count: usize, distinct: usize) -> Vec<TradeRecord> {
    (0..count)
        .map(|i| create_test_trade(&(i % distinct).to_string(), &format!("{}.00", i)))
        .collect()
}

/// Name map with `Product <key>` for each key
pub fn create_name_map(keys: &[&str]) -> HashMap<String, String> {
    keys.iter()
        .map(|key| (key.to_string(), format!("Product {}", key)))
        .collect()
}

/// Store holding `Product <key>` for each key
pub fn create_store(keys: &[&str]) -> MemoryStore {
    MemoryStore::with_products(create_name_map(keys))
}
