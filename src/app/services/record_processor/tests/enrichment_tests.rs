//! Tests for merging lookup results into trades

use super::*;
use crate::app::services::record_processor::enrichment::{enrich_trades, name_map};
use crate::app::services::record_processor::stats::ProcessingStats;

#[test]
fn test_name_map_drops_absent_keys() {
    let names = name_map(vec![
        ("1".to_string(), Some("Widget".to_string())),
        ("2".to_string(), None),
        ("3".to_string(), Some(String::new())),
    ]);

    assert_eq!(names.len(), 2);
    assert_eq!(names.get("1").map(String::as_str), Some("Widget"));
    assert!(!names.contains_key("2"));
    // A stored empty string is still a stored value
    assert_eq!(names.get("3").map(String::as_str), Some(""));
}

#[test]
fn test_enrich_trades_resolved_and_missing() {
    let mut stats = ProcessingStats::new();
    let trades = vec![
        create_test_trade("1", "100.50"),
        create_test_trade("9", "7.00"),
    ];

    let enriched = enrich_trades(trades, &create_name_map(&["1"]), &mut stats);

    assert_eq!(enriched.len(), 2);
    assert_eq!(enriched[0].product_name(), "Product 1");
    assert_eq!(enriched[1].product_name(), MISSING_PRODUCT_NAME);
    assert_eq!(enriched[1].product_key, "9");
    assert_eq!(enriched[1].resolved_name, None);
    assert_eq!(stats.resolved, 1);
    assert_eq!(stats.missing, 1);
}

#[test]
fn test_enrich_trades_preserves_order_and_fields() {
    let mut stats = ProcessingStats::new();
    let trades = create_trades(20, 4);
    let originals = trades.clone();

    let enriched = enrich_trades(trades, &create_name_map(&["0", "1", "2", "3"]), &mut stats);

    for (trade, original) in enriched.iter().zip(&originals) {
        assert_eq!(trade.date, original.date);
        assert_eq!(trade.product_key, original.product_key);
        assert_eq!(trade.currency, original.currency);
        assert_eq!(trade.price, original.price);
        assert!(trade.is_resolved());
    }
    assert_eq!(stats.final_output(), 20);
}

#[test]
fn test_enrich_empty_batch() {
    let mut stats = ProcessingStats::new();
    let enriched = enrich_trades(Vec::new(), &create_name_map(&["1"]), &mut stats);
    assert!(enriched.is_empty());
    assert_eq!(stats, ProcessingStats::new());
}
