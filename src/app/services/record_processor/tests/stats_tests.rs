//! Tests for processing statistics

use crate::app::services::record_processor::stats::ProcessingStats;

#[test]
fn test_rates_on_empty_stats() {
    let stats = ProcessingStats::new();
    assert_eq!(stats.resolution_rate(), 100.0);
    assert_eq!(stats.deduplication_ratio(), 0.0);
    assert_eq!(stats.final_output(), 0);
}

#[test]
fn test_merge_and_summary() {
    let mut total = ProcessingStats::new();
    let chunk = ProcessingStats {
        total_input: 10,
        unique_keys: 2,
        lookups: 1,
        resolved: 8,
        missing: 2,
    };

    total.merge(&chunk);
    total.merge(&chunk);

    assert_eq!(total.total_input, 20);
    assert_eq!(total.lookups, 2);
    assert_eq!(total.resolution_rate(), 80.0);
    assert_eq!(total.deduplication_ratio(), 5.0);
    assert!(total.summary().contains("20 trades"));
    assert!(total.summary().contains("Missing: 4"));
}
