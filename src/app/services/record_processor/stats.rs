//! Processing statistics and result structures for trade enrichment
//!
//! This module provides types for tracking how many trades went through a
//! chunk's lookup, how many keys were actually sent to the store, and how
//! many trades fell back to the missing-product sentinel.

use crate::app::models::EnrichedTrade;

/// Statistics for one enrichment pass
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProcessingStats {
    /// Number of input trades
    pub total_input: usize,
    /// Number of distinct product keys looked up
    pub unique_keys: usize,
    /// Number of store round trips made
    pub lookups: usize,
    /// Number of trades with a resolved product name
    pub resolved: usize,
    /// Number of trades emitted with the missing-product sentinel
    pub missing: usize,
}

impl ProcessingStats {
    /// Create new empty processing statistics
    pub fn new() -> Self {
        Self {
            total_input: 0,
            unique_keys: 0,
            lookups: 0,
            resolved: 0,
            missing: 0,
        }
    }

    /// Number of trades produced
    pub fn final_output(&self) -> usize {
        self.resolved + self.missing
    }

    /// Percentage of trades whose product name was found
    pub fn resolution_rate(&self) -> f64 {
        if self.total_input == 0 {
            100.0
        } else {
            (self.resolved as f64 / self.total_input as f64) * 100.0
        }
    }

    /// Trades per looked-up key; higher means more duplicate keys saved
    pub fn deduplication_ratio(&self) -> f64 {
        if self.unique_keys == 0 {
            0.0
        } else {
            self.total_input as f64 / self.unique_keys as f64
        }
    }

    /// Fold another pass's statistics into this one
    pub fn merge(&mut self, other: &ProcessingStats) {
        self.total_input += other.total_input;
        self.unique_keys += other.unique_keys;
        self.lookups += other.lookups;
        self.resolved += other.resolved;
        self.missing += other.missing;
    }

    /// Get summary of enrichment statistics
    pub fn summary(&self) -> String {
        format!(
            "Enrichment Summary: {} trades | {} unique keys in {} lookups ({:.1} trades/key) | \
             Resolved: {:.1}% | Missing: {}",
            self.total_input,
            self.unique_keys,
            self.lookups,
            self.deduplication_ratio(),
            self.resolution_rate(),
            self.missing
        )
    }
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of enriching one batch of trades
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// Enriched trades in input order
    pub trades: Vec<EnrichedTrade>,
    /// Processing statistics
    pub stats: ProcessingStats,
}

impl ProcessingResult {
    pub fn new(trades: Vec<EnrichedTrade>, stats: ProcessingStats) -> Self {
        Self { trades, stats }
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    /// Get summary string for logging
    pub fn summary(&self) -> String {
        self.stats.summary()
    }
}
