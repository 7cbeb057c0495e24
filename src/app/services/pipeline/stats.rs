//! Run state and statistics for enrichment and product-load runs

use crate::app::services::format_parser::ParseStats;
use crate::app::services::record_processor::ProcessingStats;
use crate::constants::format_bytes;
use serde::{Deserialize, Serialize};

/// Lifecycle of an enrichment run
///
/// `Idle -> Accumulating -> Draining -> Done`, with any non-terminal state
/// able to move to `Failed`. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    /// Input is still being read and chunked
    Accumulating,
    /// Input has ended; in-flight chunks are finishing
    Draining,
    Done,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }

    /// Whether moving from `self` to `next` follows the lifecycle
    pub fn can_transition_to(&self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Idle, Accumulating)
                | (Accumulating, Draining)
                | (Draining, Done)
                | (Idle | Accumulating | Draining, Failed)
        )
    }
}

/// Live statistics of an enrichment run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub state: RunState,
    /// Bytes read from the input stream
    pub bytes_received: u64,
    /// Chunks cut by the accumulator
    pub chunks_accumulated: u64,
    /// Chunks whose output has been handed downstream
    pub chunks_emitted: u64,
    /// Chunks dropped because their lookup timed out
    pub chunks_timed_out: u64,
    /// Per-record parse outcomes across all chunks
    pub parse: ParseStats,
    /// Lookup and merge outcomes across all chunks
    pub processing: ProcessingStats,
    /// Enriched records written to the output stream
    pub records_emitted: usize,
    /// Output units written to the output stream
    pub units_emitted: usize,
    pub bytes_emitted: u64,
    /// Message of the error that failed the run
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl RunStats {
    /// Records emitted per second of wall time
    pub fn records_per_second(&self) -> f64 {
        if self.elapsed_ms == 0 {
            0.0
        } else {
            self.records_emitted as f64 / (self.elapsed_ms as f64 / 1000.0)
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Enrichment {:?}: {} chunks, {} records emitted ({} skipped, {} missing names, \
             {} chunks timed out) | {} in, {} out | {:.0} records/s",
            self.state,
            self.chunks_emitted,
            self.records_emitted,
            self.parse.records_skipped,
            self.processing.missing,
            self.chunks_timed_out,
            format_bytes(self.bytes_received),
            format_bytes(self.bytes_emitted),
            self.records_per_second()
        )
    }
}

/// Outcome of a product-load run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadStats {
    /// Chunks cut by the accumulator
    pub chunks: u64,
    /// Per-record parse outcomes across all chunks
    pub parse: ParseStats,
    /// Mappings written to the store
    pub products_stored: usize,
    /// Store round trips made
    pub store_writes: usize,
    pub bytes_received: u64,
    pub elapsed_ms: u64,
}

impl LoadStats {
    pub fn summary(&self) -> String {
        format!(
            "Product load: {} products stored in {} writes from {} chunks ({} skipped) | {} in {}ms",
            self.products_stored,
            self.store_writes,
            self.chunks,
            self.parse.records_skipped,
            format_bytes(self.bytes_received),
            self.elapsed_ms
        )
    }
}
