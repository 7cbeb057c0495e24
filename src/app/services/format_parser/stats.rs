//! Parsing statistics and result structures for chunk parsing
//!
//! Every format parser returns the records it could build together with a
//! count of what it saw and skipped, so the pipeline can report partial
//! failures without aborting a chunk.

use crate::constants::MAX_ERROR_SAMPLES;

/// Parsing result with records and basic statistics
#[derive(Debug, Clone)]
pub struct ParseResult<T> {
    /// Successfully parsed records in input order
    pub records: Vec<T>,

    /// Basic parsing statistics
    pub stats: ParseStats,
}

impl<T> ParseResult<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            stats: ParseStats::new(),
        }
    }

    /// Record a successfully built record
    pub fn push(&mut self, record: T) {
        self.stats.records_seen += 1;
        self.stats.records_parsed += 1;
        self.records.push(record);
    }

    /// Record a skipped entry
    pub fn skip(&mut self, message: impl Into<String>) {
        self.stats.records_seen += 1;
        self.stats.record_skip(message);
    }
}

impl<T> Default for ParseResult<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple parsing statistics
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParseStats {
    /// Total number of entries encountered (blank lines excluded)
    pub records_seen: usize,

    /// Number of records successfully parsed
    pub records_parsed: usize,

    /// Number of entries skipped as malformed
    pub records_skipped: usize,

    /// First few skip reasons for debugging
    pub errors: Vec<String>,
}

impl ParseStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self {
            records_seen: 0,
            records_parsed: 0,
            records_skipped: 0,
            errors: Vec::new(),
        }
    }

    fn record_skip(&mut self, message: impl Into<String>) {
        self.records_skipped += 1;
        if self.errors.len() < MAX_ERROR_SAMPLES {
            self.errors.push(message.into());
        }
    }

    /// Fold another chunk's statistics into this one
    pub fn merge(&mut self, other: &ParseStats) {
        self.records_seen += other.records_seen;
        self.records_parsed += other.records_parsed;
        self.records_skipped += other.records_skipped;
        let room = MAX_ERROR_SAMPLES.saturating_sub(self.errors.len());
        self.errors
            .extend(other.errors.iter().take(room).cloned());
    }

    /// Calculate success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.records_seen == 0 {
            0.0
        } else {
            (self.records_parsed as f64 / self.records_seen as f64) * 100.0
        }
    }

    /// Check if parsing was mostly successful (>90% success rate)
    pub fn is_successful(&self) -> bool {
        self.success_rate() > 90.0
    }
}

impl Default for ParseStats {
    fn default() -> Self {
        Self::new()
    }
}
