//! Record processing module for trade enrichment
//!
//! This module turns a batch of parsed trades into enriched trades. It is the
//! per-chunk core of the enrichment pipeline and knows nothing about byte
//! streams, chunk ordering or output encoding.
//!
//! # Architecture
//!
//! - [`processor`] - RecordProcessor and step orchestration
//! - [`deduplication`] - distinct product keys of a batch
//! - [`enrichment`] - merging resolved names into trades
//! - [`stats`] - processing statistics and result structures
//!
//! # Processing Steps
//!
//! 1. **Deduplication**: K trades referencing D distinct products yield D keys
//! 2. **Lookup**: the D keys are resolved with exactly one store round trip,
//!    or none when the batch is empty
//! 3. **Merge**: each trade gets its resolved name, or none when the key is
//!    absent from the store; no trade is dropped at this stage

pub mod deduplication;
pub mod enrichment;
pub mod processor;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use deduplication::unique_product_keys;
pub use enrichment::{enrich_trades, name_map};
pub use processor::RecordProcessor;
pub use stats::{ProcessingResult, ProcessingStats};
