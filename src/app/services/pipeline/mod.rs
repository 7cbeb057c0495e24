//! Streaming pipeline
//!
//! Wires the chunk accumulator, format parsers, record processor and product
//! store into the two streaming operations the service exposes:
//!
//! - [`enrich_stream`]: trade bytes in, enriched output bytes out
//! - [`load_products`]: product mapping bytes in, store writes out
//!
//! Both bound the number of chunks held in memory with a semaphore sized by
//! [`PipelineConfig::max_concurrent_chunks`](crate::config::PipelineConfig).

pub mod emitter;
pub mod enrichment_stream;
pub mod loader;
pub mod sequencer;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use emitter::{EmitFormat, OutputEmitter};
pub use enrichment_stream::{EnrichmentStream, enrich_stream};
pub use loader::load_products;
pub use sequencer::Sequencer;
pub use stats::{LoadStats, RunState, RunStats};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order in which chunk outputs reach the outgoing stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputOrdering {
    /// Chunk outputs follow input order
    #[default]
    Preserve,
    /// Chunk outputs are written as soon as each chunk finishes
    Completion,
}

impl FromStr for OutputOrdering {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" | "ordered" => Ok(OutputOrdering::Preserve),
            "completion" | "unordered" => Ok(OutputOrdering::Completion),
            other => Err(Error::configuration(format!(
                "unknown output ordering '{}' (expected preserve or completion)",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputOrdering::Preserve => write!(f, "preserve"),
            OutputOrdering::Completion => write!(f, "completion"),
        }
    }
}
