//! Trade Enricher Library
//!
//! A Rust library for enriching large trade files with product names held in a
//! key-value store, without ever holding a whole file in memory.
//!
//! This library provides tools for:
//! - Accumulating an unbounded byte stream into record-aligned chunks
//! - Parsing CSV, JSON and XML product and trade files chunk by chunk
//! - Deduplicating product keys and resolving them with one batched lookup per chunk
//! - Re-emitting enriched trades as a bounded-concurrency, order-preserving stream
//! - Loading product mappings into Redis with pipelined writes
//! - Serving both flows over HTTP and from the command line

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod chunk_accumulator;
        pub mod format_parser;
        pub mod pipeline;
        pub mod product_store;
        pub mod record_processor;
    }
    pub mod adapters {
        pub mod http;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{Chunk, EnrichedTrade, ProductMapping, TradeRecord};
pub use app::services::format_parser::FileFormat;
pub use app::services::pipeline::{EnrichmentStream, enrich_stream, load_products};
pub use app::services::product_store::{MemoryStore, ProductStore, RedisStore};
pub use config::Config;

/// Result type alias for the trade enricher
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for enrichment and loading operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Format tag not one of csv, json, xml
    #[error("Unsupported file format: '{tag}' (expected csv, json or xml)")]
    UnsupportedFormat { tag: String },

    /// A single record failed validation
    #[error("Invalid record: {message}")]
    InvalidRecord { message: String },

    /// Key-value store communication failed
    #[error("Store error: {message}")]
    Store {
        message: String,
        #[source]
        source: Option<redis::RedisError>,
    },

    /// Batched lookup did not complete in time
    #[error("Lookup of {keys} product keys timed out after {timeout_ms}ms")]
    LookupTimeout { keys: usize, timeout_ms: u64 },

    /// Reading the incoming byte stream failed
    #[error("Input stream error: {message}")]
    StreamRead { message: String },

    /// Encoding enriched output failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// A chunk task panicked or was aborted
    #[error("Chunk task failed: {message}")]
    TaskFailed { message: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(tag: impl Into<String>) -> Self {
        Self::UnsupportedFormat { tag: tag.into() }
    }

    /// Create an invalid record error
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Create a store error without an underlying client error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Create a store error wrapping a Redis client error
    pub fn redis(message: impl Into<String>, source: redis::RedisError) -> Self {
        Self::Store {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a lookup timeout error
    pub fn lookup_timeout(keys: usize, timeout_ms: u64) -> Self {
        Self::LookupTimeout { keys, timeout_ms }
    }

    /// Create an input stream error
    pub fn stream_read(message: impl Into<String>) -> Self {
        Self::StreamRead {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a task failure error
    pub fn task_failed(message: impl Into<String>) -> Self {
        Self::TaskFailed {
            message: message.into(),
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// Whether this error ends a whole run rather than a single record or chunk
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::InvalidRecord { .. } | Self::LookupTimeout { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<redis::RedisError> for Error {
    fn from(error: redis::RedisError) -> Self {
        Self::Store {
            message: "Redis command failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(!Error::invalid_record("bad date").is_fatal());
        assert!(!Error::lookup_timeout(3, 5000).is_fatal());
        assert!(Error::store("connection refused").is_fatal());
        assert!(Error::stream_read("reset by peer").is_fatal());
        assert!(Error::unsupported_format("yaml").is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let error = Error::unsupported_format("yaml");
        assert!(error.to_string().contains("'yaml'"));

        let error = Error::lookup_timeout(3, 250);
        assert_eq!(
            error.to_string(),
            "Lookup of 3 product keys timed out after 250ms"
        );
    }
}
