//! Application constants for the trade enricher
//!
//! This module contains default values, wire-level constants and helpers used
//! throughout the pipeline, the CLI and the HTTP service.

// =============================================================================
// Pipeline Defaults
// =============================================================================

/// Default chunk threshold in bytes (1 MiB)
pub const DEFAULT_CHUNK_BYTES: usize = 1024 * 1024;

/// Default number of chunks processed concurrently
pub const DEFAULT_MAX_CONCURRENT_CHUNKS: usize = 16;

/// Default number of enriched records per emitted output unit
pub const DEFAULT_EMIT_BATCH_SIZE: usize = 1000;

/// Default timeout for a single batched store lookup, in milliseconds
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5000;

/// Capacity of the channel between the input reader and the chunk dispatcher
pub const CHUNK_CHANNEL_CAPACITY: usize = 4;

/// Capacity of the outgoing byte-unit channel
pub const OUTPUT_CHANNEL_CAPACITY: usize = 64;

/// Maximum number of per-record error messages retained in parse statistics
pub const MAX_ERROR_SAMPLES: usize = 20;

// =============================================================================
// Record Formats
// =============================================================================

/// Name emitted for trades whose product key has no stored mapping
pub const MISSING_PRODUCT_NAME: &str = "Missing Product Name";

/// Calendar format of the trade date field
pub const TRADE_DATE_FORMAT: &str = "%Y%m%d";

/// Field separator for CSV input and output
pub const CSV_DELIMITER: u8 = b',';

/// Number of columns in a product CSV line (`id,name`)
pub const PRODUCT_CSV_COLUMNS: usize = 2;

/// Number of columns in a trade CSV line (`date,product,currency,price`)
pub const TRADE_CSV_COLUMNS: usize = 4;

/// Field names used by the JSON and XML formats
pub mod fields {
    pub const PRODUCT_ID: &str = "productId";
    pub const PRODUCT_NAME: &str = "productName";
    pub const DATE: &str = "date";
    pub const CURRENCY: &str = "currency";
    pub const PRICE: &str = "price";
}

/// Element names delimiting one record in the XML format
pub mod xml_elements {
    pub const PRODUCT: &str = "product";
    pub const TRADE: &str = "trade";
}

// =============================================================================
// Service Defaults
// =============================================================================

/// Default Redis connection URL
pub const DEFAULT_STORE_URL: &str = "redis://127.0.0.1:6379";

/// Default HTTP bind address
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "TRADE_ENRICHER_";

/// Directory name under the user config directory
pub const CONFIG_DIR_NAME: &str = "trade-enricher";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Read buffer size for file and stdin input in the CLI
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Spinner refresh interval in milliseconds
pub const PROGRESS_TICK_MS: u64 = 120;

/// Content type of CSV output
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Content type of JSON-lines output
pub const JSON_LINES_CONTENT_TYPE: &str = "application/x-ndjson";

/// Format a byte count in human-readable form
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(DEFAULT_CHUNK_BYTES as u64), "1.00 MB");
    }

    #[test]
    fn test_defaults_are_nonzero() {
        assert!(DEFAULT_CHUNK_BYTES > 0);
        assert!(DEFAULT_MAX_CONCURRENT_CHUNKS > 0);
        assert!(DEFAULT_EMIT_BATCH_SIZE > 0);
        assert_eq!(PRODUCT_CSV_COLUMNS, 2);
        assert_eq!(TRADE_CSV_COLUMNS, 4);
    }
}
