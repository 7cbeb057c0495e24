//! Format parsers for product and trade files
//!
//! The three supported wire formats form a closed set, selected once per
//! request from a case-insensitive tag. Unknown tags are rejected before any
//! byte of the input is processed.
//!
//! ## Architecture
//!
//! - [`csv`] - `id,name` and `date,product,currency,price` lines
//! - [`json`] - arrays of flat objects, scanned element by element
//! - [`xml`] - `<product>` and `<trade>` elements inside any envelope
//! - [`stats`] - parse results and skip statistics
//!
//! All parsers apply the same per-record skip policy: an entry that is
//! malformed, incomplete or fails validation is skipped and counted, parsing
//! continues, and valid records keep their input order.
//!
//! ## Usage
//!
//! ```rust
//! use trade_enricher::app::services::format_parser::FileFormat;
//!
//! let format: FileFormat = "CSV".parse().unwrap();
//! let result = format.parse_trade_records("20240315,1,USD,100.50\nbad line\n");
//!
//! assert_eq!(result.records.len(), 1);
//! assert_eq!(result.stats.records_skipped, 1);
//! ```

pub mod csv;
pub mod json;
pub mod stats;
pub mod xml;

#[cfg(test)]
pub mod tests;

pub use stats::{ParseResult, ParseStats};

use crate::app::models::{ProductMapping, TradeRecord};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Json,
    Xml,
}

impl FileFormat {
    /// All supported formats
    pub const ALL: [FileFormat; 3] = [FileFormat::Csv, FileFormat::Json, FileFormat::Xml];

    /// Lowercase tag used on the command line and in request paths
    pub fn tag(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Json => "json",
            FileFormat::Xml => "xml",
        }
    }

    /// Resolve a format tag, ignoring case and surrounding whitespace
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "json" => Ok(FileFormat::Json),
            "xml" => Ok(FileFormat::Xml),
            _ => Err(Error::unsupported_format(tag)),
        }
    }

    /// Parse product mappings from chunk text
    pub fn parse_product_mappings(&self, text: &str) -> ParseResult<ProductMapping> {
        match self {
            FileFormat::Csv => csv::parse_product_mappings(text),
            FileFormat::Json => json::parse_product_mappings(text),
            FileFormat::Xml => xml::parse_product_mappings(text),
        }
    }

    /// Parse trade records from chunk text
    pub fn parse_trade_records(&self, text: &str) -> ParseResult<TradeRecord> {
        match self {
            FileFormat::Csv => csv::parse_trade_records(text),
            FileFormat::Json => json::parse_trade_records(text),
            FileFormat::Xml => xml::parse_trade_records(text),
        }
    }
}

impl FromStr for FileFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
