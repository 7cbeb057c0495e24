//! Data models for trade enrichment
//!
//! This module contains the normalized records produced by the format parsers,
//! the enriched trade emitted by the pipeline, and the chunk unit that flows
//! between the accumulator and the chunk tasks.

use crate::constants::{MISSING_PRODUCT_NAME, TRADE_DATE_FORMAT};
use crate::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static TRADE_DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{8}$").unwrap_or_else(|e| panic!("invalid trade date pattern: {e}"))
});

// =============================================================================
// Product Mapping
// =============================================================================

/// Product identifier to display name mapping persisted in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMapping {
    /// Store key
    pub id: String,
    /// Store value
    pub name: String,
}

impl ProductMapping {
    /// Create a mapping, rejecting blank ids and names
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let id = id.into().trim().to_string();
        let name = name.into().trim().to_string();

        if id.is_empty() {
            return Err(Error::invalid_record("product id is empty"));
        }
        if name.is_empty() {
            return Err(Error::invalid_record(format!(
                "product name is empty for id '{}'",
                id
            )));
        }

        Ok(Self { id, name })
    }
}

// =============================================================================
// Trade Records
// =============================================================================

/// A parsed trade before enrichment
///
/// Construction guarantees that every field is non-blank and that `date` is an
/// eight digit calendar date (`YYYYMMDD`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub date: String,
    pub product_key: String,
    pub currency: String,
    pub price: String,
}

impl TradeRecord {
    /// Create a validated trade record
    pub fn new(
        date: impl Into<String>,
        product_key: impl Into<String>,
        currency: impl Into<String>,
        price: impl Into<String>,
    ) -> Result<Self> {
        let date = date.into().trim().to_string();
        let product_key = product_key.into().trim().to_string();
        let currency = currency.into().trim().to_string();
        let price = price.into().trim().to_string();

        validate_trade_date(&date)?;

        for (field, value) in [
            ("product", &product_key),
            ("currency", &currency),
            ("price", &price),
        ] {
            if value.is_empty() {
                return Err(Error::invalid_record(format!(
                    "trade dated {} has an empty {} field",
                    date, field
                )));
            }
        }

        Ok(Self {
            date,
            product_key,
            currency,
            price,
        })
    }

    /// Parsed calendar date of the trade
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, TRADE_DATE_FORMAT).ok()
    }

    /// Merge a resolved product name into this trade
    pub fn enrich(self, resolved_name: Option<String>) -> EnrichedTrade {
        EnrichedTrade {
            date: self.date,
            product_key: self.product_key,
            resolved_name,
            currency: self.currency,
            price: self.price,
        }
    }
}

/// Check that a trade date is exactly eight digits and a real calendar day
pub fn validate_trade_date(date: &str) -> Result<()> {
    if !TRADE_DATE_PATTERN.is_match(date) {
        return Err(Error::invalid_record(format!(
            "trade date '{}' is not in YYYYMMDD form",
            date
        )));
    }

    NaiveDate::parse_from_str(date, TRADE_DATE_FORMAT).map_err(|e| {
        Error::invalid_record(format!("trade date '{}' is not a calendar date: {}", date, e))
    })?;

    Ok(())
}

/// A trade after the product lookup
///
/// The raw product key is kept alongside the resolved name so that a missing
/// mapping can be told apart from a mapping whose value is the sentinel text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedTrade {
    pub date: String,
    pub product_key: String,
    pub resolved_name: Option<String>,
    pub currency: String,
    pub price: String,
}

impl EnrichedTrade {
    /// Name to emit: the resolved name, or the missing-product sentinel
    pub fn product_name(&self) -> &str {
        self.resolved_name.as_deref().unwrap_or(MISSING_PRODUCT_NAME)
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_name.is_some()
    }
}

// =============================================================================
// Chunks
// =============================================================================

/// Record-aligned slice of the input stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in arrival order, starting at zero
    pub index: u64,
    /// Decoded text holding only complete records
    pub text: String,
    /// Number of record boundaries inside `text`
    pub records: usize,
}

impl Chunk {
    pub fn new(index: u64, text: String, records: usize) -> Self {
        Self {
            index,
            text,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
