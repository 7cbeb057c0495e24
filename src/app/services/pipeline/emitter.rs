//! Output serialization for enriched trades
//!
//! Enriched trades are encoded in input order and grouped into byte units of
//! at most `batch_size` records, so a large chunk reaches the consumer as
//! several writes rather than one large buffer.

use crate::app::models::EnrichedTrade;
use crate::constants::{CSV_CONTENT_TYPE, CSV_DELIMITER, JSON_LINES_CONTENT_TYPE};
use crate::{Error, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Encoding of the outgoing stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitFormat {
    /// `date,productName,currency,price` lines
    #[default]
    Csv,
    /// One JSON object per line
    Json,
}

impl EmitFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            EmitFormat::Csv => CSV_CONTENT_TYPE,
            EmitFormat::Json => JSON_LINES_CONTENT_TYPE,
        }
    }
}

impl FromStr for EmitFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(EmitFormat::Csv),
            "json" | "jsonl" | "ndjson" => Ok(EmitFormat::Json),
            other => Err(Error::configuration(format!(
                "unknown output format '{}' (expected csv or json)",
                other
            ))),
        }
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    date: &'a str,
    #[serde(rename = "productId")]
    product_id: &'a str,
    #[serde(rename = "productName")]
    product_name: &'a str,
    currency: &'a str,
    price: &'a str,
}

/// Serializes enriched trades into sub-batched byte units
#[derive(Debug, Clone, Copy)]
pub struct OutputEmitter {
    format: EmitFormat,
    batch_size: usize,
}

impl OutputEmitter {
    pub fn new(format: EmitFormat, batch_size: usize) -> Self {
        Self {
            format,
            batch_size: batch_size.max(1),
        }
    }

    /// Encode trades into units of at most `batch_size` records each
    pub fn encode(&self, trades: &[EnrichedTrade]) -> Result<Vec<Bytes>> {
        trades
            .chunks(self.batch_size)
            .map(|batch| self.encode_batch(batch))
            .collect()
    }

    fn encode_batch(&self, batch: &[EnrichedTrade]) -> Result<Bytes> {
        match self.format {
            EmitFormat::Csv => encode_csv(batch),
            EmitFormat::Json => encode_json(batch),
        }
    }
}

fn encode_csv(batch: &[EnrichedTrade]) -> Result<Bytes> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(CSV_DELIMITER)
        .from_writer(Vec::with_capacity(batch.len() * 32));

    for trade in batch {
        writer.write_record([
            trade.date.as_str(),
            trade.product_name(),
            trade.currency.as_str(),
            trade.price.as_str(),
        ])?;
    }

    let buffer = writer
        .into_inner()
        .map_err(|e| Error::serialization(e.to_string()))?;
    Ok(Bytes::from(buffer))
}

fn encode_json(batch: &[EnrichedTrade]) -> Result<Bytes> {
    let mut buffer = Vec::with_capacity(batch.len() * 96);
    for trade in batch {
        let line = JsonLine {
            date: &trade.date,
            product_id: &trade.product_key,
            product_name: trade.product_name(),
            currency: &trade.currency,
            price: &trade.price,
        };
        serde_json::to_writer(&mut buffer, &line)?;
        buffer.push(b'\n');
    }
    Ok(Bytes::from(buffer))
}
