//! CSV record parsing
//!
//! Products are `id,name` lines and trades are `date,product,currency,price`
//! lines. There is no header row. Quoted fields follow RFC 4180 so product
//! names may contain commas.

use super::stats::ParseResult;
use crate::Result;
use crate::app::models::{ProductMapping, TradeRecord};
use crate::constants::{CSV_DELIMITER, PRODUCT_CSV_COLUMNS, TRADE_CSV_COLUMNS};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

/// Parse `id,name` lines
pub fn parse_product_mappings(text: &str) -> ParseResult<ProductMapping> {
    parse_lines(text, PRODUCT_CSV_COLUMNS, |record| {
        ProductMapping::new(&record[0], &record[1])
    })
}

/// Parse `date,product,currency,price` lines
pub fn parse_trade_records(text: &str) -> ParseResult<TradeRecord> {
    parse_lines(text, TRADE_CSV_COLUMNS, |record| {
        TradeRecord::new(&record[0], &record[1], &record[2], &record[3])
    })
}

fn parse_lines<T>(
    text: &str,
    columns: usize,
    build: impl Fn(&StringRecord) -> Result<T>,
) -> ParseResult<T> {
    let mut result = ParseResult::new();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(CSV_DELIMITER)
        .from_reader(text.as_bytes());

    for row in reader.records() {
        let record = match row {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping unreadable CSV line: {}", e);
                result.skip(format!("unreadable CSV line: {}", e));
                continue;
            }
        };

        if is_blank(&record) {
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() != columns {
            debug!(
                "Skipping line {}: expected {} columns, found {}",
                line,
                columns,
                record.len()
            );
            result.skip(format!(
                "line {}: expected {} columns, found {}",
                line,
                columns,
                record.len()
            ));
            continue;
        }

        match build(&record) {
            Ok(parsed) => result.push(parsed),
            Err(e) => {
                debug!("Skipping line {}: {}", line, e);
                result.skip(format!("line {}: {}", line, e));
            }
        }
    }

    result
}

fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record[0].is_empty()
}
