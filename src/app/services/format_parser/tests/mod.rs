//! Tests for the format parsers
//!
//! Fixtures below describe the same three trades and two products in each
//! supported format.

pub mod json_tests;

pub use super::{FileFormat, ParseStats};
pub use crate::app::models::{ProductMapping, TradeRecord};

pub const PRODUCTS_CSV: &str = "1,Product A\n2,Product B\n";

pub const TRADES_CSV: &str = "20240315,1,USD,100.50\n20240316,2,EUR,7\n20240317,9,GBP,0.01\n";

pub const PRODUCTS_JSON: &str = r#"[
  {"productId": "1", "productName": "Product A"},
  {"productId": "2", "productName": "Product B"}
]"#;

pub const TRADES_JSON: &str = r#"[
  {"date": "20240315", "productId": "1", "currency": "USD", "price": "100.50"},
  {"date": "20240316", "productId": 2, "currency": "EUR", "price": 7},
  {"date": "20240317", "productId": "9", "currency": "GBP", "price": "0.01"}
]"#;

pub const PRODUCTS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<products>
  <product><productId>1</productId><productName>Product A</productName></product>
  <product><productId>2</productId><productName>Product B</productName></product>
</products>"#;

pub const TRADES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<trades>
  <trade><date>20240315</date><productId>1</productId><currency>USD</currency><price>100.50</price></trade>
  <trade><date>20240316</date><productId>2</productId><currency>EUR</currency><price>7</price></trade>
  <trade><date>20240317</date><productId>9</productId><currency>GBP</currency><price>0.01</price></trade>
</trades>"#;

/// Trades every fixture above should produce
pub fn expected_trades() -> Vec<TradeRecord> {
    vec![
        TradeRecord::new("20240315", "1", "USD", "100.50").unwrap(),
        TradeRecord::new("20240316", "2", "EUR", "7").unwrap(),
        TradeRecord::new("20240317", "9", "GBP", "0.01").unwrap(),
    ]
}

/// Products every fixture above should produce
pub fn expected_products() -> Vec<ProductMapping> {
    vec![
        ProductMapping::new("1", "Product A").unwrap(),
        ProductMapping::new("2", "Product B").unwrap(),
    ]
}

/// Assert parse statistics counts
pub fn assert_counts(stats: &ParseStats, parsed: usize, skipped: usize) {
    assert_eq!(stats.records_parsed, parsed, "parsed count: {:?}", stats);
    assert_eq!(stats.records_skipped, skipped, "skipped count: {:?}", stats);
    assert_eq!(stats.records_seen, parsed + skipped);
}
