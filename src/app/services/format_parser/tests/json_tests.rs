//! Tests for JSON parsing and element scanning

use super::*;
use crate::app::services::format_parser::json::{
    ElementScanner, ScanEvent, element_objects, parse_product_mappings, parse_trade_records,
};

#[test]
fn test_parse_products() {
    let result = parse_product_mappings(PRODUCTS_JSON);
    assert_eq!(result.records, expected_products());
    assert_counts(&result.stats, 2, 0);
}

#[test]
fn test_parse_trades_with_numeric_values() {
    let result = parse_trade_records(TRADES_JSON);
    assert_eq!(result.records, expected_trades());
    assert_counts(&result.stats, 3, 0);
}

#[test]
fn test_missing_and_null_fields_are_skipped() {
    let text = r#"[
      {"date": "20240315", "currency": "USD", "price": "1"},
      {"date": "20240315", "productId": null, "currency": "USD", "price": "1"},
      {"date": "20240315", "productId": "1", "currency": "USD", "price": "1"}
    ]"#;
    let result = parse_trade_records(text);

    assert_eq!(result.records.len(), 1);
    assert_counts(&result.stats, 1, 2);
    assert!(result.stats.errors[0].contains("productId"));
}

#[test]
fn test_malformed_element_does_not_stop_parsing() {
    let text = r#"[{"productId": "1", "productName": "A"}, {"productId": "2" "productName": "B"}, {"productId": "3", "productName": "C"}]"#;
    let result = parse_product_mappings(text);

    let ids: Vec<_> = result.records.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_counts(&result.stats, 2, 1);
}

#[test]
fn test_chunk_without_array_opening() {
    // Middle chunk of a split array
    let text = r#", {"productId": "2", "productName": "Product B"}]"#;
    let result = parse_product_mappings(text);
    assert_eq!(result.records, vec![expected_products()[1].clone()]);
}

#[test]
fn test_unterminated_element_is_counted() {
    let text = r#"[{"productId": "1", "productName": "A"}, {"productId": "2", "prod"#;
    let result = parse_product_mappings(text);
    assert_eq!(result.records.len(), 1);
    assert_counts(&result.stats, 1, 1);
}

#[test]
fn test_element_objects_with_nested_values_and_strings() {
    let text = r#"[{"a": {"b": [1, {"c": 2}]}, "s": "}{\"]"}, {"x": 1}]"#;
    let (objects, tail) = element_objects(text);

    assert_eq!(objects.len(), 2);
    assert_eq!(objects[1], r#"{"x": 1}"#);
    assert!(tail.is_none());
}

#[test]
fn test_scanner_reports_boundaries_for_line_delimited_objects() {
    let mut scanner = ElementScanner::new();
    let events: Vec<_> = "{\"a\":1}\n{\"b\":2}\n"
        .bytes()
        .map(|b| scanner.feed(b))
        .filter(|e| *e != ScanEvent::None)
        .collect();

    assert_eq!(
        events,
        vec![
            ScanEvent::ElementStart,
            ScanEvent::ElementEnd,
            ScanEvent::ElementStart,
            ScanEvent::ElementEnd
        ]
    );
}
