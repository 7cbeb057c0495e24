//! Tests for per-format record framing

use super::*;

fn boundaries(format: FileFormat, input: &str) -> Vec<usize> {
    let mut framer = RecordFramer::for_format(format);
    input
        .bytes()
        .enumerate()
        .filter_map(|(offset, byte)| framer.feed(byte).then_some(offset + 1))
        .collect()
}

#[test]
fn test_csv_lines_ignore_blank_lines() {
    let input = "a,b\n\n   \nc,d\n";
    assert_eq!(boundaries(FileFormat::Csv, input), vec![4, 13]);
}

#[test]
fn test_csv_newline_inside_quotes_is_not_a_boundary() {
    let input = "20240315,\"1\n\",USD,5\n20240316,2,USD,6\n";
    let ends = boundaries(FileFormat::Csv, input);
    assert_eq!(ends.len(), 2);
    assert_eq!(&input[..ends[0]], "20240315,\"1\n\",USD,5\n");
}

#[test]
fn test_csv_escaped_quotes_keep_quote_state() {
    let input = "1,\"Widget \"\"XL\"\"\n\"\n2,Gadget\n";
    let ends = boundaries(FileFormat::Csv, input);
    assert_eq!(ends.len(), 2);
    assert!(input[..ends[0]].ends_with("\"\n"));
}

#[test]
fn test_json_boundaries_follow_element_objects() {
    let input = r#"[{"a": {"b": 1}}, {"c": "}"}]"#;
    let ends = boundaries(FileFormat::Json, input);
    assert_eq!(ends.len(), 2);
    assert_eq!(&input[..ends[0]], r#"[{"a": {"b": 1}}"#);
}

#[test]
fn test_xml_boundaries_after_record_elements_only() {
    let input = "<trades><trade><date>1</date></trade><trade><date>2</date></trade></trades>";
    let ends = boundaries(FileFormat::Xml, input);
    assert_eq!(ends.len(), 2);
    assert!(input[..ends[0]].ends_with("</trade>"));
    assert!(input[..ends[1]].ends_with("</trade>"));
}

#[test]
fn test_xml_product_elements() {
    let input = "<products><product><productId>1</productId></product></products>";
    assert_eq!(boundaries(FileFormat::Xml, input).len(), 1);
}

#[test]
fn test_threshold_default_and_value() {
    assert_eq!(
        ChunkThreshold::default(),
        ChunkThreshold::Bytes(crate::constants::DEFAULT_CHUNK_BYTES)
    );
    assert_eq!(ChunkThreshold::Records(7).value(), 7);
}
