//! Tests for chunk accumulation and record framing

pub mod accumulator_tests;
pub mod framing_tests;

pub use super::{ChunkAccumulator, ChunkThreshold, RecordFramer};
pub use crate::app::models::Chunk;
pub use crate::app::services::format_parser::FileFormat;

/// Build `count` CSV trade lines with distinct prices
pub fn trade_lines(count: usize) -> String {
    (0..count)
        .map(|i| format!("20240315,{},USD,{}.00\n", i % 7, i))
        .collect()
}

/// Build a JSON trade array with `count` elements
pub fn trade_array(count: usize) -> String {
    let elements: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"date": "20240315", "productId": "{}", "currency": "USD", "price": "{}.00", "note": "{{}}"}}"#,
                i % 7,
                i
            )
        })
        .collect();
    format!("[\n{}\n]", elements.join(",\n"))
}

/// Build an XML trade document with `count` elements
pub fn trade_document(count: usize) -> String {
    let elements: String = (0..count)
        .map(|i| {
            format!(
                "  <trade><date>20240315</date><productId>{}</productId><currency>USD</currency><price>{}.00</price></trade>\n",
                i % 7,
                i
            )
        })
        .collect();
    format!("<?xml version=\"1.0\"?>\n<trades>\n{}</trades>\n", elements)
}

/// Feed `input` in fragments of `fragment_size` bytes and collect every chunk
pub fn accumulate(
    format: FileFormat,
    threshold: ChunkThreshold,
    input: &str,
    fragment_size: usize,
) -> Vec<Chunk> {
    let mut accumulator = ChunkAccumulator::new(format, threshold);
    let mut chunks = Vec::new();
    for fragment in input.as_bytes().chunks(fragment_size) {
        chunks.extend(accumulator.push(fragment));
    }
    chunks.extend(accumulator.finish());
    chunks
}
