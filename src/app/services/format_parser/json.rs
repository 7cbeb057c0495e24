//! JSON record parsing
//!
//! Input is an array of flat objects, possibly split across chunks, so a chunk
//! may start with `[`, with `,`, or directly with an object. The
//! [`ElementScanner`] finds each element-level object by tracking bracket
//! depth and string state, and each object is decoded on its own so one bad
//! element only costs that element.

use super::stats::ParseResult;
use crate::app::models::{ProductMapping, TradeRecord};
use crate::constants::fields;
use crate::{Error, Result};
use serde_json::{Map, Value};
use tracing::debug;

/// Boundary events reported by [`ElementScanner::feed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent {
    None,
    ElementStart,
    ElementEnd,
}

/// Incremental scanner for element-level JSON objects
#[derive(Debug, Clone, Default)]
pub struct ElementScanner {
    depth: usize,
    in_string: bool,
    escaped: bool,
    element_depth: Option<usize>,
}

impl ElementScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance over one byte
    pub fn feed(&mut self, byte: u8) -> ScanEvent {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
            }
            return ScanEvent::None;
        }

        match byte {
            b'"' => {
                self.in_string = true;
                ScanEvent::None
            }
            b'{' => {
                let event = if self.element_depth.is_none() && self.depth <= 1 {
                    self.element_depth = Some(self.depth);
                    ScanEvent::ElementStart
                } else {
                    ScanEvent::None
                };
                self.depth += 1;
                event
            }
            b'[' => {
                self.depth += 1;
                ScanEvent::None
            }
            b'}' | b']' => {
                self.depth = self.depth.saturating_sub(1);
                if byte == b'}' && self.element_depth == Some(self.depth) {
                    self.element_depth = None;
                    ScanEvent::ElementEnd
                } else {
                    ScanEvent::None
                }
            }
            _ => ScanEvent::None,
        }
    }
}

/// Split text into element-level object slices
///
/// Returns the complete objects and, if the text ends inside an object, the
/// unterminated tail.
pub fn element_objects(text: &str) -> (Vec<&str>, Option<&str>) {
    let mut scanner = ElementScanner::new();
    let mut objects = Vec::new();
    let mut start = None;

    for (offset, byte) in text.bytes().enumerate() {
        match scanner.feed(byte) {
            ScanEvent::ElementStart => start = Some(offset),
            ScanEvent::ElementEnd => {
                if let Some(begin) = start.take() {
                    objects.push(&text[begin..=offset]);
                }
            }
            ScanEvent::None => {}
        }
    }

    (objects, start.map(|begin| &text[begin..]))
}

/// Parse `{"productId": .., "productName": ..}` elements
pub fn parse_product_mappings(text: &str) -> ParseResult<ProductMapping> {
    parse_objects(text, |object| {
        ProductMapping::new(
            required_field(object, fields::PRODUCT_ID)?,
            required_field(object, fields::PRODUCT_NAME)?,
        )
    })
}

/// Parse `{"date": .., "productId": .., "currency": .., "price": ..}` elements
pub fn parse_trade_records(text: &str) -> ParseResult<TradeRecord> {
    parse_objects(text, |object| {
        TradeRecord::new(
            required_field(object, fields::DATE)?,
            required_field(object, fields::PRODUCT_ID)?,
            required_field(object, fields::CURRENCY)?,
            required_field(object, fields::PRICE)?,
        )
    })
}

fn parse_objects<T>(
    text: &str,
    build: impl Fn(&Map<String, Value>) -> Result<T>,
) -> ParseResult<T> {
    let mut result = ParseResult::new();
    let (objects, unterminated) = element_objects(text);

    for (position, raw) in objects.into_iter().enumerate() {
        let object = match serde_json::from_str::<Map<String, Value>>(raw) {
            Ok(object) => object,
            Err(e) => {
                debug!("Skipping malformed JSON element {}: {}", position, e);
                result.skip(format!("element {}: {}", position, e));
                continue;
            }
        };

        match build(&object) {
            Ok(record) => result.push(record),
            Err(e) => {
                debug!("Skipping JSON element {}: {}", position, e);
                result.skip(format!("element {}: {}", position, e));
            }
        }
    }

    if let Some(tail) = unterminated {
        debug!("Skipping unterminated JSON element ({} bytes)", tail.len());
        result.skip("unterminated JSON element at end of input");
    }

    result
}

/// Scalar field as text; strings, numbers and booleans are accepted
fn required_field(object: &Map<String, Value>, name: &str) -> Result<String> {
    match object.get(name) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Number(value)) => Ok(value.to_string()),
        Some(Value::Bool(value)) => Ok(value.to_string()),
        Some(Value::Null) | None => Err(Error::invalid_record(format!(
            "missing field '{}'",
            name
        ))),
        Some(_) => Err(Error::invalid_record(format!(
            "field '{}' is not a scalar",
            name
        ))),
    }
}
