//! Record boundary detection per input format
//!
//! A framer is fed the input one byte at a time and reports when the byte
//! just consumed completes a record. Cutting the input only at these points
//! guarantees that no chunk ever holds half a record. All boundary bytes are
//! ASCII, so a cut never splits a UTF-8 sequence.

use crate::app::services::format_parser::FileFormat;
use crate::app::services::format_parser::json::{ElementScanner, ScanEvent};
use crate::constants::xml_elements;

/// Format-aware record boundary detector
#[derive(Debug, Clone)]
pub enum RecordFramer {
    /// One record per non-blank line; newlines inside quoted fields do not count
    Lines { has_content: bool, in_quotes: bool },
    /// One record per element-level JSON object
    JsonElements(ElementScanner),
    /// One record per closed `<product>` or `<trade>` element
    XmlElements { tail: Vec<u8> },
}

impl RecordFramer {
    pub fn for_format(format: FileFormat) -> Self {
        match format {
            FileFormat::Csv => RecordFramer::Lines {
                has_content: false,
                in_quotes: false,
            },
            FileFormat::Json => RecordFramer::JsonElements(ElementScanner::new()),
            FileFormat::Xml => RecordFramer::XmlElements { tail: Vec::new() },
        }
    }

    /// Consume one byte; true when it completes a record
    pub fn feed(&mut self, byte: u8) -> bool {
        match self {
            RecordFramer::Lines {
                has_content,
                in_quotes,
            } => {
                if byte == b'"' {
                    // An escaped `""` toggles twice and leaves the state unchanged
                    *in_quotes = !*in_quotes;
                    *has_content = true;
                    false
                } else if byte == b'\n' && !*in_quotes {
                    let complete = *has_content;
                    *has_content = false;
                    complete
                } else {
                    if !byte.is_ascii_whitespace() {
                        *has_content = true;
                    }
                    false
                }
            }
            RecordFramer::JsonElements(scanner) => scanner.feed(byte) == ScanEvent::ElementEnd,
            RecordFramer::XmlElements { tail } => {
                if tail.len() == XML_TAIL_LEN {
                    tail.remove(0);
                }
                tail.push(byte);
                byte == b'>' && closes_record_element(tail)
            }
        }
    }
}

// Long enough for "</product>"
const XML_TAIL_LEN: usize = xml_elements::PRODUCT.len() + 3;

fn closes_record_element(tail: &[u8]) -> bool {
    [xml_elements::PRODUCT, xml_elements::TRADE].iter().any(|name| {
        let closing = format!("</{}>", name);
        tail.ends_with(closing.as_bytes())
    })
}
