//! XML record parsing
//!
//! Products arrive as `<products><product>..</product></products>` and trades
//! as `<trades><trade>..</trade></trades>`. A chunk holds whole record
//! elements plus whatever envelope text happened to fall into it, so each
//! `<product>`/`<trade>` element is cut out and deserialized independently.

use super::stats::ParseResult;
use crate::app::models::{ProductMapping, TradeRecord};
use crate::constants::xml_elements;
use crate::{Error, Result};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
struct XmlProduct {
    #[serde(rename = "productId", default)]
    product_id: Option<String>,
    #[serde(rename = "productName", default)]
    product_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlTrade {
    #[serde(default)]
    date: Option<String>,
    #[serde(rename = "productId", default)]
    product_id: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    price: Option<String>,
}

/// A located record element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element<'a> {
    /// `<tag ...>...</tag>`
    Complete(&'a str),
    /// `<tag/>`
    SelfClosing(&'a str),
    /// Opening tag without a matching close before the end of the text
    Unterminated(&'a str),
}

/// Locate every `<tag>` element in the text, ignoring the envelope
pub fn record_elements<'a>(text: &'a str, tag: &str) -> Vec<Element<'a>> {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut elements = Vec::new();
    let mut position = 0;

    while let Some(found) = text[position..].find(&open) {
        let start = position + found;
        let after_name = start + open.len();

        match text[after_name..].chars().next() {
            Some(c) if c == '>' || c.is_whitespace() => {}
            Some('/') => {
                let end = text[after_name..]
                    .find('>')
                    .map(|offset| after_name + offset + 1)
                    .unwrap_or(text.len());
                elements.push(Element::SelfClosing(&text[start..end]));
                position = end;
                continue;
            }
            // Longer element name sharing the prefix, e.g. <trades>
            _ => {
                position = after_name;
                continue;
            }
        }

        // An opening tag that is itself self-closing after attributes
        let tag_end = text[after_name..].find('>').map(|offset| after_name + offset);
        if let Some(tag_end) = tag_end {
            if text[..tag_end].ends_with('/') {
                elements.push(Element::SelfClosing(&text[start..=tag_end]));
                position = tag_end + 1;
                continue;
            }
        }

        match text[after_name..].find(&close) {
            Some(offset) => {
                let end = after_name + offset + close.len();
                elements.push(Element::Complete(&text[start..end]));
                position = end;
            }
            None => {
                elements.push(Element::Unterminated(&text[start..]));
                break;
            }
        }
    }

    elements
}

/// Parse `<product>` elements
pub fn parse_product_mappings(text: &str) -> ParseResult<ProductMapping> {
    parse_elements(text, xml_elements::PRODUCT, |raw| {
        let product: XmlProduct = decode(raw)?;
        ProductMapping::new(
            required(product.product_id, "productId")?,
            required(product.product_name, "productName")?,
        )
    })
}

/// Parse `<trade>` elements
pub fn parse_trade_records(text: &str) -> ParseResult<TradeRecord> {
    parse_elements(text, xml_elements::TRADE, |raw| {
        let trade: XmlTrade = decode(raw)?;
        TradeRecord::new(
            required(trade.date, "date")?,
            required(trade.product_id, "productId")?,
            required(trade.currency, "currency")?,
            required(trade.price, "price")?,
        )
    })
}

fn parse_elements<T>(
    text: &str,
    tag: &str,
    build: impl Fn(&str) -> Result<T>,
) -> ParseResult<T> {
    let mut result = ParseResult::new();

    for (position, element) in record_elements(text, tag).into_iter().enumerate() {
        match element {
            Element::Complete(raw) => match build(raw) {
                Ok(record) => result.push(record),
                Err(e) => {
                    debug!("Skipping <{}> element {}: {}", tag, position, e);
                    result.skip(format!("<{}> element {}: {}", tag, position, e));
                }
            },
            Element::SelfClosing(_) => {
                result.skip(format!("<{}> element {} is empty", tag, position));
            }
            Element::Unterminated(raw) => {
                debug!("Skipping unterminated <{}> element ({} bytes)", tag, raw.len());
                result.skip(format!("<{}> element {} is unterminated", tag, position));
            }
        }
    }

    result
}

fn decode<'de, T: Deserialize<'de>>(raw: &'de str) -> Result<T> {
    quick_xml::de::from_str(raw).map_err(|e| Error::invalid_record(e.to_string()))
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::invalid_record(format!("missing element <{}>", name))),
    }
}
