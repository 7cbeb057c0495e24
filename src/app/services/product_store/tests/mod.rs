//! Tests for the product store backends
//!
//! The Redis backend needs a live server, so only the in-memory backend is
//! exercised here; both share the trait contract checked below.


pub use super::{MemoryStore, ProductStore};
pub use crate::app::models::ProductMapping;

pub fn mappings(pairs: &[(&str, &str)]) -> Vec<ProductMapping> {
    pairs
        .iter()
        .map(|(id, name)| ProductMapping::new(*id, *name).unwrap())
        .collect()
}

pub fn keys(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
