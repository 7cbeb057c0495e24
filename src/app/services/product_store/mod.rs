//! Key-value store client for product mappings
//!
//! The pipeline talks to the store only through [`ProductStore`]: one
//! pipelined multi-set per product chunk and one multi-get per trade chunk.
//! Implementations must be safe to share across every concurrently running
//! chunk task.
//!
//! - [`redis_store`] - production backend over a multiplexed Redis connection
//! - [`memory_store`] - in-process backend for local runs and tests

pub mod memory_store;
pub mod redis_store;

#[cfg(test)]
pub mod tests;

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;

use crate::Result;
use crate::app::models::ProductMapping;
use async_trait::async_trait;

/// Batched access to product id to name mappings
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Write all mappings in one round trip; last write wins per key
    async fn set_many(&self, mappings: &[ProductMapping]) -> Result<()>;

    /// Resolve keys in one round trip, preserving key order
    ///
    /// Absent keys map to `None`, which is distinct from a stored empty
    /// string. An empty key list returns immediately.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>>;

    /// Backend name for logging
    fn backend_type(&self) -> &'static str;
}
