//! Main record processor implementation
//!
//! This module contains the RecordProcessor, which runs the per-chunk
//! enrichment steps: deduplicate product keys, resolve them with a single
//! batched store lookup, and merge the names back into the trades.

use crate::app::models::TradeRecord;
use crate::app::services::product_store::ProductStore;
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{
    deduplication::unique_product_keys,
    enrichment::{enrich_trades, name_map},
    stats::{ProcessingResult, ProcessingStats},
};

/// Record processor for trade enrichment
///
/// Cheap to clone: every chunk task holds its own copy sharing one store.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use trade_enricher::app::services::product_store::MemoryStore;
/// use trade_enricher::app::services::record_processor::RecordProcessor;
/// use trade_enricher::TradeRecord;
///
/// # async fn example() -> trade_enricher::Result<()> {
/// let store = Arc::new(MemoryStore::with_products([("1", "Widget")]));
/// let processor = RecordProcessor::new(store, None);
///
/// let trades = vec![TradeRecord::new("20240315", "1", "USD", "100.50")?];
/// let result = processor.process_trades(trades).await?;
/// assert_eq!(result.trades[0].product_name(), "Widget");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RecordProcessor {
    store: Arc<dyn ProductStore>,
    lookup_timeout: Option<Duration>,
}

impl RecordProcessor {
    /// Create a processor; `lookup_timeout` bounds each batched lookup
    pub fn new(store: Arc<dyn ProductStore>, lookup_timeout: Option<Duration>) -> Self {
        Self {
            store,
            lookup_timeout,
        }
    }

    /// Enrich a batch of trades with one store round trip
    ///
    /// # Errors
    ///
    /// Store failures are returned unchanged. A lookup exceeding the timeout
    /// returns [`Error::LookupTimeout`], which callers treat as fatal for the
    /// batch only.
    pub async fn process_trades(&self, trades: Vec<TradeRecord>) -> Result<ProcessingResult> {
        let mut stats = ProcessingStats::new();
        stats.total_input = trades.len();

        if trades.is_empty() {
            return Ok(ProcessingResult::new(Vec::new(), stats));
        }

        let keys = unique_product_keys(&trades);
        stats.unique_keys = keys.len();

        let lookups = self.lookup(&keys).await?;
        stats.lookups = 1;

        let names = name_map(lookups);
        let enriched = enrich_trades(trades, &names, &mut stats);

        debug!("{}", stats.summary());
        Ok(ProcessingResult::new(enriched, stats))
    }

    async fn lookup(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>> {
        match self.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, self.store.get_many(keys))
                .await
                .map_err(|_| Error::lookup_timeout(keys.len(), limit.as_millis() as u64))?,
            None => self.store.get_many(keys).await,
        }
    }

    pub fn backend_type(&self) -> &'static str {
        self.store.backend_type()
    }
}
