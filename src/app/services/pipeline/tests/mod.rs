//! Tests for the streaming pipeline
//!
//! Input streams are built from in-memory fragments so each test controls
//! exactly where the byte boundaries fall.

pub mod emitter_tests;
pub mod sequencer_tests;

pub use super::{
    EmitFormat, EnrichmentStream, LoadStats, OutputEmitter, OutputOrdering, RunState, RunStats,
    Sequencer, enrich_stream, load_products,
};
pub use crate::app::models::{EnrichedTrade, ProductMapping, TradeRecord};
pub use crate::app::services::chunk_accumulator::ChunkThreshold;
pub use crate::app::services::format_parser::FileFormat;
pub use crate::app::services::product_store::{MemoryStore, ProductStore};
pub use crate::config::PipelineConfig;
pub use crate::constants::MISSING_PRODUCT_NAME;
pub use crate::{Error, Result};
pub use async_trait::async_trait;
pub use bytes::Bytes;
pub use futures::{Stream, StreamExt};
pub use std::sync::Arc;
pub use std::sync::atomic::{AtomicUsize, Ordering};
pub use std::time::Duration;
pub use tokio_util::sync::CancellationToken;

/// Split `input` into fragments of at most `size` bytes
pub fn fragments(input: &str, size: usize) -> Vec<std::result::Result<Bytes, std::io::Error>> {
    input
        .as_bytes()
        .chunks(size.max(1))
        .map(|fragment| Ok(Bytes::copy_from_slice(fragment)))
        .collect()
}

/// Stream `input` in fragments of at most `size` bytes
pub fn byte_stream(
    input: &str,
    size: usize,
) -> impl Stream<Item = std::result::Result<Bytes, std::io::Error>> + Send + 'static {
    futures::stream::iter(fragments(input, size))
}

/// Build `count` CSV trade lines cycling through `distinct` product keys
pub fn trade_lines(count: usize, distinct: usize) -> String {
    (0..count)
        .map(|i| format!("20240315,{},USD,{}.00\n", i % distinct, i))
        .collect()
}

/// Store holding `Product <key>` for keys `0..count`
pub fn numbered_store(count: usize) -> MemoryStore {
    MemoryStore::with_products((0..count).map(|i| (i.to_string(), format!("Product {}", i))))
}

/// Config cutting a chunk every `records` records
pub fn records_config(records: usize) -> PipelineConfig {
    PipelineConfig::default().with_chunk_threshold(ChunkThreshold::Records(records))
}

/// Drain an enrichment stream, returning the output text and the error that ended it
pub async fn collect_output(mut stream: EnrichmentStream) -> (String, Option<Error>, RunStats) {
    let mut output = Vec::new();
    let mut failure = None;
    while let Some(item) = stream.next().await {
        match item {
            Ok(unit) => output.extend_from_slice(&unit),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }
    let stats = stream.stats().await;
    (String::from_utf8(output).unwrap(), failure, stats)
}

/// Run a full enrichment and return its output text and statistics
pub async fn enrich_text(
    input: &str,
    fragment_size: usize,
    format: FileFormat,
    store: Arc<dyn ProductStore>,
    config: &PipelineConfig,
) -> (String, Option<Error>, RunStats) {
    let stream = enrich_stream(
        byte_stream(input, fragment_size),
        format,
        store,
        config,
        CancellationToken::new(),
    );
    collect_output(stream).await
}

/// Store that tracks the peak number of round trips in flight at once
pub struct GaugedStore {
    inner: MemoryStore,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    hold: Duration,
}

impl GaugedStore {
    pub fn new(inner: MemoryStore, hold: Duration) -> Self {
        Self {
            inner,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            hold,
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn gauged<T>(&self, call: impl std::future::Future<Output = T>) -> T {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.hold).await;
        let result = call.await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl ProductStore for GaugedStore {
    async fn set_many(&self, mappings: &[ProductMapping]) -> Result<()> {
        self.gauged(self.inner.set_many(mappings)).await
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>> {
        self.gauged(self.inner.get_many(keys)).await
    }

    fn backend_type(&self) -> &'static str {
        "gauged"
    }
}
