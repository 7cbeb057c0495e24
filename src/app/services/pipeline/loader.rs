//! Streaming product load
//!
//! Uses the same accumulator and permit discipline as enrichment, but each
//! chunk task ends in one pipelined `set_many` instead of producing output.
//! The first store failure aborts every remaining chunk task.

use super::stats::LoadStats;
use crate::app::models::Chunk;
use crate::app::services::chunk_accumulator::ChunkAccumulator;
use crate::app::services::format_parser::{FileFormat, ParseStats};
use crate::app::services::product_store::ProductStore;
use crate::config::PipelineConfig;
use crate::{Error, Result};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::pin::pin;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

struct ChunkLoad {
    index: u64,
    parse: ParseStats,
    stored: usize,
}

/// Stream product mappings from `input` into `store`
pub async fn load_products<S, E>(
    input: S,
    format: FileFormat,
    store: Arc<dyn ProductStore>,
    config: &PipelineConfig,
    cancel: CancellationToken,
) -> Result<LoadStats>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send,
    E: std::fmt::Display,
{
    let started = Instant::now();
    let mut loader = Loader {
        format,
        store,
        semaphore: Arc::new(Semaphore::new(config.max_concurrent_chunks.max(1))),
        tasks: JoinSet::new(),
        stats: LoadStats::default(),
    };

    info!(
        "Product load started: {} input via {} store",
        format,
        loader.store.backend_type()
    );

    let result = loader.run(input, config, &cancel).await;
    loader.stats.elapsed_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(()) => {
            info!("{}", loader.stats.summary());
            Ok(loader.stats)
        }
        Err(e) => {
            loader.tasks.abort_all();
            error!(
                "Product load failed after {} products: {}",
                loader.stats.products_stored, e
            );
            Err(e)
        }
    }
}

struct Loader {
    format: FileFormat,
    store: Arc<dyn ProductStore>,
    semaphore: Arc<Semaphore>,
    tasks: JoinSet<Result<ChunkLoad>>,
    stats: LoadStats,
}

impl Loader {
    async fn run<S, E>(
        &mut self,
        input: S,
        config: &PipelineConfig,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: std::fmt::Display,
    {
        let mut input = pin!(input);
        let mut accumulator = ChunkAccumulator::new(self.format, config.chunk_threshold);

        loop {
            let next = tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    return Err(Error::processing_interrupted("product load cancelled"));
                }

                Some(joined) = self.tasks.join_next() => {
                    self.absorb(joined)?;
                    continue;
                }

                next = input.next() => next,
            };

            match next {
                Some(Ok(fragment)) => {
                    self.stats.bytes_received += fragment.len() as u64;
                    for chunk in accumulator.push(&fragment) {
                        self.dispatch(chunk, cancel).await?;
                    }
                }
                Some(Err(e)) => return Err(Error::stream_read(e.to_string())),
                None => break,
            }
        }

        if let Some(chunk) = accumulator.finish() {
            self.dispatch(chunk, cancel).await?;
        }

        while !self.tasks.is_empty() {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    return Err(Error::processing_interrupted("product load cancelled"));
                }

                Some(joined) = self.tasks.join_next() => self.absorb(joined)?,
            }
        }

        Ok(())
    }

    /// Wait for a permit and spawn the chunk's parse-and-store task
    async fn dispatch(&mut self, chunk: Chunk, cancel: &CancellationToken) -> Result<()> {
        let permit = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(Error::processing_interrupted("product load cancelled"));
            }
            permit = self.semaphore.clone().acquire_owned() => permit
                .map_err(|e| Error::processing_interrupted(format!("chunk permits closed: {}", e)))?,
        };

        self.stats.chunks += 1;
        let format = self.format;
        let store = self.store.clone();
        debug!("Dispatching product chunk {} ({} bytes)", chunk.index, chunk.len());

        self.tasks.spawn(async move {
            let _permit = permit;
            let parsed = format.parse_product_mappings(&chunk.text);
            if !parsed.records.is_empty() {
                store.set_many(&parsed.records).await?;
            }
            Ok(ChunkLoad {
                index: chunk.index,
                stored: parsed.records.len(),
                parse: parsed.stats,
            })
        });
        Ok(())
    }

    fn absorb(&mut self, joined: std::result::Result<Result<ChunkLoad>, JoinError>) -> Result<()> {
        let load = joined.map_err(|e| Error::task_failed(e.to_string()))??;

        if load.parse.records_skipped > 0 {
            warn!(
                "Product chunk {}: skipped {} malformed records",
                load.index, load.parse.records_skipped
            );
        }
        if load.stored > 0 {
            self.stats.store_writes += 1;
        }
        self.stats.products_stored += load.stored;
        self.stats.parse.merge(&load.parse);
        debug!("Stored product chunk {} ({} mappings)", load.index, load.stored);
        Ok(())
    }
}
