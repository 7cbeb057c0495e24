//! Streaming trade enrichment
//!
//! [`enrich_stream`] turns an incoming byte stream into an outgoing stream of
//! enriched, serialized trades. Three kinds of task cooperate:
//!
//! - a single reader task that pulls input fragments and feeds the
//!   [`ChunkAccumulator`], sending finished chunks through a bounded channel
//! - one task per chunk, which parses, deduplicates, looks up, merges and
//!   encodes its records
//! - the coordinator, which hands a semaphore permit to each chunk before
//!   spawning it, collects finished chunks and writes their output downstream
//!
//! A chunk keeps its permit until its output has been written to the outgoing
//! channel, so at most `max_concurrent_chunks` chunks are ever held in memory,
//! whether running or waiting in the sequencer for an earlier chunk.

use super::emitter::OutputEmitter;
use super::sequencer::Sequencer;
use super::stats::{RunState, RunStats};
use super::OutputOrdering;
use crate::app::models::Chunk;
use crate::app::services::chunk_accumulator::{ChunkAccumulator, ChunkThreshold};
use crate::app::services::format_parser::{FileFormat, ParseStats};
use crate::app::services::product_store::ProductStore;
use crate::app::services::record_processor::{ProcessingStats, RecordProcessor};
use crate::config::PipelineConfig;
use crate::constants::{CHUNK_CHANNEL_CAPACITY, OUTPUT_CHANNEL_CAPACITY};
use crate::{Error, Result};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::pin::{Pin, pin};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info, warn};

/// Outgoing stream of serialized enriched trades
///
/// Yields byte units in order. A failed run ends with a single `Err` item.
/// Dropping the stream cancels the run and aborts every in-flight chunk.
pub struct EnrichmentStream {
    receiver: mpsc::Receiver<Result<Bytes>>,
    stats: Arc<Mutex<RunStats>>,
    _cancel_on_drop: DropGuard,
}

impl EnrichmentStream {
    /// Get current run statistics
    pub async fn stats(&self) -> RunStats {
        self.stats.lock().await.clone()
    }

    /// Drain the stream into `writer` and return the final statistics
    pub async fn write_to<W>(mut self, writer: &mut W) -> Result<RunStats>
    where
        W: AsyncWrite + Unpin,
    {
        while let Some(unit) = self.next().await {
            let unit = unit?;
            writer
                .write_all(&unit)
                .await
                .map_err(|e| Error::io("failed to write enriched output", e))?;
        }
        writer
            .flush()
            .await
            .map_err(|e| Error::io("failed to flush enriched output", e))?;
        Ok(self.stats().await)
    }
}

impl Stream for EnrichmentStream {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Start enriching `input` and return the outgoing stream
///
/// Must be called from within a Tokio runtime. `cancel` stops the run from
/// outside; the stream ends with an `Err` item if it fires.
pub fn enrich_stream<S, E>(
    input: S,
    format: FileFormat,
    store: Arc<dyn ProductStore>,
    config: &PipelineConfig,
    cancel: CancellationToken,
) -> EnrichmentStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let (output_tx, output_rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);
    let stats = Arc::new(Mutex::new(RunStats::default()));
    let run_token = cancel.child_token();

    let coordinator = Coordinator {
        format,
        threshold: config.chunk_threshold,
        max_concurrent: config.max_concurrent_chunks.max(1),
        ordering: config.ordering,
        processor: RecordProcessor::new(store, config.lookup_timeout()),
        emitter: OutputEmitter::new(config.output_format, config.emit_batch_size),
        stats: stats.clone(),
        cancel: run_token.clone(),
        output: output_tx,
    };
    tokio::spawn(coordinator.run(input));

    EnrichmentStream {
        receiver: output_rx,
        stats,
        _cancel_on_drop: run_token.drop_guard(),
    }
}

/// Output of one chunk task
struct ChunkOutcome {
    index: u64,
    permit: OwnedSemaphorePermit,
    parse: ParseStats,
    result: Result<ChunkOutput>,
}

struct ChunkOutput {
    units: Vec<Bytes>,
    records: usize,
    processing: ProcessingStats,
}

/// A finished chunk waiting to be written downstream
struct ReadyChunk {
    index: u64,
    units: Vec<Bytes>,
    records: usize,
    timed_out: bool,
    // Released once the units are written
    _permit: OwnedSemaphorePermit,
}

struct Coordinator {
    format: FileFormat,
    threshold: ChunkThreshold,
    max_concurrent: usize,
    ordering: OutputOrdering,
    processor: RecordProcessor,
    emitter: OutputEmitter,
    stats: Arc<Mutex<RunStats>>,
    cancel: CancellationToken,
    output: mpsc::Sender<Result<Bytes>>,
}

impl Coordinator {
    async fn run<S, E>(self, input: S)
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let started = Instant::now();
        self.set_state(RunState::Accumulating).await;
        info!(
            "Enrichment run started: {} input, {} concurrent chunks, {:?} ordering",
            self.format, self.max_concurrent, self.ordering
        );

        let (chunk_tx, mut chunk_rx) = mpsc::channel(CHUNK_CHANNEL_CAPACITY);
        let reader = tokio::spawn(read_input(
            input,
            self.format,
            self.threshold,
            chunk_tx,
            self.stats.clone(),
            self.cancel.clone(),
        ));

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks: JoinSet<ChunkOutcome> = JoinSet::new();
        let mut sequencer: Sequencer<ReadyChunk> = Sequencer::new();
        let mut input_done = false;

        let outcome: Result<()> = loop {
            if input_done && tasks.is_empty() {
                break Ok(());
            }

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    break Err(Error::processing_interrupted("enrichment run cancelled"));
                }

                Some(joined) = tasks.join_next() => {
                    if let Err(e) = self.complete_chunk(joined, &mut sequencer).await {
                        break Err(e);
                    }
                }

                dispatch = next_dispatch(&semaphore, &mut chunk_rx), if !input_done => {
                    match dispatch {
                        Some((permit, Ok(chunk))) => self.spawn_chunk(&mut tasks, permit, chunk),
                        Some((_, Err(e))) => break Err(e),
                        None => {
                            input_done = true;
                            self.set_state(RunState::Draining).await;
                            debug!("Input exhausted, draining {} in-flight chunks", tasks.len());
                        }
                    }
                }
            }
        };

        let mut stats = self.stats.lock().await;
        stats.elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => {
                stats.state = RunState::Done;
                info!("{}", stats.summary());
            }
            Err(e) => {
                tasks.abort_all();
                reader.abort();
                stats.state = RunState::Failed;
                stats.error = Some(e.to_string());
                error!("Enrichment run failed after {} chunks: {}", stats.chunks_emitted, e);
                drop(stats);
                // The consumer may already be gone
                let _ = self.output.send(Err(e)).await;
            }
        }
    }

    fn spawn_chunk(
        &self,
        tasks: &mut JoinSet<ChunkOutcome>,
        permit: OwnedSemaphorePermit,
        chunk: Chunk,
    ) {
        let format = self.format;
        let processor = self.processor.clone();
        let emitter = self.emitter;
        let index = chunk.index;

        debug!(
            "Dispatching chunk {} ({} bytes, {} in flight)",
            index,
            chunk.len(),
            tasks.len() + 1
        );

        tasks.spawn(async move {
            let parsed = format.parse_trade_records(&chunk.text);
            let parse = parsed.stats;
            let result = async {
                let processed = processor.process_trades(parsed.records).await?;
                let units = emitter.encode(&processed.trades)?;
                Ok::<_, Error>(ChunkOutput {
                    units,
                    records: processed.trades.len(),
                    processing: processed.stats,
                })
            }
            .await;

            ChunkOutcome {
                index,
                permit,
                parse,
                result,
            }
        });
    }

    async fn complete_chunk(
        &self,
        joined: std::result::Result<ChunkOutcome, JoinError>,
        sequencer: &mut Sequencer<ReadyChunk>,
    ) -> Result<()> {
        let ChunkOutcome {
            index,
            permit,
            parse,
            result,
        } = joined.map_err(|e| Error::task_failed(e.to_string()))?;

        if parse.records_skipped > 0 {
            warn!(
                "Chunk {}: skipped {} malformed records",
                index, parse.records_skipped
            );
        }

        let ready = {
            let mut stats = self.stats.lock().await;
            stats.parse.merge(&parse);

            match result {
                Ok(output) => {
                    stats.processing.merge(&output.processing);
                    ReadyChunk {
                        index,
                        units: output.units,
                        records: output.records,
                        timed_out: false,
                        _permit: permit,
                    }
                }
                Err(e @ Error::LookupTimeout { .. }) => {
                    warn!("Dropping chunk {}: {}", index, e);
                    stats.chunks_timed_out += 1;
                    ReadyChunk {
                        index,
                        units: Vec::new(),
                        records: 0,
                        timed_out: true,
                        _permit: permit,
                    }
                }
                Err(e) => return Err(e),
            }
        };

        let releasable = match self.ordering {
            OutputOrdering::Preserve => sequencer.insert(index, ready),
            OutputOrdering::Completion => vec![ready],
        };

        for chunk in releasable {
            self.emit(chunk).await?;
        }
        Ok(())
    }

    async fn emit(&self, chunk: ReadyChunk) -> Result<()> {
        let mut bytes = 0u64;
        let units = chunk.units.len();

        for unit in chunk.units {
            bytes += unit.len() as u64;
            self.output
                .send(Ok(unit))
                .await
                .map_err(|_| Error::processing_interrupted("output stream closed by consumer"))?;
        }

        if chunk.timed_out {
            return Ok(());
        }

        let mut stats = self.stats.lock().await;
        stats.chunks_emitted += 1;
        stats.records_emitted += chunk.records;
        stats.units_emitted += units;
        stats.bytes_emitted += bytes;
        debug!(
            "Emitted chunk {}: {} records in {} units",
            chunk.index, chunk.records, units
        );
        Ok(())
    }

    async fn set_state(&self, state: RunState) {
        let mut stats = self.stats.lock().await;
        if stats.state.can_transition_to(state) {
            stats.state = state;
        }
    }
}

/// Wait for a free permit, then for the next chunk
///
/// Cancel-safe: dropping the future releases any acquired permit and loses
/// no chunk.
async fn next_dispatch(
    semaphore: &Arc<Semaphore>,
    chunks: &mut mpsc::Receiver<Result<Chunk>>,
) -> Option<(OwnedSemaphorePermit, Result<Chunk>)> {
    let permit = semaphore.clone().acquire_owned().await.ok()?;
    let chunk = chunks.recv().await?;
    Some((permit, chunk))
}

/// Read the input sequentially and send record-aligned chunks
async fn read_input<S, E>(
    input: S,
    format: FileFormat,
    threshold: ChunkThreshold,
    chunks: mpsc::Sender<Result<Chunk>>,
    stats: Arc<Mutex<RunStats>>,
    cancel: CancellationToken,
) where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let mut input = pin!(input);
    let mut accumulator = ChunkAccumulator::new(format, threshold);

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return,
            next = input.next() => next,
        };

        match next {
            Some(Ok(fragment)) => {
                stats.lock().await.bytes_received += fragment.len() as u64;
                for chunk in accumulator.push(&fragment) {
                    if !send_chunk(&chunks, chunk, &stats).await {
                        return;
                    }
                }
            }
            Some(Err(e)) => {
                warn!("Input stream failed after {} chunks: {}", accumulator.chunks_emitted(), e);
                let _ = chunks.send(Err(Error::stream_read(e.to_string()))).await;
                return;
            }
            None => break,
        }
    }

    if let Some(chunk) = accumulator.finish() {
        send_chunk(&chunks, chunk, &stats).await;
    }
    debug!("Input complete: {} chunks", accumulator.chunks_emitted());
}

async fn send_chunk(
    chunks: &mpsc::Sender<Result<Chunk>>,
    chunk: Chunk,
    stats: &Arc<Mutex<RunStats>>,
) -> bool {
    stats.lock().await.chunks_accumulated += 1;
    chunks.send(Ok(chunk)).await.is_ok()
}
