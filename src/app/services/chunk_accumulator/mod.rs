//! Chunk accumulation over an unbounded byte stream
//!
//! Fragments arrive with arbitrary framing: a network read may end in the
//! middle of a record, or even in the middle of a multi-byte character. The
//! accumulator appends fragments to a buffer and, once the configured
//! threshold is reached, cuts everything up to the last complete record
//! boundary into a [`Chunk`]. The trailing partial record stays buffered and
//! becomes the head of the next chunk.
//!
//! Chunks are numbered from zero in arrival order. On end of input the
//! remainder is flushed by [`ChunkAccumulator::finish`] as a final, possibly
//! undersized chunk.

pub mod framing;

#[cfg(test)]
pub mod tests;

pub use framing::RecordFramer;

use crate::app::models::Chunk;
use crate::app::services::format_parser::FileFormat;
use crate::constants::DEFAULT_CHUNK_BYTES;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// When to cut a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkThreshold {
    /// Cut at the last record boundary once this many bytes are buffered
    Bytes(usize),
    /// Cut after this many complete records
    Records(usize),
}

impl ChunkThreshold {
    pub fn value(&self) -> usize {
        match self {
            ChunkThreshold::Bytes(n) | ChunkThreshold::Records(n) => *n,
        }
    }
}

impl Default for ChunkThreshold {
    fn default() -> Self {
        ChunkThreshold::Bytes(DEFAULT_CHUNK_BYTES)
    }
}

/// Groups byte fragments into record-aligned chunks
#[derive(Debug)]
pub struct ChunkAccumulator {
    framer: RecordFramer,
    threshold: ChunkThreshold,
    buffer: Vec<u8>,
    /// Bytes of `buffer` already fed to the framer
    scanned: usize,
    /// End offset of the last complete record in `buffer`
    last_boundary: Option<usize>,
    /// Complete records in `buffer[..last_boundary]`
    records: usize,
    next_index: u64,
}

impl ChunkAccumulator {
    pub fn new(format: FileFormat, threshold: ChunkThreshold) -> Self {
        Self {
            framer: RecordFramer::for_format(format),
            // A zero threshold would cut after every record anyway
            threshold: match threshold {
                ChunkThreshold::Bytes(0) => ChunkThreshold::Bytes(1),
                ChunkThreshold::Records(0) => ChunkThreshold::Records(1),
                other => other,
            },
            buffer: Vec::new(),
            scanned: 0,
            last_boundary: None,
            records: 0,
            next_index: 0,
        }
    }

    /// Append a fragment and return every chunk it completes
    pub fn push(&mut self, fragment: &[u8]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        self.buffer.extend_from_slice(fragment);

        while self.scanned < self.buffer.len() {
            let byte = self.buffer[self.scanned];
            self.scanned += 1;

            if self.framer.feed(byte) {
                self.records += 1;
                self.last_boundary = Some(self.scanned);

                if let ChunkThreshold::Records(limit) = self.threshold {
                    if self.records >= limit {
                        chunks.push(self.cut(self.scanned));
                        continue;
                    }
                }
            }

            if let ChunkThreshold::Bytes(limit) = self.threshold {
                if self.scanned >= limit {
                    if let Some(boundary) = self.last_boundary {
                        chunks.push(self.cut(boundary));
                    }
                }
            }
        }

        chunks
    }

    /// Flush whatever remains at end of input
    pub fn finish(&mut self) -> Option<Chunk> {
        if self.buffer.iter().all(|b| b.is_ascii_whitespace()) {
            self.buffer.clear();
            return None;
        }
        let end = self.buffer.len();
        Some(self.cut(end))
    }

    /// Bytes waiting for their record to complete
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Number of chunks emitted so far
    pub fn chunks_emitted(&self) -> u64 {
        self.next_index
    }

    fn cut(&mut self, end: usize) -> Chunk {
        let bytes: Vec<u8> = self.buffer.drain(..end).collect();
        self.scanned -= end;
        self.last_boundary = None;

        let records = std::mem::take(&mut self.records);
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };

        let chunk = Chunk::new(self.next_index, text, records);
        self.next_index += 1;
        debug!(
            "Accumulated chunk {} ({} bytes, {} records, {} bytes carried over)",
            chunk.index,
            chunk.len(),
            chunk.records,
            self.buffer.len()
        );
        chunk
    }
}
