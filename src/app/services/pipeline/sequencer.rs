//! Reordering buffer for chunk outputs
//!
//! Chunks finish in any order. The sequencer holds finished outputs keyed by
//! chunk index and releases them only as an unbroken run starting at the
//! next expected index, which restores input order on the outgoing stream.

use std::collections::BTreeMap;

#[derive(Debug)]
pub struct Sequencer<T> {
    next_expected: u64,
    pending: BTreeMap<u64, T>,
}

impl<T> Sequencer<T> {
    pub fn new() -> Self {
        Self {
            next_expected: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Add a finished item and return every item now ready, in index order
    pub fn insert(&mut self, index: u64, item: T) -> Vec<T> {
        self.pending.insert(index, item);

        let mut ready = Vec::new();
        while let Some(item) = self.pending.remove(&self.next_expected) {
            ready.push(item);
            self.next_expected += 1;
        }
        ready
    }

    pub fn next_expected(&self) -> u64 {
        self.next_expected
    }

    /// Items held back waiting for an earlier index
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for Sequencer<T> {
    fn default() -> Self {
        Self::new()
    }
}
