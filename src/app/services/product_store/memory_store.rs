//! In-process product store
//!
//! Behaves like the Redis backend for the operations the pipeline uses and
//! counts its round trips. A store built with [`MemoryStore::recording`] also
//! keeps the key list of every lookup, which grows with the input and is only
//! meant for tests. Latency and failures can be injected.

use super::ProductStore;
use crate::app::models::ProductMapping;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    lookups: Option<Mutex<Vec<Vec<String>>>>,
    set_calls: AtomicUsize,
    get_calls: AtomicUsize,
    latency: Option<Duration>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `(id, name)` pairs
    pub fn with_products<I, K, V>(products: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = products
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RwLock::new(entries),
            ..Self::default()
        }
    }

    /// Keep the key list of every `get_many` call
    pub fn recording(mut self) -> Self {
        self.lookups = Some(Mutex::new(Vec::new()));
        self
    }

    /// Delay every round trip by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make subsequent `get_many` calls fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `set_many` calls fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Key lists of every `get_many` round trip, in call order
    ///
    /// Always empty unless the store was built with [`MemoryStore::recording`].
    pub async fn lookups(&self) -> Vec<Vec<String>> {
        match &self.lookups {
            Some(lookups) => lookups.lock().await.clone(),
            None => Vec::new(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn round_trip(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn set_many(&self, mappings: &[ProductMapping]) -> Result<()> {
        if mappings.is_empty() {
            return Ok(());
        }

        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await;

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::store("injected write failure"));
        }

        let mut entries = self.entries.write().await;
        for mapping in mappings {
            entries.insert(mapping.id.clone(), mapping.name.clone());
        }
        Ok(())
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(lookups) = &self.lookups {
            lookups.lock().await.push(keys.to_vec());
        }
        self.round_trip().await;

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::store("injected read failure"));
        }

        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .map(|key| (key.clone(), entries.get(key).cloned()))
            .collect())
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}
