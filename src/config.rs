//! Configuration management for the trade enricher
//!
//! Provides the configuration structures for the pipeline, the store
//! connection and the HTTP service, with layered loading: built-in defaults,
//! then an optional TOML file, then `TRADE_ENRICHER_*` environment variables.
//! CLI flags are applied last by the command layer.

use crate::app::services::chunk_accumulator::ChunkThreshold;
use crate::app::services::pipeline::{EmitFormat, OutputOrdering};
use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_BIND_ADDRESS, DEFAULT_EMIT_BATCH_SIZE,
    DEFAULT_LOOKUP_TIMEOUT_MS, DEFAULT_MAX_CONCURRENT_CHUNKS, DEFAULT_STORE_URL, ENV_PREFIX,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub store: StoreConfig,
    pub server: ServerConfig,
}

/// Chunking, concurrency and output settings shared by every run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// When the accumulator cuts a chunk
    pub chunk_threshold: ChunkThreshold,

    /// Chunks processed concurrently (semaphore permits)
    pub max_concurrent_chunks: usize,

    /// Enriched records per emitted output unit
    pub emit_batch_size: usize,

    /// Cross-chunk output ordering
    pub ordering: OutputOrdering,

    /// Per-lookup timeout in milliseconds; 0 disables the timeout
    pub lookup_timeout_ms: u64,

    /// Encoding of enriched output
    pub output_format: EmitFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_threshold: ChunkThreshold::default(),
            max_concurrent_chunks: DEFAULT_MAX_CONCURRENT_CHUNKS,
            emit_batch_size: DEFAULT_EMIT_BATCH_SIZE,
            ordering: OutputOrdering::default(),
            lookup_timeout_ms: DEFAULT_LOOKUP_TIMEOUT_MS,
            output_format: EmitFormat::default(),
        }
    }
}

impl PipelineConfig {
    /// Set the chunk threshold
    pub fn with_chunk_threshold(mut self, threshold: ChunkThreshold) -> Self {
        self.chunk_threshold = threshold;
        self
    }

    /// Set the number of concurrently processed chunks
    pub fn with_max_concurrent_chunks(mut self, permits: usize) -> Self {
        self.max_concurrent_chunks = permits;
        self
    }

    /// Set the number of records per output unit
    pub fn with_emit_batch_size(mut self, batch_size: usize) -> Self {
        self.emit_batch_size = batch_size;
        self
    }

    pub fn with_ordering(mut self, ordering: OutputOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_lookup_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.lookup_timeout_ms = timeout_ms;
        self
    }

    pub fn with_output_format(mut self, format: EmitFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Lookup timeout, or `None` when disabled
    pub fn lookup_timeout(&self) -> Option<Duration> {
        (self.lookup_timeout_ms > 0).then(|| Duration::from_millis(self.lookup_timeout_ms))
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_threshold.value() == 0 {
            return Err(Error::configuration("chunk threshold must be greater than 0"));
        }
        if self.max_concurrent_chunks == 0 {
            return Err(Error::configuration(
                "max_concurrent_chunks must be greater than 0",
            ));
        }
        if self.emit_batch_size == 0 {
            return Err(Error::configuration("emit_batch_size must be greater than 0"));
        }
        Ok(())
    }
}

/// Key-value store connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Redis connection URL
    pub url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_STORE_URL.to_string(),
        }
    }
}

/// HTTP service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind.parse().map_err(|e| {
            Error::configuration(format!("invalid bind address '{}': {}", self.bind, e))
        })
    }
}

impl Config {
    /// Default config file location: `<config dir>/trade-enricher/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| Error::configuration("could not determine the user config directory"))
    }

    /// Read a TOML config file; missing sections and keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("failed to read config file '{}'", path.display()), e)
        })?;
        toml::from_str(&text).map_err(|e| {
            Error::configuration(format!("invalid config file '{}': {}", path.display(), e))
        })
    }

    /// Defaults, then `config_file` if given, then process environment
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(std::env::vars())?;
        Ok(config)
    }

    /// Apply `TRADE_ENRICHER_*` variables from `vars`
    pub fn apply_env_overrides<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };

            match key {
                "STORE_URL" => self.store.url = value,
                "BIND" => self.server.bind = value,
                "CHUNK_BYTES" => {
                    self.pipeline.chunk_threshold = ChunkThreshold::Bytes(parse_env(&name, &value)?)
                }
                "CHUNK_RECORDS" => {
                    self.pipeline.chunk_threshold =
                        ChunkThreshold::Records(parse_env(&name, &value)?)
                }
                "MAX_CONCURRENT_CHUNKS" => {
                    self.pipeline.max_concurrent_chunks = parse_env(&name, &value)?
                }
                "EMIT_BATCH_SIZE" => self.pipeline.emit_batch_size = parse_env(&name, &value)?,
                "LOOKUP_TIMEOUT_MS" => self.pipeline.lookup_timeout_ms = parse_env(&name, &value)?,
                "ORDERING" => self.pipeline.ordering = parse_env(&name, &value)?,
                "OUTPUT_FORMAT" => self.pipeline.output_format = parse_env(&name, &value)?,
                _ => {
                    debug!("Ignoring unknown environment variable {}", name);
                    continue;
                }
            }
            debug!("Applied environment override {}", name);
        }
        Ok(())
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;
        if self.store.url.trim().is_empty() {
            return Err(Error::configuration("store url must not be empty"));
        }
        self.server.socket_addr()?;
        Ok(())
    }
}

fn parse_env<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::configuration(format!("invalid value '{}' for {}: {}", value, name, e)))
}
