//! Shared components for CLI commands
//!
//! Logging setup, layered configuration, store construction, input and output
//! plumbing and the colored run summaries used by every subcommand.

use crate::app::services::chunk_accumulator::ChunkThreshold;
use crate::app::services::pipeline::{LoadStats, RunStats};
use crate::app::services::product_store::{MemoryStore, ProductStore, RedisStore};
use crate::cli::args::CommonArgs;
use crate::config::Config;
use crate::constants::{PROGRESS_TICK_MS, READ_BUFFER_SIZE, format_bytes};
use crate::{Error, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

/// Boxed reader over a file or stdin
pub type InputReader = Box<dyn AsyncRead + Send + Unpin>;

/// Set up structured logging on stderr
pub fn setup_logging(args: &CommonArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    // Create filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("trade_enricher={}", log_level)));

    let initialized = if args.quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        // Standard logging with uptime timestamps
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    initialized
        .map_err(|e| Error::configuration(format!("failed to initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (file -> env -> args)
pub fn load_configuration(args: &CommonArgs) -> Result<Config> {
    info!("Loading configuration");

    let default_config_path = if args.config_file.is_none() {
        Config::default_config_path().ok()
    } else {
        None
    };

    let config_file = match &args.config_file {
        Some(path) => Some(path.as_path()),
        None => default_config_path
            .as_ref()
            .filter(|path| path.exists())
            .map(|path| path.as_path()),
    };

    if let Some(config_path) = config_file {
        info!("Using config file: {}", config_path.display());
    } else {
        info!("No config file found, using defaults and environment variables");
    }

    let mut config = Config::load_layered(config_file)?;

    apply_cli_overrides(&mut config, args);

    // Final validation
    config.validate()?;

    Ok(config)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(config: &mut Config, args: &CommonArgs) {
    if let Some(url) = &args.store_url {
        config.store.url = url.clone();
    }

    let pipeline = &mut config.pipeline;
    if let Some(permits) = args.concurrency {
        pipeline.max_concurrent_chunks = permits;
    }
    if let Some(bytes) = args.chunk_bytes {
        pipeline.chunk_threshold = ChunkThreshold::Bytes(bytes);
    }
    if let Some(records) = args.chunk_records {
        pipeline.chunk_threshold = ChunkThreshold::Records(records);
    }
    if let Some(batch_size) = args.emit_batch_size {
        pipeline.emit_batch_size = batch_size;
    }
    if let Some(timeout_ms) = args.lookup_timeout_ms {
        pipeline.lookup_timeout_ms = timeout_ms;
    }
    if let Some(ordering) = args.ordering {
        pipeline.ordering = ordering;
    }
}

/// Connect to Redis, or create an in-process store with `--memory-store`
pub async fn build_store(config: &Config, args: &CommonArgs) -> Result<Arc<dyn ProductStore>> {
    if args.memory_store {
        info!("Using in-memory product store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = RedisStore::connect(&config.store.url).await?;
    Ok(Arc::new(store))
}

/// Open `path`, or stdin when no path is given
pub async fn open_input(path: Option<&Path>) -> Result<InputReader> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(path).await.map_err(|e| {
                Error::io(format!("failed to open input file '{}'", path.display()), e)
            })?;
            debug!("Reading input from {}", path.display());
            Ok(Box::new(file))
        }
        None => {
            debug!("Reading input from stdin");
            Ok(Box::new(tokio::io::stdin()))
        }
    }
}

/// Byte stream over `reader` in fixed-size reads
pub fn input_stream(reader: InputReader) -> ReaderStream<InputReader> {
    ReaderStream::with_capacity(reader, READ_BUFFER_SIZE)
}

/// Create a spinner on stderr, hidden in quiet mode
pub fn create_spinner(message: &str, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
    spinner
}

/// Print the outcome of a product load to stderr
pub fn print_load_summary(stats: &LoadStats) {
    eprintln!();
    eprintln!("{}", "Product load complete".bright_green().bold());
    eprintln!(
        "  {} {}",
        "Products stored:".bright_white(),
        stats.products_stored.to_string().bright_cyan()
    );
    eprintln!(
        "  {} {} ({} writes)",
        "Chunks:".bright_white(),
        stats.chunks,
        stats.store_writes
    );
    print_skipped(stats.parse.records_skipped);
    eprintln!(
        "  {} {} in {}ms",
        "Input:".bright_white(),
        format_bytes(stats.bytes_received),
        stats.elapsed_ms
    );
}

/// Print the outcome of an enrichment run to stderr
pub fn print_run_summary(stats: &RunStats) {
    eprintln!();
    eprintln!("{}", "Enrichment complete".bright_green().bold());
    eprintln!(
        "  {} {}",
        "Records emitted:".bright_white(),
        stats.records_emitted.to_string().bright_cyan()
    );
    eprintln!(
        "  {} {} resolved, {} missing ({:.1}%)",
        "Lookups:".bright_white(),
        stats.processing.resolved,
        stats.processing.missing,
        stats.processing.resolution_rate()
    );
    print_skipped(stats.parse.records_skipped);
    if stats.chunks_timed_out > 0 {
        eprintln!(
            "  {} {}",
            "Chunks dropped on timeout:".bright_red(),
            stats.chunks_timed_out
        );
    }
    eprintln!(
        "  {} {} in, {} out, {:.0} records/s",
        "Throughput:".bright_white(),
        format_bytes(stats.bytes_received),
        format_bytes(stats.bytes_emitted),
        stats.records_per_second()
    );
}

fn print_skipped(skipped: usize) {
    if skipped > 0 {
        eprintln!(
            "  {} {}",
            "Malformed records skipped:".bright_yellow(),
            skipped
        );
    }
}
