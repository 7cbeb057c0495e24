//! Command-line argument definitions for the trade enricher
//!
//! This module defines the CLI interface using the clap derive API. Every
//! subcommand shares [`CommonArgs`], which carries the config file, store and
//! pipeline overrides and the logging flags.

use crate::app::services::format_parser::FileFormat;
use crate::app::services::pipeline::{EmitFormat, OutputOrdering};
use crate::{Error, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the trade enricher
///
/// Streams trade files through a product-name lookup in Redis, chunk by chunk,
/// without holding whole files in memory.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "trade-enricher",
    version,
    about = "Enrich trade files with product names from a key-value store",
    long_about = "Streams CSV, JSON or XML trade files through a bounded-concurrency pipeline that \
                  resolves each trade's product id to a name held in Redis. Product mappings are \
                  loaded the same way. Both flows are available from the command line and as an \
                  HTTP service."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run the HTTP service
    Serve(ServeArgs),
    /// Stream a product file into the store
    LoadProducts(LoadProductsArgs),
    /// Stream a trade file through the enrichment pipeline
    Enrich(EnrichArgs),
}

/// Options shared by every subcommand
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CommonArgs {
    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// ~/.config/trade-enricher/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Redis connection URL
    #[arg(long = "store-url", value_name = "URL", help = "Redis connection URL")]
    pub store_url: Option<String>,

    /// Use an in-process store instead of Redis
    ///
    /// Mappings live only as long as the process. Useful for trying the
    /// pipeline locally or serving a fixed product set loaded at runtime.
    #[arg(
        long = "memory-store",
        help = "Use an in-process store instead of Redis"
    )]
    pub memory_store: bool,

    /// Number of chunks processed concurrently
    #[arg(
        short = 'j',
        long = "concurrency",
        value_name = "COUNT",
        help = "Number of chunks processed concurrently"
    )]
    pub concurrency: Option<usize>,

    /// Cut a chunk once this many bytes are buffered
    #[arg(
        long = "chunk-bytes",
        value_name = "BYTES",
        conflicts_with = "chunk_records",
        help = "Cut a chunk once this many bytes are buffered"
    )]
    pub chunk_bytes: Option<usize>,

    /// Cut a chunk once this many records are buffered
    #[arg(
        long = "chunk-records",
        value_name = "COUNT",
        help = "Cut a chunk once this many records are buffered"
    )]
    pub chunk_records: Option<usize>,

    /// Enriched records per output write
    #[arg(
        long = "emit-batch-size",
        value_name = "COUNT",
        help = "Enriched records per output write"
    )]
    pub emit_batch_size: Option<usize>,

    /// Timeout for one batched lookup in milliseconds (0 disables)
    #[arg(
        long = "lookup-timeout-ms",
        value_name = "MS",
        help = "Timeout for one batched lookup in milliseconds (0 disables)"
    )]
    pub lookup_timeout_ms: Option<u64>,

    /// Cross-chunk output ordering
    #[arg(
        long = "ordering",
        value_name = "ORDERING",
        help = "Cross-chunk output ordering (preserve, completion)"
    )]
    pub ordering: Option<OutputOrdering>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings and hides progress.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the serve command
#[derive(Debug, Clone, Parser)]
pub struct ServeArgs {
    /// Socket address to listen on
    #[arg(
        short = 'b',
        long = "bind",
        value_name = "ADDR",
        help = "Socket address to listen on"
    )]
    pub bind: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the load-products command
#[derive(Debug, Clone, Parser)]
pub struct LoadProductsArgs {
    /// Input file format (csv, json, xml)
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub format: FileFormat,

    /// Product file to load; reads stdin if omitted
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the enrich command
#[derive(Debug, Clone, Parser)]
pub struct EnrichArgs {
    /// Input file format (csv, json, xml)
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub format: FileFormat,

    /// Trade file to enrich; reads stdin if omitted
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file; writes to stdout if omitted
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Encoding of enriched output (csv, json)
    #[arg(long = "output-format", value_name = "FORMAT")]
    pub output_format: Option<EmitFormat>,

    /// Product file loaded into the store before enriching
    ///
    /// Mostly useful with --memory-store, which otherwise starts empty.
    #[arg(long = "products", value_name = "FILE")]
    pub products: Option<PathBuf>,

    /// Format of the --products file; defaults to --format
    #[arg(long = "products-format", value_name = "FORMAT", requires = "products")]
    pub products_format: Option<FileFormat>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl CommonArgs {
    /// Validate arguments that clap cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        if self.concurrency == Some(0) {
            return Err(Error::configuration(
                "Concurrency must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress spinners (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl EnrichArgs {
    /// Format of the product preload file
    pub fn products_format(&self) -> FileFormat {
        self.products_format.unwrap_or(self.format)
    }

    pub fn validate(&self) -> Result<()> {
        self.common.validate()?;
        for path in [&self.input, &self.products].into_iter().flatten() {
            if !path.exists() {
                return Err(Error::configuration(format!(
                    "Input file does not exist: {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

impl LoadProductsArgs {
    pub fn validate(&self) -> Result<()> {
        self.common.validate()?;
        if let Some(input) = &self.input {
            if !input.exists() {
                return Err(Error::configuration(format!(
                    "Input file does not exist: {}",
                    input.display()
                )));
            }
        }
        Ok(())
    }
}
