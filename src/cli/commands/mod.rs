//! Command implementations for the trade enricher CLI
//!
//! Each subcommand lives in its own module:
//! - `serve`: run the HTTP service until shutdown
//! - `load_products`: stream a product file into the store
//! - `enrich`: stream a trade file through the pipeline

pub mod enrich;
pub mod load_products;
pub mod serve;
pub mod shared;

use crate::cli::args::{Args, Commands};
use crate::{Error, Result};
use tokio_util::sync::CancellationToken;

/// Dispatch to the subcommand handler
///
/// `cancel` is cancelled on Ctrl-C; every handler stops its work when it fires.
pub async fn run(args: Args, cancel: CancellationToken) -> Result<()> {
    match args.command {
        Some(Commands::Serve(serve_args)) => serve::run_serve(serve_args, cancel).await,
        Some(Commands::LoadProducts(load_args)) => {
            load_products::run_load_products(load_args, cancel).await
        }
        Some(Commands::Enrich(enrich_args)) => enrich::run_enrich(enrich_args, cancel).await,
        None => Err(Error::configuration("no command given")),
    }
}
