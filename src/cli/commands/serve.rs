//! Serve command: run the HTTP service

use super::shared::{build_store, load_configuration, setup_logging};
use crate::Result;
use crate::app::adapters::http;
use crate::cli::args::ServeArgs;
use colored::*;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Run the HTTP service until `cancel` fires
pub async fn run_serve(args: ServeArgs, cancel: CancellationToken) -> Result<()> {
    setup_logging(&args.common)?;
    args.common.validate()?;

    let mut config = load_configuration(&args.common)?;
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
        config.validate()?;
    }

    let store = build_store(&config, &args.common).await?;

    if args.common.show_progress() {
        eprintln!(
            "{} listening on {} ({} store)",
            "trade-enricher".bright_green().bold(),
            config.server.bind.bright_cyan(),
            store.backend_type()
        );
    }

    http::serve(&config, store, cancel).await?;
    info!("Shutdown complete");
    Ok(())
}
