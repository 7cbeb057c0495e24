//! Enrich command: stream a trade file through the pipeline
//!
//! Output goes to stdout or `--output`; progress and the run summary go to
//! stderr so they never mix with enriched records.

use super::shared::{
    InputReader, build_store, create_spinner, input_stream, load_configuration, open_input,
    print_run_summary, setup_logging,
};
use crate::app::services::pipeline::{enrich_stream, load_products};
use crate::app::services::product_store::ProductStore;
use crate::cli::args::EnrichArgs;
use crate::config::PipelineConfig;
use crate::{Error, Result};
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::info;

type OutputWriter = BufWriter<Box<dyn AsyncWrite + Send + Unpin>>;

pub async fn run_enrich(args: EnrichArgs, cancel: CancellationToken) -> Result<()> {
    setup_logging(&args.common)?;
    args.validate()?;

    let mut config = load_configuration(&args.common)?;
    if let Some(output_format) = args.output_format {
        config.pipeline.output_format = output_format;
    }

    let store = build_store(&config, &args.common).await?;

    if let Some(products) = &args.products {
        preload_products(products, &args, store.clone(), &config.pipeline, &cancel).await?;
    }

    let reader = open_input(args.input.as_deref()).await?;
    let mut writer = open_output(args.output.as_deref()).await?;
    let spinner = create_spinner("Enriching trades...", args.common.show_progress());

    let mut stream = enrich_stream(
        input_stream(reader),
        args.format,
        store,
        &config.pipeline,
        cancel,
    );

    let mut written = 0usize;
    while let Some(unit) = stream.next().await {
        let unit = match unit {
            Ok(unit) => unit,
            Err(e) => {
                spinner.abandon_with_message("Enrichment failed");
                writer.flush().await.ok();
                return Err(e);
            }
        };
        writer
            .write_all(&unit)
            .await
            .map_err(|e| Error::io("failed to write enriched output", e))?;
        written += 1;
        if written % 16 == 0 {
            let stats = stream.stats().await;
            spinner.set_message(format!("Enriching trades... {} records", stats.records_emitted));
        }
    }

    writer
        .flush()
        .await
        .map_err(|e| Error::io("failed to flush enriched output", e))?;
    spinner.finish_and_clear();

    let stats = stream.stats().await;
    info!("{}", stats.summary());
    if args.common.show_progress() {
        print_run_summary(&stats);
    }
    Ok(())
}

async fn preload_products(
    path: &Path,
    args: &EnrichArgs,
    store: Arc<dyn ProductStore>,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> Result<()> {
    let reader: InputReader = open_input(Some(path)).await?;
    let stats = load_products(
        input_stream(reader),
        args.products_format(),
        store,
        config,
        cancel.child_token(),
    )
    .await?;
    info!(
        "Preloaded {} products from {}",
        stats.products_stored,
        path.display()
    );
    Ok(())
}

async fn open_output(path: Option<&Path>) -> Result<OutputWriter> {
    let sink: Box<dyn AsyncWrite + Send + Unpin> = match path {
        Some(path) => Box::new(tokio::fs::File::create(path).await.map_err(|e| {
            Error::io(format!("failed to create output file '{}'", path.display()), e)
        })?),
        None => Box::new(tokio::io::stdout()),
    };
    Ok(BufWriter::new(sink))
}
