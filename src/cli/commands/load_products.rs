//! Load-products command: stream a product file into the store

use super::shared::{
    build_store, create_spinner, input_stream, load_configuration, open_input,
    print_load_summary, setup_logging,
};
use crate::Result;
use crate::app::services::pipeline::load_products;
use crate::cli::args::LoadProductsArgs;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn run_load_products(args: LoadProductsArgs, cancel: CancellationToken) -> Result<()> {
    setup_logging(&args.common)?;
    args.validate()?;

    let config = load_configuration(&args.common)?;
    let store = build_store(&config, &args.common).await?;
    let reader = open_input(args.input.as_deref()).await?;

    let spinner = create_spinner(
        &format!("Loading {} products...", args.format),
        args.common.show_progress(),
    );

    let result = load_products(
        input_stream(reader),
        args.format,
        store,
        &config.pipeline,
        cancel,
    )
    .await;
    spinner.finish_and_clear();

    let stats = result?;
    info!("{}", stats.summary());
    if args.common.show_progress() {
        print_load_summary(&stats);
    }
    Ok(())
}
