use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;
use trade_enricher::cli::{args::Args, commands};

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Create cancellation token for coordinating graceful shutdown
        let cancellation_token = CancellationToken::new();

        // Ctrl-C cancels the token; commands wind down and return on their own
        let shutdown_token = cancellation_token.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                    shutdown_token.cancel();
                }
                Err(e) => eprintln!("Failed to install CTRL+C signal handler: {}", e),
            }
        });

        commands::run(args, cancellation_token).await
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Trade Enricher - streaming product-name enrichment for trade files");
    println!("==================================================================");
    println!();
    println!("Streams CSV, JSON or XML trade files through a bounded-concurrency");
    println!("pipeline that resolves product ids to names held in Redis.");
    println!();
    println!("USAGE:");
    println!("    trade-enricher <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    serve          Run the HTTP service");
    println!("    load-products  Stream a product file into the store");
    println!("    enrich         Stream a trade file through the enrichment pipeline");
    println!("    help           Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Load product names into Redis:");
    println!("    trade-enricher load-products --format csv products.csv");
    println!();
    println!("    # Enrich a trade file to stdout:");
    println!("    trade-enricher enrich --format json trades.json > enriched.csv");
    println!();
    println!("    # Try it without Redis:");
    println!("    trade-enricher enrich -f csv trades.csv --memory-store --products products.csv");
    println!();
    println!("    # Serve the HTTP API:");
    println!("    trade-enricher serve --bind 127.0.0.1:8080");
    println!();
    println!("For detailed help on any command, use:");
    println!("    trade-enricher <COMMAND> --help");
}
