//! Paint price sheet generator - fetch catalogue prices into a printable sheet
//!
//! Reads product identifiers from a JSON or CSV file, fetches each product
//! page from the catalogue, and writes a themed HTML price sheet.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pricesheet::cli::{Cli, RunConfig};
use pricesheet::data::{load_ids, Fetcher, HttpTransport};
use pricesheet::pipeline::collect_records;
use pricesheet::render::write_price_sheet;

/// Installs the global subscriber; `RUST_LOG` overrides `--log-level`
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Loads identifiers, fetches every product and writes the sheet
async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = RunConfig::from_cli(&cli)?;

    info!(path = %config.input_file.display(), "Loading product identifiers");
    let ids = load_ids(&config.input_file)?;

    let transport = Arc::new(HttpTransport::new()?);
    let mut fetcher = Fetcher::new(transport, config.fetch.clone()).with_base_url(&config.base_url);
    if let Some(cache) = config.cache.clone() {
        info!(dir = %cache.cache_dir().display(), "Caching enabled");
        fetcher = fetcher.with_cache(Arc::new(cache));
    }

    info!(count = ids.len(), "Fetching prices");
    let records = collect_records(&fetcher, &ids).await;
    if records.len() < ids.len() {
        info!(missing = ids.len() - records.len(), "Some products were skipped");
    }

    info!(path = %config.output_file.display(), "Generating price sheet");
    let written = write_price_sheet(&records, &config.theme, &config.output_file)?;
    println!("{}", written.display());

    Ok(())
}
