/// Stock Dashboard
///
/// Daily quotes (yesterday's open, today's close, change, volume, high, low)
/// for the configured stock symbols.
use std::error::Error;

use clap::Parser;
use ticker_dashboard::{
    init_logging, run_dashboard, CliArgs, DashboardConfig, StockSource, Variant, YahooBarsClient,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();
    let config = DashboardConfig::load(Variant::StockTicker, &args, &[])?;
    init_logging(&config.log_file)?;

    let source = StockSource::new(
        YahooBarsClient::from_dashboard(&config),
        config.request_timeout,
    );
    info!(symbols = ?config.symbols, "Starting stock dashboard");

    let cycles = run_dashboard(&config, source).await?;
    info!(cycles, "Stock dashboard exited");
    Ok(())
}
