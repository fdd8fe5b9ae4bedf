/// Upbit Cryptocurrency Dashboard
///
/// Live ticker table (last price, change, volume, high, low) for the
/// configured Upbit markets.
use std::error::Error;

use clap::Parser;
use ticker_dashboard::{
    init_logging, run_dashboard, CliArgs, DashboardConfig, DashboardError, UpbitConfig, UpbitSource,
    Variant,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();
    let config = DashboardConfig::load(Variant::CryptoTicker, &args, &[])?;
    init_logging(&config.log_file)?;

    let source = UpbitSource::new(UpbitConfig::from_dashboard(&config))
        .map_err(|error| DashboardError::Source(error.to_string()))?;
    info!(symbols = ?config.symbols, "Starting crypto ticker dashboard");

    let cycles = run_dashboard(&config, source).await?;
    info!(cycles, "Crypto ticker dashboard exited");
    Ok(())
}
