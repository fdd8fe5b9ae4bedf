/// Upbit Crypto Chart Dashboard
///
/// Ticker table for the configured markets plus a line chart of recent candle
/// closes for every market × timeframe, refreshed on a fixed interval.
///
/// Usage: crypto-chart [-s KRW-BTC KRW-ETH] [-t 1H:60:60] [-u 10] [-c config.yaml]
use std::error::Error;

use clap::Parser;
use ticker_dashboard::{
    init_logging, run_dashboard, ChartCliArgs, DashboardConfig, DashboardError, UpbitConfig,
    UpbitSource, Variant,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = ChartCliArgs::parse();
    let config = DashboardConfig::load(Variant::CryptoChart, &args.common, &args.timeframes)?;
    init_logging(&config.log_file)?;

    let source = UpbitSource::new(UpbitConfig::from_dashboard(&config))
        .map_err(|error| DashboardError::Source(error.to_string()))?;
    info!(
        symbols = ?config.symbols,
        timeframes = config.timeframes.len(),
        "Starting crypto chart dashboard"
    );

    let cycles = run_dashboard(&config, source).await?;
    info!(cycles, "Crypto chart dashboard exited");
    Ok(())
}
