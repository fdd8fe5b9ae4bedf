//! Upstream market data sources
//!
//! Provides:
//! - [`DataSource`]: async per-symbol snapshot / series contract
//! - [`UpbitSource`]: Upbit REST API (tickers and minute candles)
//! - [`StockSource`]: daily stock bars from a synchronous [`BarsClient`],
//!   run on the blocking thread pool

mod stock;
mod upbit;

pub use stock::{BarsClient, DailyBar, StockSource, YahooBarsClient};
pub use upbit::{UpbitConfig, UpbitSource};

use async_trait::async_trait;

use crate::shared::{
    error::FetchError,
    types::{Series, Snapshot, Symbol, Timeframe},
};

/// A named upstream that returns one symbol's data per call.
///
/// Implementations bound every call with a timeout and classify failures into
/// [`FetchError`]; they never panic on malformed upstream data.
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    /// Upstream name for logging
    fn name(&self) -> &str;

    /// Latest snapshot for `symbol`
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<Snapshot, FetchError>;

    /// Historical closes for `symbol` over `timeframe`, oldest first
    async fn fetch_series(
        &self,
        symbol: &Symbol,
        timeframe: &Timeframe,
    ) -> Result<Series, FetchError>;
}
