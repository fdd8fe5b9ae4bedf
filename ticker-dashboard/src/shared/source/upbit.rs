//! Upbit REST data source (tickers and minute candles)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::DataSource;
use crate::shared::{
    config::{DashboardConfig, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_UPBIT_API_URL},
    error::FetchError,
    types::{Field, Series, Snapshot, Symbol, Timeframe},
};

/// Upbit client configuration
#[derive(Debug, Clone)]
pub struct UpbitConfig {
    /// REST base URL, always ending in '/'
    pub base_url: String,
    /// Total timeout per request
    pub timeout: Duration,
}

impl Default for UpbitConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPBIT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl UpbitConfig {
    /// Create a new configuration with custom base URL
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: format!("{}/", base_url.as_ref().trim_end_matches('/')),
            ..Default::default()
        }
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_dashboard(config: &DashboardConfig) -> Self {
        Self::new(&config.api_url).with_timeout(config.request_timeout)
    }
}

/// Upbit market data over one pooled HTTP client
#[derive(Debug, Clone)]
pub struct UpbitSource {
    client: Client,
    config: UpbitConfig,
}

impl UpbitSource {
    pub fn new(config: UpbitConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn ticker_url(&self, symbol: &Symbol) -> String {
        format!("{}ticker?markets={}", self.config.base_url, symbol)
    }

    fn candles_url(&self, symbol: &Symbol, timeframe: &Timeframe) -> String {
        format!(
            "{}candles/minutes/{}?market={}&count={}",
            self.config.base_url, timeframe.unit_minutes, symbol, timeframe.count
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl DataSource for UpbitSource {
    fn name(&self) -> &str {
        "upbit"
    }

    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<Snapshot, FetchError> {
        let body = self.get_json(&self.ticker_url(symbol)).await?;
        parse_ticker(symbol, body)
    }

    async fn fetch_series(
        &self,
        symbol: &Symbol,
        timeframe: &Timeframe,
    ) -> Result<Series, FetchError> {
        let body = self.get_json(&self.candles_url(symbol, timeframe)).await?;
        parse_candles(body)
    }
}

fn into_array(body: Value) -> Result<Vec<Value>, FetchError> {
    match body {
        Value::Array(items) if items.is_empty() => Err(FetchError::Empty),
        Value::Array(items) => Ok(items),
        other => Err(FetchError::Unexpected(format!(
            "expected JSON array, got: {}",
            truncate(&other.to_string(), 100)
        ))),
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Map the first element of a `ticker` response into a [`Snapshot`]
pub(crate) fn parse_ticker(requested: &Symbol, body: Value) -> Result<Snapshot, FetchError> {
    let ticker = into_array(body)?.swap_remove(0);

    let symbol = ticker
        .get("market")
        .and_then(Value::as_str)
        .map(Symbol::from)
        .unwrap_or_else(|| requested.clone());

    Ok(Snapshot {
        symbol,
        open: Field::Absent,
        last_price: Field::from_json(ticker.get("trade_price")),
        // Upbit reports a signed fraction
        change_pct: Field::from_json(ticker.get("signed_change_rate")).map(|rate| rate * 100.0),
        volume: Field::from_json(ticker.get("trade_volume")),
        high: Field::from_json(ticker.get("high_price")),
        low: Field::from_json(ticker.get("low_price")),
    })
}

/// Map a newest-first `candles/minutes` response into a chronological [`Series`]
pub(crate) fn parse_candles(body: Value) -> Result<Series, FetchError> {
    let candles = into_array(body)?;
    let total = candles.len();

    let closes: Vec<f64> = candles
        .iter()
        .filter_map(|candle| Field::from_json(candle.get("trade_price")).as_f64())
        .collect();

    if closes.len() < total {
        debug!(
            dropped = total - closes.len(),
            "Dropped candles without numeric trade_price"
        );
    }
    if closes.is_empty() {
        return Err(FetchError::Empty);
    }

    Ok(Series::from_newest_first(closes))
}
