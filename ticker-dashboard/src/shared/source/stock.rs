//! Daily stock quotes from a synchronous bars client
//!
//! The underlying client blocks, so every call is dispatched to tokio's
//! blocking pool and bounded by a timeout. Sibling fetches keep running while
//! one symbol waits on the network.

use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::DataSource;
use crate::shared::{
    config::DashboardConfig,
    error::FetchError,
    types::{Field, Series, Snapshot, Symbol, Timeframe},
};

/// Trailing window requested for quote snapshots
const SNAPSHOT_LOOKBACK_DAYS: u32 = 5;

/// One daily OHLCV bar; upstream rows may have gaps
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DailyBar {
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Synchronous stock data library
pub trait BarsClient: Send + Sync + 'static {
    /// Daily bars covering at least the trailing `days`, oldest first
    fn daily_bars(&self, symbol: &str, days: u32) -> Result<Vec<DailyBar>, FetchError>;
}

/// Stock quotes backed by a blocking [`BarsClient`]
pub struct StockSource<C> {
    client: Arc<C>,
    timeout: Duration,
}

impl<C: BarsClient> StockSource<C> {
    pub fn new(client: C, timeout: Duration) -> Self {
        Self {
            client: Arc::new(client),
            timeout,
        }
    }

    async fn run_blocking<T, F>(&self, call: F) -> Result<T, FetchError>
    where
        T: Send + 'static,
        F: FnOnce(&C) -> Result<T, FetchError> + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        let task = tokio::task::spawn_blocking(move || call(client.as_ref()));
        let joined = tokio::time::timeout(self.timeout, task).await?;
        joined?
    }
}

#[async_trait]
impl<C: BarsClient> DataSource for StockSource<C> {
    fn name(&self) -> &str {
        "stock"
    }

    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<Snapshot, FetchError> {
        let ticker = symbol.as_str().to_string();
        let bars = self
            .run_blocking(move |client| client.daily_bars(&ticker, SNAPSHOT_LOOKBACK_DAYS))
            .await?;
        snapshot_from_bars(symbol, &bars)
    }

    async fn fetch_series(
        &self,
        symbol: &Symbol,
        timeframe: &Timeframe,
    ) -> Result<Series, FetchError> {
        let ticker = symbol.as_str().to_string();
        let count = timeframe.count.get();
        let bars = self
            .run_blocking(move |client| client.daily_bars(&ticker, count))
            .await?;

        let closes: Vec<f64> = bars.iter().filter_map(|bar| bar.close).collect();
        if closes.is_empty() {
            return Err(FetchError::Empty);
        }
        let skip = closes.len().saturating_sub(count as usize);
        Ok(Series::from_closes(closes.into_iter().skip(skip)))
    }
}

/// Most recent bar: yesterday = its open, today = its close
pub(crate) fn snapshot_from_bars(
    symbol: &Symbol,
    bars: &[DailyBar],
) -> Result<Snapshot, FetchError> {
    let last = bars.last().ok_or(FetchError::Empty)?;

    let change_pct = match (last.open, last.close) {
        (Some(yesterday), Some(today)) if yesterday != 0.0 => {
            Field::number((today - yesterday) / yesterday * 100.0)
        }
        _ => Field::Absent,
    };

    Ok(Snapshot {
        symbol: symbol.clone(),
        open: Field::from_option(last.open),
        last_price: Field::from_option(last.close),
        change_pct,
        volume: Field::from_option(last.volume),
        high: Field::from_option(last.high),
        low: Field::from_option(last.low),
    })
}

/// Yahoo Finance chart endpoint over `reqwest::blocking`
///
/// The blocking client owns an internal runtime, so it is built lazily on the
/// first call (which always runs on the blocking pool).
pub struct YahooBarsClient {
    base_url: String,
    timeout: Duration,
    client: OnceLock<reqwest::blocking::Client>,
}

impl YahooBarsClient {
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            timeout,
            client: OnceLock::new(),
        }
    }

    pub fn from_dashboard(config: &DashboardConfig) -> Self {
        Self::new(&config.stock_api_url, config.request_timeout)
    }

    fn client(&self) -> Result<&reqwest::blocking::Client, FetchError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36")
            .build()
            .map_err(|error| {
                FetchError::Unexpected(format!("failed to build HTTP client: {error}"))
            })?;
        Ok(self.client.get_or_init(|| client))
    }

    fn chart_url(&self, symbol: &str, days: u32) -> String {
        format!(
            "{}/v8/finance/chart/{}?interval=1d&range={}",
            self.base_url,
            symbol,
            lookback_range(days)
        )
    }
}

impl BarsClient for YahooBarsClient {
    fn daily_bars(&self, symbol: &str, days: u32) -> Result<Vec<DailyBar>, FetchError> {
        let response = self.client()?.get(self.chart_url(symbol, days)).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream {
                status: status.as_u16(),
            });
        }

        let chart: ChartResponse = response.json()?;
        parse_chart(chart)
    }
}

/// Smallest Yahoo range covering `days` trading days
fn lookback_range(days: u32) -> &'static str {
    match days {
        0..=5 => "5d",
        6..=21 => "1mo",
        22..=63 => "3mo",
        64..=126 => "6mo",
        127..=252 => "1y",
        253..=504 => "2y",
        _ => "5y",
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

fn parse_chart(chart: ChartResponse) -> Result<Vec<DailyBar>, FetchError> {
    if let Some(error) = chart.chart.error.filter(|error| !error.is_null()) {
        return Err(FetchError::Unexpected(format!("chart error: {error}")));
    }

    let Some(quote) = chart
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .and_then(|result| result.indicators.quote.into_iter().next())
    else {
        return Err(FetchError::Empty);
    };

    let at = |values: &[Option<f64>], index: usize| values.get(index).copied().flatten();
    let rows = quote.close.len().max(quote.open.len());

    let bars: Vec<DailyBar> = (0..rows)
        .map(|index| DailyBar {
            open: at(&quote.open, index),
            high: at(&quote.high, index),
            low: at(&quote.low, index),
            close: at(&quote.close, index),
            volume: at(&quote.volume, index),
        })
        // Non-trading rows come back as all nulls
        .filter(|bar| bar.open.is_some() || bar.close.is_some())
        .collect();

    if bars.is_empty() {
        debug!(rows, "Chart response contained no usable bars");
        return Err(FetchError::Empty);
    }
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{serve, CannedResponse};
    use serde_json::json;

    struct FixedBars(Vec<DailyBar>);

    impl BarsClient for FixedBars {
        fn daily_bars(&self, _symbol: &str, _days: u32) -> Result<Vec<DailyBar>, FetchError> {
            Ok(self.0.clone())
        }
    }

    struct SlowBars(Duration);

    impl BarsClient for SlowBars {
        fn daily_bars(&self, _symbol: &str, _days: u32) -> Result<Vec<DailyBar>, FetchError> {
            std::thread::sleep(self.0);
            Ok(vec![bar(100.0, 101.0)])
        }
    }

    fn bar(open: f64, close: f64) -> DailyBar {
        DailyBar {
            open: Some(open),
            high: Some(open.max(close) + 1.0),
            low: Some(open.min(close) - 1.0),
            close: Some(close),
            volume: Some(1_000.0),
        }
    }

    #[test]
    fn test_snapshot_uses_most_recent_bar() {
        let bars = vec![bar(90.0, 95.0), bar(100.0, 105.0)];
        let snapshot = snapshot_from_bars(&Symbol::from("AAPL"), &bars).unwrap();

        assert_eq!(snapshot.open, Field::Number(100.0));
        assert_eq!(snapshot.last_price, Field::Number(105.0));
        assert_eq!(snapshot.change_pct, Field::Number(5.0));
        assert_eq!(snapshot.high, Field::Number(106.0));
        assert_eq!(snapshot.volume, Field::Number(1_000.0));
    }

    #[test]
    fn test_snapshot_guards_zero_or_absent_yesterday() {
        let zero = vec![bar(0.0, 105.0)];
        let snapshot = snapshot_from_bars(&Symbol::from("AAPL"), &zero).unwrap();
        assert_eq!(snapshot.change_pct, Field::Absent);

        let absent = vec![DailyBar {
            close: Some(105.0),
            ..Default::default()
        }];
        let snapshot = snapshot_from_bars(&Symbol::from("AAPL"), &absent).unwrap();
        assert_eq!(snapshot.change_pct, Field::Absent);
        assert_eq!(snapshot.open, Field::Absent);
    }

    #[test]
    fn test_snapshot_empty_bars() {
        let error = snapshot_from_bars(&Symbol::from("AAPL"), &[]).unwrap_err();
        assert_eq!(error, FetchError::Empty);
    }

    #[test]
    fn test_parse_chart() {
        let body = json!({
            "chart": {
                "result": [{
                    "meta": {"symbol": "AAPL"},
                    "timestamp": [1, 2, 3],
                    "indicators": {"quote": [{
                        "open": [10.0, null, 12.0],
                        "high": [11.0, null, 13.0],
                        "low": [9.0, null, 11.0],
                        "close": [10.5, null, 12.5],
                        "volume": [100, null, 300]
                    }]}
                }],
                "error": null
            }
        });

        let bars = parse_chart(serde_json::from_value(body).unwrap()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, Some(12.5));
        assert_eq!(bars[1].volume, Some(300.0));
    }

    #[test]
    fn test_parse_chart_errors() {
        let no_result = json!({"chart": {"result": null, "error": {"code": "Not Found"}}});
        let error = parse_chart(serde_json::from_value(no_result).unwrap()).unwrap_err();
        assert_eq!(error.kind(), "unexpected");

        let empty = json!({"chart": {"result": [], "error": null}});
        let error = parse_chart(serde_json::from_value(empty).unwrap()).unwrap_err();
        assert_eq!(error, FetchError::Empty);
    }

    #[test]
    fn test_lookback_range() {
        assert_eq!(lookback_range(5), "5d");
        assert_eq!(lookback_range(20), "1mo");
        assert_eq!(lookback_range(60), "3mo");
        assert_eq!(lookback_range(1000), "5y");
    }

    #[tokio::test]
    async fn test_fetch_series_keeps_trailing_count() {
        let bars = (1..=10).map(|i| bar(i as f64, i as f64)).collect();
        let source = StockSource::new(FixedBars(bars), Duration::from_secs(1));
        let timeframe = Timeframe::new("1D", 1440, 3).unwrap();

        let series = source
            .fetch_series(&Symbol::from("MSFT"), &timeframe)
            .await
            .unwrap();
        assert_eq!(series.closes(), vec![8.0, 9.0, 10.0]);
    }

    #[tokio::test]
    async fn test_fetch_snapshot_times_out() {
        let client = SlowBars(Duration::from_millis(300));
        let source = StockSource::new(client, Duration::from_millis(20));

        let error = source
            .fetch_snapshot(&Symbol::from("GOOGL"))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), "transport");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_calls_do_not_serialize() {
        let client = SlowBars(Duration::from_millis(200));
        let source = Arc::new(StockSource::new(client, Duration::from_secs(5)));
        let started = std::time::Instant::now();

        let fetches = ["AAPL", "MSFT", "GOOGL", "NVDA"].map(|symbol| {
            let source = Arc::clone(&source);
            async move { source.fetch_snapshot(&Symbol::from(symbol)).await }
        });
        let results = futures::future::join_all(fetches).await;

        assert!(results.iter().all(Result::is_ok));
        assert!(
            started.elapsed() < Duration::from_millis(700),
            "took {:?}",
            started.elapsed()
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_yahoo_http_failures_are_classified() {
        struct TestCase {
            response: CannedResponse,
            expected: &'static str,
        }

        let tests = vec![
            TestCase {
                // TC0: non-success status
                response: CannedResponse::new(503, "{}"),
                expected: "upstream",
            },
            TestCase {
                // TC1: chart without results
                response: CannedResponse::new(200, r#"{"chart": {"result": [], "error": null}}"#),
                expected: "empty",
            },
            TestCase {
                // TC2: body is not JSON
                response: CannedResponse::new(200, "<html></html>"),
                expected: "unexpected",
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let client = YahooBarsClient::new(serve(test.response).await, Duration::from_secs(2));
            // The blocking client must be built, used and dropped off the async workers
            let result = tokio::task::spawn_blocking(move || client.daily_bars("AAPL", 5)).await;
            let error = result.unwrap().unwrap_err();
            assert_eq!(error.kind(), test.expected, "TC{} failed", index);
        }
    }
}
