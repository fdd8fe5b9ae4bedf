/// Ticker Dashboard - Shared Library
///
/// This library provides common functionality for the three dashboard binaries:
/// - crypto-chart: Upbit ticker table with per-symbol candle charts
/// - crypto-ticker: Upbit ticker table
/// - stock-ticker: Daily stock quotes table
///
/// The library includes:
/// - Core data types for quotes and candle series
/// - Upbit and stock data sources with concurrent fetching
/// - Presenter, terminal renderer and the refresh loop driving them
pub mod shared;

// Re-export commonly used types for convenience
pub use shared::types::{Candle, Field, Series, SeriesMap, Snapshot, Symbol, Timeframe};

pub use shared::config::{ChartCliArgs, CliArgs, DashboardConfig, Variant};
pub use shared::error::{ConfigError, DashboardError, FetchError, RenderError};
pub use shared::logging::init_logging;

pub use shared::fetch::FetchOrchestrator;
pub use shared::source::{DataSource, StockSource, UpbitConfig, UpbitSource, YahooBarsClient};

// Presentation and the refresh loop (shared across all dashboards)
pub use shared::present::{
    ChartPanel, DisplayCell, DisplayModel, DisplayRow, PanelBody, Presenter, Tone,
};
pub use shared::refresh::{cancel_channel, run_dashboard, CancelHandle, RefreshLoop};
pub use shared::render::{Renderer, TerminalRenderer};
