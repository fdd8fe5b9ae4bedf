//! Dashboard configuration: YAML file + CLI flags + defaults
//!
//! Resolved once at startup into a [`DashboardConfig`] that is passed by
//! reference to the data sources, presenter and refresh loop. Precedence is
//! CLI flag > configuration file > built-in default.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::shared::{
    error::ConfigError,
    types::{Symbol, Timeframe},
};

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UPBIT_API_URL: &str = "https://api.upbit.com/v1/";
pub const DEFAULT_STOCK_API_URL: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_PRICE_UNIT: &str = "KRW";
pub const DEFAULT_LOG_FILE: &str = "dashboard.log";
pub const DEFAULT_CHART_WIDTH: usize = 60;
pub const DEFAULT_CHART_HEIGHT: usize = 20;

const DEFAULT_CRYPTO_SYMBOLS: [&str; 5] = ["KRW-BTC", "KRW-ETH", "KRW-XRP", "KRW-ADA", "KRW-DOGE"];
const DEFAULT_STOCK_SYMBOLS: [&str; 3] = ["AAPL", "MSFT", "GOOGL"];

/// Which dashboard is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Upbit ticker table plus per-symbol candle charts
    CryptoChart,
    /// Upbit ticker table only
    CryptoTicker,
    /// Daily stock quotes table
    StockTicker,
}

impl Variant {
    pub fn default_title(&self) -> &'static str {
        match self {
            Variant::CryptoChart => "Upbit Crypto Chart Dashboard",
            Variant::CryptoTicker => "Upbit Cryptocurrency Dashboard",
            Variant::StockTicker => "Stock Dashboard",
        }
    }

    pub fn default_symbols(&self) -> Vec<Symbol> {
        match self {
            Variant::CryptoChart | Variant::CryptoTicker => symbols_of(&DEFAULT_CRYPTO_SYMBOLS),
            Variant::StockTicker => symbols_of(&DEFAULT_STOCK_SYMBOLS),
        }
    }

    pub fn default_columns(&self) -> Vec<ColumnSpec> {
        match self {
            Variant::CryptoChart | Variant::CryptoTicker => vec![
                ColumnSpec::new("Symbol", "cyan dim", Justify::Left),
                ColumnSpec::new("Last Price", "green dim", Justify::Right),
                ColumnSpec::new("Change (%)", "magenta dim", Justify::Right),
                ColumnSpec::new("Volume", "yellow dim", Justify::Right),
                ColumnSpec::new("High", "bright_red dim", Justify::Right),
                ColumnSpec::new("Low", "bright_blue dim", Justify::Right),
            ],
            Variant::StockTicker => vec![
                ColumnSpec::new("Symbol", "cyan dim", Justify::Left),
                ColumnSpec::new("Yesterday", "white dim", Justify::Right),
                ColumnSpec::new("Today", "green dim", Justify::Right),
                ColumnSpec::new("Change (%)", "magenta dim", Justify::Right),
                ColumnSpec::new("Volume", "yellow dim", Justify::Right),
                ColumnSpec::new("High", "bright_red dim", Justify::Right),
                ColumnSpec::new("Low", "bright_blue dim", Justify::Right),
            ],
        }
    }

    pub fn default_timeframes(&self) -> Vec<Timeframe> {
        match self {
            Variant::CryptoChart => [("1H", 60, 60), ("15M", 15, 60), ("5M", 5, 60)]
                .into_iter()
                .filter_map(|(name, unit, count)| Timeframe::new(name, unit, count).ok())
                .collect(),
            Variant::CryptoTicker | Variant::StockTicker => Vec::new(),
        }
    }

    pub fn has_charts(&self) -> bool {
        matches!(self, Variant::CryptoChart)
    }
}

fn symbols_of(names: &[&str]) -> Vec<Symbol> {
    names.iter().copied().map(Symbol::from).collect()
}

/// Horizontal alignment of a table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Justify {
    #[default]
    Left,
    Center,
    Right,
}

fn default_column_style() -> String {
    "dim".to_string()
}

/// Table column definition (name, rich-like style string, alignment)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(default = "default_column_style")]
    pub style: String,
    #[serde(default)]
    pub justify: Justify,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, style: impl Into<String>, justify: Justify) -> Self {
        Self {
            name: name.into(),
            style: style.into(),
            justify,
        }
    }
}

/// Raw configuration file contents; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub symbols: Option<Vec<String>>,
    pub stock_symbols: Option<Vec<String>>,
    pub update_interval: Option<u64>,
    pub table_title: Option<String>,
    pub stock_table_title: Option<String>,
    pub columns: Option<Vec<ColumnSpec>>,
    pub stock_columns: Option<Vec<ColumnSpec>>,
    pub timeframes: Option<Vec<Timeframe>>,
    pub price_unit: Option<String>,
    pub api_url: Option<String>,
    pub stock_api_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub chart_width: Option<usize>,
    pub chart_height: Option<usize>,
    pub chart_columns: Option<usize>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_yaml(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        // An empty document is valid and means "all defaults"
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the configuration file.
    ///
    /// An explicitly requested path must exist. When no path was given the
    /// default `config.yaml` is optional and defaults apply if it is missing.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let config = Self::from_yaml(&path, &contents)?;
                info!(path = %path.display(), "Configuration loaded");
                Ok(config)
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                if explicit {
                    Err(ConfigError::NotFound { path })
                } else {
                    debug!(path = %path.display(), "No configuration file, using defaults");
                    Ok(Self::default())
                }
            }
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }
}

/// Flags shared by every dashboard binary
#[derive(Debug, Clone, Default, Parser)]
pub struct CliArgs {
    /// Symbols to display, e.g. `-s KRW-BTC -s KRW-ETH` or `-s KRW-BTC KRW-ETH`
    #[arg(short = 's', long = "symbols", num_args = 1..)]
    pub symbols: Vec<String>,

    /// Seconds to wait between refreshes
    #[arg(short = 'u', long = "update-interval")]
    pub update_interval: Option<u64>,

    /// Configuration file to use [default: config.yaml, optional]
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

/// Flags for the chart dashboard
#[derive(Debug, Clone, Default, Parser)]
pub struct ChartCliArgs {
    #[command(flatten)]
    pub common: CliArgs,

    /// Chart timeframe in the form name:unit:count (e.g. 1H:60:60), repeatable
    #[arg(short = 't', long = "timeframe")]
    pub timeframes: Vec<String>,
}

/// Chart geometry and grid layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartConfig {
    pub width: usize,
    pub height: usize,
    /// Number of chart panels per grid row
    pub columns: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CHART_WIDTH,
            height: DEFAULT_CHART_HEIGHT,
            columns: 1,
        }
    }
}

/// Fully resolved configuration for one dashboard run
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub variant: Variant,
    pub symbols: Vec<Symbol>,
    pub timeframes: Vec<Timeframe>,
    pub update_interval: Duration,
    pub table_title: String,
    pub columns: Vec<ColumnSpec>,
    pub price_unit: String,
    pub api_url: String,
    pub stock_api_url: String,
    pub request_timeout: Duration,
    pub chart: ChartConfig,
    pub log_file: PathBuf,
}

impl DashboardConfig {
    /// Built-in defaults for a variant, no file and no flags
    pub fn defaults(variant: Variant) -> Self {
        Self {
            variant,
            symbols: variant.default_symbols(),
            timeframes: variant.default_timeframes(),
            update_interval: Duration::from_secs(DEFAULT_UPDATE_INTERVAL_SECS),
            table_title: variant.default_title().to_string(),
            columns: variant.default_columns(),
            price_unit: DEFAULT_PRICE_UNIT.to_string(),
            api_url: DEFAULT_UPBIT_API_URL.to_string(),
            stock_api_url: DEFAULT_STOCK_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            chart: ChartConfig::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }

    /// Load the file named by (or defaulted from) `cli` and resolve against it
    pub fn load(
        variant: Variant,
        cli: &CliArgs,
        cli_timeframes: &[String],
    ) -> Result<Self, ConfigError> {
        let file = FileConfig::load(cli.config.as_deref())?;
        Self::resolve(variant, file, cli, cli_timeframes)
    }

    /// Merge flags over file values over defaults, then validate
    pub fn resolve(
        variant: Variant,
        file: FileConfig,
        cli: &CliArgs,
        cli_timeframes: &[String],
    ) -> Result<Self, ConfigError> {
        let defaults = Self::defaults(variant);
        let is_stock = matches!(variant, Variant::StockTicker);

        let (file_symbols, file_title, file_columns) = if is_stock {
            (file.stock_symbols, file.stock_table_title, file.stock_columns)
        } else {
            (file.symbols, file.table_title, file.columns)
        };

        let symbols: Vec<Symbol> = if !cli.symbols.is_empty() {
            cli.symbols.iter().map(Symbol::new).collect()
        } else {
            file_symbols
                .map(|symbols| symbols.into_iter().map(Symbol::from).collect())
                .unwrap_or(defaults.symbols)
        };
        let symbols: Vec<Symbol> = symbols
            .into_iter()
            .filter(|symbol| !symbol.as_str().is_empty())
            .collect();
        if symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }

        let timeframes = if !variant.has_charts() {
            Vec::new()
        } else if !cli_timeframes.is_empty() {
            cli_timeframes
                .iter()
                .map(|input| input.parse::<Timeframe>())
                .collect::<Result<Vec<_>, _>>()?
        } else {
            file.timeframes.unwrap_or(defaults.timeframes)
        };

        let interval_secs = cli
            .update_interval
            .or(file.update_interval)
            .unwrap_or(DEFAULT_UPDATE_INTERVAL_SECS);
        if interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        let chart = ChartConfig {
            width: positive_or(file.chart_width, defaults.chart.width),
            height: positive_or(file.chart_height, defaults.chart.height),
            columns: positive_or(file.chart_columns, defaults.chart.columns),
        };

        Ok(Self {
            variant,
            symbols,
            timeframes,
            update_interval: Duration::from_secs(interval_secs),
            table_title: file_title.unwrap_or(defaults.table_title),
            columns: file_columns.unwrap_or(defaults.columns),
            price_unit: file.price_unit.unwrap_or(defaults.price_unit),
            api_url: file.api_url.unwrap_or(defaults.api_url),
            stock_api_url: file.stock_api_url.unwrap_or(defaults.stock_api_url),
            request_timeout: file
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            chart,
            log_file: file.log_file.unwrap_or(defaults.log_file),
        })
    }
}

fn positive_or(value: Option<usize>, default: usize) -> usize {
    value.filter(|v| *v > 0).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = r#"
symbols: ["KRW-SOL", "KRW-ETH"]
stock_symbols: ["NVDA"]
update_interval: 5
table_title: "My Board"
columns:
  - name: "Symbol"
    style: "cyan"
  - name: "Price"
    justify: "right"
timeframes:
  - { name: "30M", unit: 30, count: 48 }
chart_columns: 2
"#;

    fn sample_file() -> FileConfig {
        FileConfig::from_yaml(Path::new("sample.yaml"), SAMPLE_YAML).unwrap()
    }

    #[test]
    fn test_defaults_without_file_or_flags() {
        let config = DashboardConfig::resolve(
            Variant::CryptoChart,
            FileConfig::default(),
            &CliArgs::default(),
            &[],
        )
        .unwrap();

        assert_eq!(config.symbols.len(), 5);
        assert_eq!(config.symbols[0].as_str(), "KRW-BTC");
        assert_eq!(config.update_interval, Duration::from_secs(10));
        assert_eq!(config.timeframes.len(), 3);
        assert_eq!(config.timeframes[0].name, "1H");
        assert_eq!(config.columns.len(), 6);
        assert_eq!(config.chart, ChartConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = DashboardConfig::resolve(
            Variant::CryptoChart,
            sample_file(),
            &CliArgs::default(),
            &[],
        )
        .unwrap();

        assert_eq!(
            config.symbols,
            vec![Symbol::from("KRW-SOL"), Symbol::from("KRW-ETH")]
        );
        assert_eq!(config.update_interval, Duration::from_secs(5));
        assert_eq!(config.table_title, "My Board");
        assert_eq!(config.columns[0].style, "cyan");
        assert_eq!(config.columns[1].style, "dim");
        assert_eq!(config.columns[1].justify, Justify::Right);
        assert_eq!(config.timeframes[0].unit_minutes.get(), 30);
        assert_eq!(config.chart.columns, 2);
    }

    #[test]
    fn test_cli_overrides_file() {
        let cli = CliArgs {
            symbols: vec!["KRW-XRP".to_string()],
            update_interval: Some(3),
            config: None,
        };
        let timeframes = vec!["1D:1440:30".to_string()];
        let file = sample_file();
        let result = DashboardConfig::resolve(Variant::CryptoChart, file, &cli, &timeframes);
        let config = result.unwrap();

        assert_eq!(config.symbols, vec![Symbol::from("KRW-XRP")]);
        assert_eq!(config.update_interval, Duration::from_secs(3));
        assert_eq!(config.timeframes.len(), 1);
        assert_eq!(config.timeframes[0].name, "1D");
    }

    #[test]
    fn test_stock_variant_uses_stock_keys() {
        let config = DashboardConfig::resolve(
            Variant::StockTicker,
            sample_file(),
            &CliArgs::default(),
            &[],
        )
        .unwrap();

        assert_eq!(config.symbols, vec![Symbol::from("NVDA")]);
        assert_eq!(config.table_title, "Stock Dashboard");
        assert_eq!(config.columns.len(), 7);
        assert!(config.timeframes.is_empty());
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let bad_timeframe = vec!["1H-60-60".to_string()];
        let result = DashboardConfig::resolve(
            Variant::CryptoChart,
            FileConfig::default(),
            &CliArgs::default(),
            &bad_timeframe,
        );
        assert!(matches!(result, Err(ConfigError::InvalidTimeframe { .. })));

        let zero_interval = CliArgs {
            update_interval: Some(0),
            ..Default::default()
        };
        let result = DashboardConfig::resolve(
            Variant::CryptoTicker,
            FileConfig::default(),
            &zero_interval,
            &[],
        );
        assert!(matches!(result, Err(ConfigError::ZeroInterval)));

        let no_symbols = FileConfig {
            symbols: Some(vec![]),
            ..Default::default()
        };
        let result =
            DashboardConfig::resolve(Variant::CryptoTicker, no_symbols, &CliArgs::default(), &[]);
        assert!(matches!(result, Err(ConfigError::NoSymbols)));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let result = FileConfig::from_yaml(Path::new("bad.yaml"), "symbols: [unclosed");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));

        let empty = FileConfig::from_yaml(Path::new("empty.yaml"), "   \n").unwrap();
        assert!(empty.symbols.is_none());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = FileConfig::load(Some(Path::new("/definitely/not/here/config.yaml")));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_cli_parsing() {
        let args = ChartCliArgs::try_parse_from([
            "crypto-chart",
            "-s",
            "KRW-BTC",
            "KRW-ETH",
            "-t",
            "1H:60:60",
            "-t",
            "5M:5:30",
            "-u",
            "15",
        ])
        .unwrap();

        assert_eq!(args.common.symbols, vec!["KRW-BTC", "KRW-ETH"]);
        assert_eq!(args.timeframes, vec!["1H:60:60", "5M:5:30"]);
        assert_eq!(args.common.update_interval, Some(15));
        assert!(args.common.config.is_none());
    }
}
