//! Core data types shared by the data sources, the presenter and the renderer
//!
//! Everything here is recomputed every refresh cycle; only [`Symbol`] and
//! [`Timeframe`] come from configuration and live for the whole run.

use std::{fmt, num::NonZeroU32, str::FromStr};

use derive_more::{Display, From};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::shared::error::ConfigError;

/// Identifier of a tradable instrument (e.g. "KRW-BTC", "AAPL")
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Deserialize, Serialize,
)]
#[serde(transparent)]
pub struct Symbol(SmolStr);

impl Symbol {
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Self(SmolStr::new(symbol.as_ref().trim()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Candle granularity and window length used for charting
///
/// Deserializes from the configuration shape `{name, unit, count}` and parses
/// from the CLI shape `name:unit:count`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Timeframe {
    /// Display name (e.g. "1H", "15M")
    pub name: String,
    /// Candle unit in minutes
    #[serde(rename = "unit")]
    pub unit_minutes: NonZeroU32,
    /// Number of candles in the window
    pub count: NonZeroU32,
}

impl Timeframe {
    pub fn new(
        name: impl Into<String>,
        unit_minutes: u32,
        count: u32,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        let invalid = |reason: &str| ConfigError::InvalidTimeframe {
            input: format!("{name}:{unit_minutes}:{count}"),
            reason: reason.to_string(),
        };

        let unit_minutes =
            NonZeroU32::new(unit_minutes).ok_or_else(|| invalid("unit must be positive"))?;
        let count = NonZeroU32::new(count).ok_or_else(|| invalid("count must be positive"))?;

        Ok(Self {
            name,
            unit_minutes,
            count,
        })
    }
}

impl FromStr for Timeframe {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidTimeframe {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = input.split(':').map(str::trim).collect();
        let [name, unit, count] = parts.as_slice() else {
            return Err(invalid("expected format name:unit:count"));
        };
        if name.is_empty() {
            return Err(invalid("name must not be empty"));
        }

        let unit = unit
            .parse::<u32>()
            .map_err(|_| invalid("unit must be a positive integer"))?;
        let count = count
            .parse::<u32>()
            .map_err(|_| invalid("count must be a positive integer"))?;

        Timeframe::new(*name, unit, count)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.unit_minutes, self.count)
    }
}

/// One upstream field as received: a usable number, something else, or nothing
///
/// The presenter matches on this exhaustively, so every shape of upstream data
/// has exactly one display outcome.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Field {
    Number(f64),
    NonNumeric(String),
    #[default]
    Absent,
}

impl Field {
    /// Non-finite numbers are demoted to [`Field::NonNumeric`].
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            Field::Number(value)
        } else {
            Field::NonNumeric(value.to_string())
        }
    }

    pub fn from_option(value: Option<f64>) -> Self {
        value.map(Field::number).unwrap_or(Field::Absent)
    }

    /// Classify a JSON value (missing and `null` are both absent)
    pub fn from_json(value: Option<&serde_json::Value>) -> Self {
        match value {
            None | Some(serde_json::Value::Null) => Field::Absent,
            Some(serde_json::Value::Number(number)) => number
                .as_f64()
                .map(Field::number)
                .unwrap_or_else(|| Field::NonNumeric(number.to_string())),
            Some(serde_json::Value::String(text)) => Field::NonNumeric(text.clone()),
            Some(other) => Field::NonNumeric(other.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Field::Number(value) => Some(*value),
            Field::NonNumeric(_) | Field::Absent => None,
        }
    }

    /// Apply `f` to a numeric value, leaving the other cases untouched
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Field::Number(value) => Field::number(f(value)),
            other => other,
        }
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Field::number(value)
    }
}

/// Latest market state for one symbol
///
/// `change_pct` is always a percentage (e.g. `-1.23` for a 1.23% drop). `open`
/// is the stock variant's reference ("yesterday") price and is absent for
/// crypto tickers.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub symbol: Symbol,
    pub open: Field,
    pub last_price: Field,
    pub change_pct: Field,
    pub volume: Field,
    pub high: Field,
    pub low: Field,
}

impl Snapshot {
    /// Snapshot with every field absent
    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            open: Field::Absent,
            last_price: Field::Absent,
            change_pct: Field::Absent,
            volume: Field::Absent,
            high: Field::Absent,
            low: Field::Absent,
        }
    }
}

/// One historical bar; only the close participates in charting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub close: f64,
}

/// Candles ordered oldest to newest
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub candles: Vec<Candle>,
}

impl Series {
    /// Build from chronologically ordered closes
    pub fn from_closes(closes: impl IntoIterator<Item = f64>) -> Self {
        Self {
            candles: closes.into_iter().map(|close| Candle { close }).collect(),
        }
    }

    /// Build from upstream newest-first closes
    pub fn from_newest_first(closes: impl IntoIterator<Item = f64>) -> Self {
        let mut series = Self::from_closes(closes);
        series.candles.reverse();
        series
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|candle| candle.close).collect()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

/// Per-symbol, per-timeframe-name series, in configuration order
pub type SeriesMap = IndexMap<Symbol, IndexMap<String, Option<Series>>>;
