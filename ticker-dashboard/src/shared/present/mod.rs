//! Pure transformation from fetched data into a renderable [`DisplayModel`]
//!
//! Provides:
//! - [`format`]: grouped numbers, percentages and the `N/A` placeholder
//! - [`chart`]: fixed-size text line chart
//! - [`Presenter`]: rows, chart panels and the full per-cycle model
//!
//! Nothing in this module performs I/O or reads the clock; the caller passes
//! `now` so a cycle's output is fully determined by its inputs.

pub mod chart;
pub mod format;

use chrono::NaiveDateTime;

use self::{
    chart::{LineChart, NO_DATA},
    format::{format_change, format_number, PLACEHOLDER},
};
use crate::shared::{
    config::{ColumnSpec, DashboardConfig, Variant},
    types::{SeriesMap, Snapshot},
};

/// Timestamp layout used in the title and footer
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Semantic colour of a cell, independent of the column style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCell {
    pub text: String,
    /// `None` means the column style applies unchanged
    pub tone: Option<Tone>,
}

impl DisplayCell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: None,
        }
    }

    pub fn placeholder() -> Self {
        Self::plain(PLACEHOLDER)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub cells: Vec<DisplayCell>,
}

impl DisplayRow {
    pub fn texts(&self) -> Vec<&str> {
        self.cells.iter().map(|cell| cell.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelBody {
    Chart(String),
    NoData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPanel {
    pub title: String,
    pub body: PanelBody,
}

impl ChartPanel {
    /// Text to draw inside the panel
    pub fn content(&self) -> &str {
        match &self.body {
            PanelBody::Chart(chart) => chart,
            PanelBody::NoData => NO_DATA,
        }
    }
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayModel {
    pub title: String,
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<DisplayRow>,
    pub panels: Vec<ChartPanel>,
    pub footer: String,
}

/// Cell layout of a table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowLayout {
    /// symbol, price, change, volume, high, low
    Crypto { price_unit: String },
    /// symbol, yesterday, today, change, volume, high, low
    Stock,
}

impl RowLayout {
    pub fn for_variant(variant: Variant, price_unit: &str) -> Self {
        match variant {
            Variant::CryptoChart | Variant::CryptoTicker => RowLayout::Crypto {
                price_unit: price_unit.to_string(),
            },
            Variant::StockTicker => RowLayout::Stock,
        }
    }

    pub fn cell_count(&self) -> usize {
        match self {
            RowLayout::Crypto { .. } => 6,
            RowLayout::Stock => 7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Presenter {
    table_title: String,
    columns: Vec<ColumnSpec>,
    layout: RowLayout,
    chart: LineChart,
}

impl Presenter {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            table_title: config.table_title.clone(),
            columns: config.columns.clone(),
            layout: RowLayout::for_variant(config.variant, &config.price_unit),
            chart: LineChart::new(config.chart.width, config.chart.height),
        }
    }

    /// One row per snapshot, in input order
    pub fn to_rows(&self, snapshots: &[Option<Snapshot>]) -> Vec<DisplayRow> {
        snapshots
            .iter()
            .map(|snapshot| self.to_row(snapshot.as_ref()))
            .collect()
    }

    pub fn to_row(&self, snapshot: Option<&Snapshot>) -> DisplayRow {
        let Some(snapshot) = snapshot else {
            return DisplayRow {
                cells: vec![DisplayCell::placeholder(); self.layout.cell_count()],
            };
        };

        let (change, tone) = format_change(&snapshot.change_pct);
        let change = DisplayCell { text: change, tone };
        let symbol = DisplayCell::plain(snapshot.symbol.as_str());

        let cells = match &self.layout {
            RowLayout::Crypto { price_unit } => {
                let unit = Some(price_unit.as_str()).filter(|unit| !unit.is_empty());
                vec![
                    symbol,
                    DisplayCell::plain(format_number(&snapshot.last_price, 0, unit)),
                    change,
                    DisplayCell::plain(format_number(&snapshot.volume, 2, None)),
                    DisplayCell::plain(format_number(&snapshot.high, 0, unit)),
                    DisplayCell::plain(format_number(&snapshot.low, 0, unit)),
                ]
            }
            RowLayout::Stock => vec![
                symbol,
                DisplayCell::plain(format_number(&snapshot.open, 2, None)),
                DisplayCell::plain(format_number(&snapshot.last_price, 2, None)),
                change,
                DisplayCell::plain(format_number(&snapshot.volume, 0, None)),
                DisplayCell::plain(format_number(&snapshot.high, 2, None)),
                DisplayCell::plain(format_number(&snapshot.low, 2, None)),
            ],
        };

        DisplayRow { cells }
    }

    /// One panel per symbol × timeframe, in map order
    pub fn to_panels(&self, series: &SeriesMap) -> Vec<ChartPanel> {
        series
            .iter()
            .flat_map(|(symbol, by_timeframe)| {
                by_timeframe.iter().map(move |(timeframe, series)| ChartPanel {
                    title: format!("{symbol} - {timeframe}"),
                    body: match series {
                        Some(series) if !series.is_empty() => {
                            PanelBody::Chart(self.chart.render(&series.closes()))
                        }
                        _ => PanelBody::NoData,
                    },
                })
            })
            .collect()
    }

    pub fn present(
        &self,
        now: NaiveDateTime,
        snapshots: &[Option<Snapshot>],
        series: Option<&SeriesMap>,
    ) -> DisplayModel {
        let timestamp = now.format(TIMESTAMP_FORMAT);
        let panels = match series {
            Some(series) => self.to_panels(series),
            None => Vec::new(),
        };

        DisplayModel {
            title: format!("{} - {timestamp}", self.table_title),
            columns: self.columns.clone(),
            rows: self.to_rows(snapshots),
            panels,
            footer: format!("Last Update: {timestamp} | Press q to exit."),
        }
    }
}
