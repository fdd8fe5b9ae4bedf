//! Fixed-size text line chart
//!
//! Renders a chronological price list into a block of text:
//!
//! ```text
//!                Price Chart
//! Price
//! 110.00 ┤                  •
//!        │               •••│
//! 102.50 ┤    ••         │
//!        │  ••  ••    •••
//!  95.00 ┤••      ••••
//!        └──────────────────── Time
//!        • Price
//! ```

use crate::shared::{
    config::{DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH},
    present::format::group_thousands,
};

pub const CHART_TITLE: &str = "Price Chart";
pub const Y_LABEL: &str = "Price";
pub const X_LABEL: &str = "Time";
pub const NO_DATA: &str = "No data";

const POINT: char = '•';
const RISE: char = '│';
const AXIS: char = '│';
const TICK: char = '┤';
const ORIGIN: char = '└';
const BASELINE: char = '─';

/// Plot area in character cells; axes and labels are drawn outside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineChart {
    pub width: usize,
    pub height: usize,
}

impl Default for LineChart {
    fn default() -> Self {
        Self::new(DEFAULT_CHART_WIDTH, DEFAULT_CHART_HEIGHT)
    }
}

impl LineChart {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width.max(2),
            height: height.max(2),
        }
    }

    /// Render `prices` (oldest first). An empty list renders [`NO_DATA`].
    pub fn render(&self, prices: &[f64]) -> String {
        let prices: Vec<f64> = prices.iter().copied().filter(|p| p.is_finite()).collect();
        if prices.is_empty() {
            return NO_DATA.to_string();
        }

        let (low, high) = bounds(&prices);
        let span = high - low;
        let rows: Vec<usize> = (0..self.width)
            .map(|column| {
                let price = sample(&prices, column, self.width);
                self.row_of(price, high, span)
            })
            .collect();

        let mut grid = vec![vec![' '; self.width]; self.height];
        for (column, &row) in rows.iter().enumerate() {
            // Connect to the previous sample so steep moves read as a line
            if let Some(&previous) = column.checked_sub(1).and_then(|c| rows.get(c)) {
                let (from, to) = if previous < row {
                    (previous + 1, row)
                } else {
                    (row + 1, previous)
                };
                for cell in grid.iter_mut().take(to).skip(from) {
                    cell[column] = RISE;
                }
            }
            grid[row][column] = POINT;
        }

        let ticks = self.tick_labels(high, span);
        let gutter = ticks.iter().flatten().map(String::len).max().unwrap_or(0);

        let mut lines = Vec::with_capacity(self.height + 4);
        lines.push(format!(
            "{:>pad$}{:^width$}",
            "",
            CHART_TITLE,
            pad = gutter + 2,
            width = self.width
        ));
        lines.push(Y_LABEL.to_string());
        for (row, cells) in grid.into_iter().enumerate() {
            let (label, axis) = match &ticks[row] {
                Some(label) => (label.as_str(), TICK),
                None => ("", AXIS),
            };
            let plot: String = cells.into_iter().collect();
            lines.push(format!("{label:>gutter$} {axis}{}", plot.trim_end()));
        }
        lines.push(format!(
            "{:>gutter$} {ORIGIN}{} {X_LABEL}",
            "",
            BASELINE.to_string().repeat(self.width)
        ));
        lines.push(format!("{:>gutter$}  {POINT} {Y_LABEL}", ""));

        lines.join("\n")
    }

    fn row_of(&self, value: f64, high: f64, span: f64) -> usize {
        let scaled = (high - value) / span * (self.height - 1) as f64;
        (scaled.round().max(0.0) as usize).min(self.height - 1)
    }

    /// Labels for the top, middle and bottom rows
    fn tick_labels(&self, high: f64, span: f64) -> Vec<Option<String>> {
        let decimals = if span >= 100.0 { 0 } else { 2 };
        let last = self.height - 1;
        (0..self.height)
            .map(|row| {
                (row == 0 || row == last || row == last / 2).then(|| {
                    let value = high - span * row as f64 / last as f64;
                    group_thousands(value, decimals)
                })
            })
            .collect()
    }
}

/// Min and max, widened so a flat series still has a non-zero span
fn bounds(prices: &[f64]) -> (f64, f64) {
    let low = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let high = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if high > low {
        (low, high)
    } else {
        let pad = (high.abs() * 0.01).max(1.0);
        (low - pad, high + pad)
    }
}

/// Linearly interpolated price at `column` of a `width`-wide plot
fn sample(prices: &[f64], column: usize, width: usize) -> f64 {
    if prices.len() == 1 {
        return prices[0];
    }

    let position = column as f64 * (prices.len() - 1) as f64 / (width - 1) as f64;
    let index = position.floor() as usize;
    match prices.get(index + 1) {
        Some(&next) => {
            let fraction = position - index as f64;
            prices[index] + (next - prices[index]) * fraction
        }
        None => prices[prices.len() - 1],
    }
}
