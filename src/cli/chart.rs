//! Terminal line chart for daily price history.

use super::ui::Viewport;
use crate::core::asset::HistoryPoint;
use crate::core::currency::{Currency, CurrencyDisplay};
use crate::core::format;
use chrono::{DateTime, Utc};

const EMPTY_MESSAGE: &str = "No price history yet";

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub date: DateTime<Utc>,
    /// Price in the display currency; `None` plots as a gap.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub label: String,
    pub price: String,
}

impl std::fmt::Display for Tooltip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}  Price: {}", self.label, self.price)
    }
}

pub struct PriceChart {
    points: Vec<ChartPoint>,
    currency: Currency,
    narrow: bool,
}

impl PriceChart {
    /// Plots `history` in the order given, converted to the display currency.
    pub fn new(history: &[HistoryPoint], display: &CurrencyDisplay, viewport: Viewport) -> Self {
        let points = history
            .iter()
            .map(|point| ChartPoint {
                date: point.date,
                value: point.price_usd.map(|usd| display.convert(usd)),
            })
            .collect();
        Self {
            points,
            currency: display.currency(),
            narrow: viewport.narrow,
        }
    }

    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn x_tick(&self, date: &DateTime<Utc>) -> String {
        format::date_tick(date, self.narrow)
    }

    pub fn y_tick(&self, value: f64) -> String {
        format::amount(value, self.currency)
    }

    /// Tooltip for the point at `index`. A point without a usable price, or an
    /// index without a point, reads as an invalid price rather than failing.
    pub fn tooltip(&self, index: usize) -> Tooltip {
        let point = self.points.get(index);
        Tooltip {
            label: point.map_or_else(|| "-".to_string(), |p| format::date_label(&p.date)),
            price: format::tooltip_price(point.and_then(|p| p.value), self.currency),
        }
    }

    pub fn latest(&self) -> Option<Tooltip> {
        self.points.len().checked_sub(1).map(|i| self.tooltip(i))
    }

    /// Lowest and highest plotted value, padded when the series is flat.
    fn y_domain(&self) -> Option<(f64, f64)> {
        let values = self
            .points
            .iter()
            .filter_map(|p| p.value)
            .filter(|v| v.is_finite());
        let (lo, hi) = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })?;
        if hi > lo {
            Some((lo, hi))
        } else {
            let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.01 };
            Some((lo - pad, hi + pad))
        }
    }

    pub fn render(&self, width: usize, height: usize) -> String {
        let height = height.max(3);
        let Some((lo, hi)) = self.y_domain() else {
            return format!("{EMPTY_MESSAGE}\n");
        };

        let ticks = [(0, hi), (height / 2, (lo + hi) / 2.0), (height - 1, lo)];
        let label_width = ticks
            .iter()
            .map(|(_, v)| self.y_tick(*v).chars().count())
            .max()
            .unwrap_or(0);
        let plot_width = width.saturating_sub(label_width + 2).max(10);

        let n = self.points.len();
        let columns = n.min(plot_width);
        let row_of = |value: Option<f64>| -> Option<usize> {
            let value = value.filter(|v| v.is_finite())?;
            let scaled = (value - lo) / (hi - lo) * (height - 1) as f64;
            Some(height - 1 - (scaled.round() as usize).min(height - 1))
        };

        let mut grid = vec![vec![' '; columns]; height];
        let mut previous: Option<usize> = None;
        for column in 0..columns {
            let index = if columns == 1 {
                0
            } else {
                column * (n - 1) / (columns - 1)
            };
            let Some(row) = row_of(self.points[index].value) else {
                previous = None;
                continue;
            };
            if let Some(prev) = previous {
                for cells in &mut grid[prev.min(row)..=prev.max(row)] {
                    cells[column] = '│';
                }
            }
            grid[row][column] = '•';
            previous = Some(row);
        }

        let mut out = String::new();
        for (r, cells) in grid.iter().enumerate() {
            let label = ticks
                .iter()
                .find(|(tick_row, _)| *tick_row == r)
                .map(|(_, v)| self.y_tick(*v))
                .unwrap_or_default();
            let axis = if label.is_empty() { '│' } else { '┤' };
            let line: String = cells.iter().collect();
            out.push_str(&format!("{label:>label_width$} {axis}{}\n", line.trim_end()));
        }
        out.push_str(&format!(
            "{:>label_width$} └{}\n",
            "",
            "─".repeat(columns)
        ));

        let first = self.x_tick(&self.points[0].date);
        let last = self.x_tick(&self.points[n - 1].date);
        let gap = columns.saturating_sub(first.chars().count() + last.chars().count());
        let x_labels = if n == 1 {
            first
        } else if gap > 0 {
            format!("{first}{}{last}", " ".repeat(gap))
        } else {
            format!("{first} - {last}")
        };
        out.push_str(&format!("{:>label_width$}  {x_labels}\n", ""));
        out
    }
}
