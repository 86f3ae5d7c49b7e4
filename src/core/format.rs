//! Display formatting for prices, large amounts and percentage changes.

use crate::core::currency::{Currency, CurrencyDisplay};
use chrono::{DateTime, Datelike, Utc};

pub const INVALID_LABEL: &str = "Invalid";
pub const UNLIMITED_LABEL: &str = "∞";

const MILLION: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn glyph(&self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Down => "▼",
        }
    }
}

/// Sign and magnitude of a 24h change, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeIndicator {
    pub direction: Direction,
    pub magnitude: String,
}

impl ChangeIndicator {
    pub fn new(change_percent: f64) -> Self {
        let direction = if change_percent >= 0.0 {
            Direction::Up
        } else {
            Direction::Down
        };
        Self {
            direction,
            magnitude: format!("{:.2}%", change_percent.abs()),
        }
    }
}

impl std::fmt::Display for ChangeIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.direction.glyph(), self.magnitude)
    }
}

/// Rounds half away from zero, unlike `{:.0}` which rounds half to even.
fn whole(value: f64) -> f64 {
    let rounded = value.round();
    if rounded == 0.0 { 0.0 } else { rounded }
}

pub fn price(usd: f64, display: &CurrencyDisplay) -> String {
    amount(display.convert(usd), display.currency())
}

/// Formats a value that is already expressed in `currency`.
pub fn amount(value: f64, currency: Currency) -> String {
    format!("{}{value:.2}", currency.symbol())
}

pub fn millions(usd: f64, display: &CurrencyDisplay) -> String {
    format!(
        "{}{}",
        display.currency().symbol(),
        units_in_millions(display.convert(usd))
    )
}

/// Formats a count that is not currency-denominated, such as supply.
pub fn units_in_millions(value: f64) -> String {
    format!("{:.0}M", whole(value / MILLION))
}

pub fn max_supply(value: Option<f64>) -> String {
    value.map_or_else(|| UNLIMITED_LABEL.to_string(), units_in_millions)
}

/// Tooltip price label; a missing or non-numeric value yields `Invalid`.
pub fn tooltip_price(value: Option<f64>, currency: Currency) -> String {
    match value {
        Some(v) if v.is_finite() => amount(v, currency),
        _ => INVALID_LABEL.to_string(),
    }
}

pub fn date_tick(date: &DateTime<Utc>, narrow: bool) -> String {
    if narrow {
        format!("{}/{}", date.month(), date.day())
    } else {
        date_label(date)
    }
}

pub fn date_label(date: &DateTime<Utc>) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn brl(rate: f64) -> CurrencyDisplay {
        CurrencyDisplay::resolve(true, Some(rate))
    }

    #[test]
    fn test_price_two_decimals() {
        assert_eq!(price(100.004, &CurrencyDisplay::usd()), "$100.00");
        assert_eq!(price(0.5, &CurrencyDisplay::usd()), "$0.50");
        assert_eq!(price(10.0, &brl(5.0)), "R$50.00");
    }

    #[test]
    fn test_millions() {
        assert_eq!(millions(2_500_000_000.0, &CurrencyDisplay::usd()), "$2500M");
        assert_eq!(millions(2_500_000_000.0, &brl(2.0)), "R$5000M");
        assert_eq!(units_in_millions(400_000.0), "0M");
        assert_eq!(units_in_millions(2_500_000.0), "3M");
        assert_eq!(units_in_millions(19_499_999.0), "19M");
    }

    #[test]
    fn test_max_supply() {
        assert_eq!(max_supply(None), "∞");
        assert_eq!(max_supply(Some(21_000_000.0)), "21M");
        assert_eq!(max_supply(Some(1_500_000.0)), "2M");
    }

    #[test]
    fn test_change_indicator() {
        let up = ChangeIndicator::new(2.5);
        assert_eq!(up.direction, Direction::Up);
        assert_eq!(up.magnitude, "2.50%");

        let flat = ChangeIndicator::new(0.0);
        assert_eq!(flat.direction, Direction::Up);
        assert_eq!(flat.magnitude, "0.00%");

        let down = ChangeIndicator::new(-1.2345);
        assert_eq!(down.direction, Direction::Down);
        assert_eq!(down.magnitude, "1.23%");
        assert_eq!(down.to_string(), "▼ 1.23%");
    }

    #[test]
    fn test_tooltip_guards_non_numeric() {
        assert_eq!(tooltip_price(None, Currency::Usd), "Invalid");
        assert_eq!(tooltip_price(Some(f64::NAN), Currency::Usd), "Invalid");
        assert_eq!(tooltip_price(Some(f64::INFINITY), Currency::Usd), "Invalid");
        assert_eq!(tooltip_price(Some(42000.12), Currency::Usd), "$42000.12");
        assert_eq!(tooltip_price(Some(3.0), Currency::Brl), "R$3.00");
    }

    #[test]
    fn test_date_ticks() {
        let date = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(date_tick(&date, true), "1/2");
        assert_eq!(date_tick(&date, false), "1/2/2024");
    }
}
