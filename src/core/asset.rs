//! Asset records and their normalization from the wire format.
//!
//! Upstream sends every numeric field as a string. Records are parsed once,
//! here, and the rest of the crate only ever sees `f64` values. The one
//! exception is a history price: a point whose price does not parse is kept
//! with no value so the chart can show it as a gap.

use crate::core::error::{MarketDataError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub rank: u32,
    pub symbol: String,
    pub name: String,
    pub price_usd: f64,
    pub market_cap_usd: f64,
    pub volume_usd_24h: f64,
    pub supply: f64,
    /// `None` means the supply is unlimited.
    pub max_supply: Option<f64>,
    pub change_percent_24h: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: DateTime<Utc>,
    /// `None` when upstream sent a missing or non-numeric price.
    pub price_usd: Option<f64>,
}

/// A numeric value as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireNumber {
    Text(String),
    Number(f64),
}

impl std::fmt::Display for WireNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireNumber::Text(text) => write!(f, "{text:?}"),
            WireNumber::Number(number) => write!(f, "{number}"),
        }
    }
}

impl WireNumber {
    fn parse(&self) -> Option<f64> {
        let value = match self {
            WireNumber::Text(text) => text.trim().parse::<f64>().ok()?,
            WireNumber::Number(number) => *number,
        };
        value.is_finite().then_some(value)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AssetRecord {
    id: Option<String>,
    rank: Option<WireNumber>,
    symbol: Option<String>,
    name: Option<String>,
    #[serde(rename = "priceUsd")]
    price_usd: Option<WireNumber>,
    #[serde(rename = "marketCapUsd")]
    market_cap_usd: Option<WireNumber>,
    #[serde(rename = "volumeUsd24Hr")]
    volume_usd_24h: Option<WireNumber>,
    supply: Option<WireNumber>,
    #[serde(rename = "maxSupply")]
    max_supply: Option<WireNumber>,
    #[serde(rename = "changePercent24Hr")]
    change_percent_24h: Option<WireNumber>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HistoryRecord {
    #[serde(rename = "priceUsd")]
    price_usd: Option<WireNumber>,
    date: Option<String>,
}

fn required<T>(value: Option<T>, field: &str, record: &str) -> Result<T> {
    value.ok_or_else(|| MarketDataError::Schema(format!("missing `{field}` in {record}")))
}

fn number(value: Option<&WireNumber>, field: &str, record: &str) -> Result<f64> {
    let raw = required(value, field, record)?;
    raw.parse().ok_or_else(|| {
        MarketDataError::Schema(format!("`{field}` in {record} is not a number: {raw}"))
    })
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(raw) {
        return Some(date_time.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl TryFrom<AssetRecord> for Asset {
    type Error = MarketDataError;

    fn try_from(record: AssetRecord) -> Result<Self> {
        let id = required(record.id, "id", "asset")?;
        let context = format!("asset {id}");

        let rank = number(record.rank.as_ref(), "rank", &context)?;
        if rank < 1.0 || rank.fract() != 0.0 || rank > f64::from(u32::MAX) {
            return Err(MarketDataError::Schema(format!(
                "`rank` in {context} is not a positive integer: {rank}"
            )));
        }

        // null and absent are the same thing: unlimited supply
        let max_supply = match record.max_supply.as_ref() {
            Some(raw) => Some(number(Some(raw), "maxSupply", &context)?),
            None => None,
        };

        Ok(Asset {
            rank: rank as u32,
            symbol: required(record.symbol, "symbol", &context)?,
            name: required(record.name, "name", &context)?,
            price_usd: number(record.price_usd.as_ref(), "priceUsd", &context)?,
            market_cap_usd: number(record.market_cap_usd.as_ref(), "marketCapUsd", &context)?,
            volume_usd_24h: number(record.volume_usd_24h.as_ref(), "volumeUsd24Hr", &context)?,
            supply: number(record.supply.as_ref(), "supply", &context)?,
            max_supply,
            change_percent_24h: number(
                record.change_percent_24h.as_ref(),
                "changePercent24Hr",
                &context,
            )?,
            id,
        })
    }
}

impl TryFrom<HistoryRecord> for HistoryPoint {
    type Error = MarketDataError;

    fn try_from(record: HistoryRecord) -> Result<Self> {
        let raw_date = required(record.date, "date", "history point")?;
        let date = parse_date(&raw_date).ok_or_else(|| {
            MarketDataError::Schema(format!("`date` in history point is not a date: {raw_date}"))
        })?;
        let price_usd = record.price_usd.as_ref().and_then(WireNumber::parse);
        if price_usd.is_none() {
            debug!(date = %raw_date, "History point without a usable price");
        }
        Ok(HistoryPoint { date, price_usd })
    }
}
