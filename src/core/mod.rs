//! Core business logic abstractions

pub mod asset;
pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod format;
pub mod log;
pub mod market;
pub mod query;

// Re-export main types for cleaner imports
pub use asset::{Asset, HistoryPoint};
pub use currency::{Currency, CurrencyDisplay, CurrencyRateProvider};
pub use error::MarketDataError;
pub use market::{MarketDataClient, MarketDataProvider};
pub use query::{Query, QueryState};
