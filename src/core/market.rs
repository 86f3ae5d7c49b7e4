//! Market data abstractions and the client the views talk to.

use crate::core::asset::{Asset, HistoryPoint};
use crate::core::currency::CurrencyRateProvider;
use crate::core::error::{MarketDataError, Result};
use async_trait::async_trait;
use std::num::NonZeroU32;
use std::sync::Arc;

pub const DEFAULT_LISTING_LIMIT: NonZeroU32 = NonZeroU32::new(50).unwrap();

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn list_assets(&self, limit: NonZeroU32) -> Result<Vec<Asset>>;
    async fn asset(&self, id: &str) -> Result<Asset>;
    /// Daily (`d1`) price history, in the order upstream returns it.
    async fn asset_history(&self, id: &str) -> Result<Vec<HistoryPoint>>;
}

/// Rejects ids no request can be built from.
pub fn validate_asset_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() || id.contains('/') {
        return Err(MarketDataError::InvalidRequest(format!(
            "invalid asset id: {id:?}"
        )));
    }
    Ok(id)
}

/// Single entry point for every outbound market data request.
///
/// Cheap to clone; all clones share the same providers and therefore the same
/// query caches.
#[derive(Clone)]
pub struct MarketDataClient {
    assets: Arc<dyn MarketDataProvider>,
    rates: Arc<dyn CurrencyRateProvider>,
}

impl MarketDataClient {
    pub fn new(assets: Arc<dyn MarketDataProvider>, rates: Arc<dyn CurrencyRateProvider>) -> Self {
        Self { assets, rates }
    }

    pub async fn list_assets(&self, limit: NonZeroU32) -> Result<Vec<Asset>> {
        self.assets.list_assets(limit).await
    }

    pub async fn asset_details(&self, id: &str) -> Result<Asset> {
        self.assets.asset(validate_asset_id(id)?).await
    }

    pub async fn asset_history(&self, id: &str) -> Result<Vec<HistoryPoint>> {
        self.assets.asset_history(validate_asset_id(id)?).await
    }

    /// USD to BRL multiplier.
    pub async fn exchange_rate(&self) -> Result<f64> {
        self.rates.get_rate("USD", "BRL").await
    }
}
