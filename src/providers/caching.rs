use crate::core::asset::{Asset, HistoryPoint};
use crate::core::cache::Cache;
use crate::core::currency::CurrencyRateProvider;
use crate::core::error::Result;
use crate::core::market::MarketDataProvider;
use async_trait::async_trait;
use std::num::NonZeroU32;
use std::sync::Arc;

// Caching for MarketDataProvider. Successful results are kept for the
// session; a failed fetch is dropped once it resolves so a later mount retries.
pub struct CachingMarketDataProvider<T: MarketDataProvider> {
    inner: Arc<T>,
    listings: Cache<NonZeroU32, Result<Vec<Asset>>>,
    assets: Cache<String, Result<Asset>>,
    histories: Cache<String, Result<Vec<HistoryPoint>>>,
}

impl<T: MarketDataProvider> CachingMarketDataProvider<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner: Arc::new(inner),
            listings: Cache::new(),
            assets: Cache::new(),
            histories: Cache::new(),
        }
    }
}

#[async_trait]
impl<T: MarketDataProvider + 'static> MarketDataProvider for CachingMarketDataProvider<T> {
    async fn list_assets(&self, limit: NonZeroU32) -> Result<Vec<Asset>> {
        let inner = Arc::clone(&self.inner);
        self.listings
            .get_or_try_fetch(limit, move || async move { inner.list_assets(limit).await })
            .await
    }

    async fn asset(&self, id: &str) -> Result<Asset> {
        let inner = Arc::clone(&self.inner);
        let key = id.to_string();
        let id = key.clone();
        self.assets
            .get_or_try_fetch(key, move || async move { inner.asset(&id).await })
            .await
    }

    async fn asset_history(&self, id: &str) -> Result<Vec<HistoryPoint>> {
        let inner = Arc::clone(&self.inner);
        let key = id.to_string();
        let id = key.clone();
        self.histories
            .get_or_try_fetch(key, move || async move { inner.asset_history(&id).await })
            .await
    }
}

// Caching for CurrencyRateProvider
pub struct CachingCurrencyRateProvider<T: CurrencyRateProvider> {
    inner: Arc<T>,
    cache: Cache<String, Result<f64>>,
}

impl<T: CurrencyRateProvider> CachingCurrencyRateProvider<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner: Arc::new(inner),
            cache: Cache::new(),
        }
    }
}

#[async_trait]
impl<T: CurrencyRateProvider + 'static> CurrencyRateProvider for CachingCurrencyRateProvider<T> {
    async fn get_rate(&self, base: &str, quote: &str) -> Result<f64> {
        let inner = Arc::clone(&self.inner);
        let (base, quote) = (base.to_string(), quote.to_string());
        let key = format!("{base}-{quote}");
        self.cache
            .get_or_try_fetch(key, move || async move { inner.get_rate(&base, &quote).await })
            .await
    }
}
