use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use tracing::{debug, instrument};

use crate::core::asset::{Asset, AssetRecord, HistoryPoint, HistoryRecord};
use crate::core::error::{MarketDataError, Result};
use crate::core::market::MarketDataProvider;

/// Every CoinCap payload is wrapped in `{ "data": ... }`.
#[derive(Deserialize, Debug)]
struct Envelope<T> {
    data: Option<T>,
}

pub struct CoinCapProvider {
    base_url: Url,
    client: reqwest::Client,
}

impl CoinCapProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("coinview/1.0")
            .build()
            .map_err(|e| MarketDataError::Network(format!("Failed to build HTTP client: {e}")))?;
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            MarketDataError::InvalidRequest(format!("invalid CoinCap base URL {base_url:?}: {e}"))
        })?;
        Ok(CoinCapProvider { base_url, client })
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str], query: Option<(&str, &str)>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                MarketDataError::InvalidRequest(format!(
                    "CoinCap base URL cannot take a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        if let Some((key, value)) = query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }

    async fn fetch_data<T: DeserializeOwned>(
        &self,
        url: Url,
        resource: &str,
    ) -> Result<T> {
        debug!("Requesting {} from {}", resource, url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| MarketDataError::Network(format!("Request error: {e} for URL: {url}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(MarketDataError::NotFound(resource.to_string()));
        }
        if !status.is_success() {
            return Err(MarketDataError::Network(format!(
                "HTTP error: {status} for {resource}"
            )));
        }

        let text = response.text().await.map_err(|e| {
            MarketDataError::Network(format!("Failed to read response for {resource}: {e}"))
        })?;

        let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|e| {
            MarketDataError::Schema(format!("Failed to parse JSON response for {resource}: {e}"))
        })?;

        envelope.data.ok_or_else(|| {
            MarketDataError::Schema(format!("missing `data` field in response for {resource}"))
        })
    }
}

#[async_trait]
impl MarketDataProvider for CoinCapProvider {
    #[instrument(name = "CoinCapListAssets", skip(self), fields(limit = %limit))]
    async fn list_assets(&self, limit: NonZeroU32) -> Result<Vec<Asset>> {
        let limit_param = limit.to_string();
        let url = self.endpoint(&["assets"], Some(("limit", limit_param.as_str())))?;
        let records: Vec<AssetRecord> = self.fetch_data(url, "asset listing").await?;

        let mut assets = records
            .into_iter()
            .map(Asset::try_from)
            .collect::<Result<Vec<_>>>()?;
        assets.truncate(limit.get() as usize);
        Ok(assets)
    }

    #[instrument(name = "CoinCapAsset", skip(self), fields(id = %id))]
    async fn asset(&self, id: &str) -> Result<Asset> {
        let url = self.endpoint(&["assets", id], None)?;
        let record: AssetRecord = self.fetch_data(url, &format!("asset {id}")).await?;
        Asset::try_from(record)
    }

    #[instrument(name = "CoinCapAssetHistory", skip(self), fields(id = %id))]
    async fn asset_history(&self, id: &str) -> Result<Vec<HistoryPoint>> {
        let url = self.endpoint(&["assets", id, "history"], Some(("interval", "d1")))?;
        let records: Vec<HistoryRecord> = self
            .fetch_data(url, &format!("history of asset {id}"))
            .await?;
        records.into_iter().map(HistoryPoint::try_from).collect()
    }
}
