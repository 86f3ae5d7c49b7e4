use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::currency::CurrencyRateProvider;
use crate::core::error::{MarketDataError, Result};

/// Rate tables from exchangerate-api.com, one table per base currency.
pub struct ExchangeRateApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("coinview/1.0")
            .build()
            .map_err(|e| MarketDataError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RateTableResponse {
    rates: Option<HashMap<String, f64>>,
}

#[async_trait]
impl CurrencyRateProvider for ExchangeRateApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self), fields(pair = %format!("{base}{quote}")))]
    async fn get_rate(&self, base: &str, quote: &str) -> Result<f64> {
        let url = format!("{}/{}", self.base_url, base);
        debug!("Requesting rate table from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            MarketDataError::Network(format!("Request error: {e} for currency pair: {base}{quote}"))
        })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::NotFound(format!("rate table for {base}")));
        }
        if !response.status().is_success() {
            return Err(MarketDataError::Network(format!(
                "HTTP error: {} for currency pair: {base}{quote}",
                response.status()
            )));
        }

        let text = response.text().await.map_err(|e| {
            MarketDataError::Network(format!("Failed to read rate table for {base}: {e}"))
        })?;

        let data: RateTableResponse = serde_json::from_str(&text).map_err(|e| {
            MarketDataError::Schema(format!("Failed to parse JSON response for {base}: {e}"))
        })?;

        let rate = data
            .rates
            .as_ref()
            .and_then(|rates| rates.get(quote))
            .copied()
            .ok_or_else(|| {
                MarketDataError::Schema(format!("No {quote} rate in rate table for {base}"))
            })?;

        if !rate.is_finite() || rate <= 0.0 {
            return Err(MarketDataError::Schema(format!(
                "{quote} rate for {base} is not positive: {rate}"
            )));
        }
        Ok(rate)
    }
}
