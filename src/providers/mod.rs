pub mod caching;
pub mod coincap;
pub mod exchange_rate;

use crate::core::config::ApiConfig;
use crate::core::error::Result;
use crate::core::market::MarketDataClient;
use caching::{CachingCurrencyRateProvider, CachingMarketDataProvider};
use coincap::CoinCapProvider;
use exchange_rate::ExchangeRateApiProvider;
use std::sync::Arc;

/// Builds the session client: HTTP providers for the configured endpoints,
/// each wrapped in its query cache.
pub fn client_from_config(config: &ApiConfig) -> Result<MarketDataClient> {
    let assets = CachingMarketDataProvider::new(CoinCapProvider::new(&config.assets_base_url)?);
    let rates =
        CachingCurrencyRateProvider::new(ExchangeRateApiProvider::new(&config.exchange_base_url)?);
    Ok(MarketDataClient::new(Arc::new(assets), Arc::new(rates)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_concurrent_details_issue_one_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assets/bitcoin"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(std::time::Duration::from_millis(50))
                    .set_body_string(
                        r#"{"data": {
                            "id": "bitcoin", "rank": "1", "symbol": "BTC", "name": "Bitcoin",
                            "supply": "19500000", "maxSupply": "21000000",
                            "marketCapUsd": "819000000000", "volumeUsd24Hr": "12000000000",
                            "priceUsd": "42000.12", "changePercent24Hr": "2.5"
                        }}"#,
                    ),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_from_config(&ApiConfig {
            assets_base_url: mock_server.uri(),
            exchange_base_url: mock_server.uri(),
        })
        .unwrap();

        let (a, b) = tokio::join!(
            client.asset_details("bitcoin"),
            client.asset_details("bitcoin")
        );
        assert_eq!(a.unwrap().id, "bitcoin");
        assert_eq!(b.unwrap().id, "bitcoin");
        // `expect(1)` is verified when the mock server drops
    }

    #[tokio::test]
    async fn test_exchange_rate_is_usd_to_brl() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/USD"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"rates": {"BRL": 5.1}}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_from_config(&ApiConfig {
            assets_base_url: mock_server.uri(),
            exchange_base_url: mock_server.uri(),
        })
        .unwrap();

        assert_eq!(client.exchange_rate().await.unwrap(), 5.1);
        assert_eq!(client.exchange_rate().await.unwrap(), 5.1);
    }
}
