use super::chart::PriceChart;
use super::ui::{self, Viewport};
use crate::core::asset::{Asset, HistoryPoint};
use crate::core::currency::CurrencyDisplay;
use crate::core::format::{self, ChangeIndicator};
use crate::core::market::MarketDataClient;
use crate::core::query::{Query, QueryState};
use comfy_table::Cell;

const CHART_HEIGHT: usize = 12;
const NARROW_CHART_HEIGHT: usize = 8;

/// Current figures of one asset, formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSnapshot {
    pub title: String,
    pub price: String,
    pub change: ChangeIndicator,
    pub market_cap: String,
    pub volume_24h: String,
    pub supply: String,
    pub max_supply: String,
}

impl AssetSnapshot {
    pub fn build(asset: &Asset, display: &CurrencyDisplay) -> Self {
        Self {
            title: format!("{} ({})", asset.name, asset.symbol),
            price: format::price(asset.price_usd, display),
            change: ChangeIndicator::new(asset.change_percent_24h),
            market_cap: format::millions(asset.market_cap_usd, display),
            volume_24h: format::millions(asset.volume_usd_24h, display),
            // supply is a coin count, never converted
            supply: format::units_in_millions(asset.supply),
            max_supply: format::max_supply(asset.max_supply),
        }
    }

    pub fn render(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Market Cap"), ui::header_cell("Volume (24h)")]);
        table.add_row(vec![
            Cell::new(&self.market_cap),
            Cell::new(&self.volume_24h),
        ]);
        table.add_row(vec![ui::header_cell("Supply"), ui::header_cell("Max Supply")]);
        table.add_row(vec![Cell::new(&self.supply), Cell::new(&self.max_supply)]);

        format!(
            "{}  {}\n{}\n\n{}",
            ui::style_text(&self.title, ui::StyleType::Title),
            ui::style_text(&self.price, ui::StyleType::Label),
            ui::change_text(&self.change),
            table
        )
    }
}

pub struct DetailView {
    id: String,
    client: MarketDataClient,
    viewport: Viewport,
    asset: Query<Asset>,
    history: Query<Vec<HistoryPoint>>,
    brl: bool,
    rate: Option<Query<f64>>,
}

impl DetailView {
    /// Mounts the view for `id`: details and history are requested together.
    pub fn mount(client: MarketDataClient, viewport: Viewport, id: &str) -> Self {
        let details_client = client.clone();
        let details_id = id.to_string();
        let asset = Query::spawn(format!("asset/{id}"), async move {
            details_client.asset_details(&details_id).await
        });

        let history_client = client.clone();
        let history_id = id.to_string();
        let history = Query::spawn(format!("history/{id}"), async move {
            history_client.asset_history(&history_id).await
        });

        Self {
            id: id.to_string(),
            client,
            viewport,
            asset,
            history,
            brl: false,
            rate: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn brl_enabled(&self) -> bool {
        self.brl
    }

    pub fn toggle_currency(&mut self) {
        self.set_brl(!self.brl);
    }

    pub fn set_brl(&mut self, enabled: bool) {
        self.brl = enabled;
        if enabled && self.rate.is_none() {
            self.rate = Some(super::rate_query(&self.client));
        }
    }

    pub fn currency_display(&self) -> CurrencyDisplay {
        CurrencyDisplay::resolve(self.brl, self.rate.as_ref().and_then(|q| q.data()))
    }

    /// Waits for the details request; history may still be in flight.
    pub async fn loaded(&self) -> QueryState<Asset> {
        self.asset.settled().await
    }

    /// Waits for every request the view has issued.
    pub async fn settled(&self) {
        self.asset.settled().await;
        self.history.settled().await;
        if let Some(rate) = &self.rate {
            rate.settled().await;
        }
    }

    pub fn snapshot(&self) -> Option<AssetSnapshot> {
        self.asset
            .data()
            .map(|asset| AssetSnapshot::build(&asset, &self.currency_display()))
    }

    /// Chart of whatever history has arrived; empty while it is pending.
    pub fn chart(&self) -> PriceChart {
        let history = self.history.data().unwrap_or_default();
        PriceChart::new(&history, &self.currency_display(), self.viewport)
    }

    pub fn render(&self) -> String {
        let asset = match self.asset.state() {
            QueryState::Loading => return ui::LOADING_LABEL.to_string(),
            QueryState::Failed(e) => return ui::error_line(&e),
            QueryState::Ready(asset) => asset,
        };
        let display = self.currency_display();
        let snapshot = AssetSnapshot::build(&asset, &display);

        let mut output = snapshot.render();
        output.push_str(&format!(
            "\n\n{}\n",
            ui::style_text("Price History", ui::StyleType::Title)
        ));

        match self.history.state() {
            QueryState::Failed(e) => output.push_str(&ui::error_line(&e)),
            _ => {
                let chart = self.chart();
                let height = if self.viewport.narrow {
                    NARROW_CHART_HEIGHT
                } else {
                    CHART_HEIGHT
                };
                output.push_str(&chart.render(self.viewport.width(), height));
                if let Some(tooltip) = chart.latest() {
                    output.push_str(&ui::style_text(
                        &tooltip.to_string(),
                        ui::StyleType::Subtle,
                    ));
                }
            }
        }

        if let Some(note) = super::currency_note(self.brl, self.rate.as_ref()) {
            output.push_str(&format!("\n{note}"));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::fixtures::{FakeHistory, asset, fake_client, fake_client_with_history};
    use crate::core::config::ApiConfig;
    use crate::core::error::MarketDataError;
    use crate::core::format::Direction;
    use crate::providers::client_from_config;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BITCOIN_JSON: &str = r#"{"data": {
        "id": "bitcoin", "rank": "1", "symbol": "BTC", "name": "Bitcoin",
        "supply": "19500000", "maxSupply": "21000000",
        "marketCapUsd": "819000000000", "volumeUsd24Hr": "12000000000",
        "priceUsd": "42000.12", "changePercent24Hr": "2.5"
    }}"#;

    async fn http_client(server: &MockServer) -> MarketDataClient {
        client_from_config(&ApiConfig {
            assets_base_url: server.uri(),
            exchange_base_url: server.uri(),
        })
        .unwrap()
    }

    fn bitcoin() -> Asset {
        let mut bitcoin = asset("bitcoin", 1, "BTC", "100.004", "2500000000", "-3.14159");
        bitcoin.volume_usd_24h = 12_345_678_901.0;
        bitcoin.supply = 19_500_000.0;
        bitcoin.max_supply = Some(21_000_000.0);
        bitcoin
    }

    #[test]
    fn test_snapshot_formatting() {
        let snapshot = AssetSnapshot::build(&bitcoin(), &CurrencyDisplay::usd());
        assert_eq!(snapshot.title, "Bitcoin (BTC)");
        assert_eq!(snapshot.price, "$100.00");
        assert_eq!(snapshot.change.direction, Direction::Down);
        assert_eq!(snapshot.change.magnitude, "3.14%");
        assert_eq!(snapshot.market_cap, "$2500M");
        assert_eq!(snapshot.volume_24h, "$12346M");
        assert_eq!(snapshot.supply, "20M");
        assert_eq!(snapshot.max_supply, "21M");
    }

    #[test]
    fn test_snapshot_unlimited_supply() {
        let mut asset = bitcoin();
        asset.max_supply = None;
        let snapshot = AssetSnapshot::build(&asset, &CurrencyDisplay::usd());
        assert_eq!(snapshot.max_supply, "∞");
    }

    #[test]
    fn test_brl_never_touches_supply() {
        let brl = CurrencyDisplay::resolve(true, Some(2.0));
        let snapshot = AssetSnapshot::build(&bitcoin(), &brl);
        assert_eq!(snapshot.price, "R$200.01");
        assert_eq!(snapshot.market_cap, "R$5000M");
        assert_eq!(snapshot.supply, "20M");
        assert_eq!(snapshot.max_supply, "21M");
    }

    #[tokio::test]
    async fn test_detail_view_requests_details_and_history() {
        let (client, calls) = fake_client(vec![bitcoin()], Some(5.0));
        let view = DetailView::mount(client, Viewport::new(false), "bitcoin");
        assert_eq!(view.render(), "Loading...");

        view.settled().await;
        assert_eq!(calls.details(), 1);
        assert_eq!(calls.histories(), 1);

        let rendered = view.render();
        assert!(rendered.contains("Bitcoin (BTC)"));
        assert!(rendered.contains("Price History"));
        assert!(rendered.contains("$43000.50"));
        assert_eq!(view.chart().points().len(), 2);
    }

    #[tokio::test]
    async fn test_detail_view_currency_toggle() {
        let (client, _calls) = fake_client(vec![bitcoin()], Some(5.0));
        let mut view = DetailView::mount(client, Viewport::new(true), "bitcoin");
        view.settled().await;
        let usd = view.snapshot().unwrap();

        view.toggle_currency();
        view.settled().await;
        assert_eq!(view.snapshot().unwrap().price, "R$500.02");
        assert_eq!(view.chart().points()[0].value, Some(42000.12 * 5.0));
        assert_eq!(view.chart().y_tick(1.0), "R$1.00");

        view.toggle_currency();
        assert_eq!(view.snapshot().unwrap(), usd);
    }

    #[tokio::test]
    async fn test_unknown_asset_shows_error() {
        let (client, _calls) = fake_client(vec![bitcoin()], None);
        let view = DetailView::mount(client, Viewport::new(false), "dogecoinx");
        view.loaded().await;
        let rendered = view.render();
        assert!(rendered.contains("Failed to load"));
        assert!(rendered.contains("dogecoinx"));
        assert_eq!(view.id(), "dogecoinx");
    }

    #[tokio::test]
    async fn test_pending_history_renders_snapshot_and_empty_chart() {
        let (client, calls) =
            fake_client_with_history(vec![bitcoin()], None, FakeHistory::Pending);
        let view = DetailView::mount(client, Viewport::new(false), "bitcoin");
        view.loaded().await;

        let rendered = view.render();
        assert!(rendered.contains("Bitcoin (BTC)"));
        assert!(rendered.contains("Price History"));
        assert!(rendered.contains("No price history yet"));
        assert!(!rendered.contains("Failed to load"));
        assert!(view.chart().is_empty());
        assert_eq!(calls.histories(), 1);
    }

    #[tokio::test]
    async fn test_bad_history_price_shows_invalid_point() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assets/bitcoin"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BITCOIN_JSON))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/assets/bitcoin/history"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data": [
                    {"priceUsd": "42000.12", "date": "2024-01-01T00:00:00.000Z"},
                    {"priceUsd": "NaN", "date": "2024-01-02T00:00:00.000Z"},
                    {"priceUsd": "43000.50", "date": "2024-01-03T00:00:00.000Z"}
                ]}"#,
            ))
            .mount(&mock_server)
            .await;

        let client = http_client(&mock_server).await;
        let view = DetailView::mount(client, Viewport::new(false), "bitcoin");
        view.settled().await;

        let rendered = view.render();
        assert!(rendered.contains("Price History"));
        assert!(!rendered.contains("Failed to load"));
        assert!(rendered.contains("Price: $43000.50"));

        let chart = view.chart();
        assert_eq!(chart.points().len(), 3);
        assert_eq!(chart.tooltip(1).label, "1/2/2024");
        assert_eq!(chart.tooltip(1).price, "Invalid");
        assert_eq!(chart.tooltip(2).price, "$43000.50");
    }

    #[tokio::test]
    async fn test_remount_retries_failed_details() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assets/bitcoin"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/assets/bitcoin"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BITCOIN_JSON))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/assets/bitcoin/history"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data": []}"#))
            .mount(&mock_server)
            .await;
        let client = http_client(&mock_server).await;

        let first = DetailView::mount(client.clone(), Viewport::new(false), "bitcoin");
        assert!(matches!(
            first.loaded().await,
            QueryState::Failed(MarketDataError::Network(_))
        ));
        assert!(first.render().contains("Failed to load"));
        drop(first);

        let second = DetailView::mount(client, Viewport::new(false), "bitcoin");
        assert!(matches!(second.loaded().await, QueryState::Ready(_)));
        assert!(second.render().contains("Bitcoin (BTC)"));

        let requests = mock_server.received_requests().await.unwrap();
        let detail_requests = requests
            .iter()
            .filter(|r| r.url.path() == "/assets/bitcoin")
            .count();
        assert_eq!(detail_requests, 2);
    }
}
