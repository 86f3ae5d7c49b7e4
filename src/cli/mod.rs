pub mod browse;
pub mod chart;
pub mod detail;
pub mod listing;
pub mod route;
pub mod setup;
pub mod ui;

use crate::core::market::MarketDataClient;
use crate::core::query::{Query, QueryState};
use detail::DetailView;
use listing::ListingView;
use std::num::NonZeroU32;
use ui::Viewport;

/// Starts the USD to BRL rate request for a view.
fn rate_query(client: &MarketDataClient) -> Query<f64> {
    let client = client.clone();
    Query::spawn("rate/USD-BRL", async move { client.exchange_rate().await })
}

/// Explains why the view still shows USD after BRL was asked for.
fn currency_note(brl: bool, rate: Option<&Query<f64>>) -> Option<String> {
    if !brl {
        return None;
    }
    match rate.map(|q| q.state()) {
        Some(QueryState::Ready(_)) => None,
        Some(QueryState::Failed(e)) => Some(ui::style_text(
            &format!("BRL rate unavailable ({e}), showing USD"),
            ui::StyleType::Error,
        )),
        _ => Some(ui::style_text(
            "BRL rate loading, showing USD",
            ui::StyleType::Subtle,
        )),
    }
}

/// Renders the listing once every request it issued has finished.
pub async fn list(
    client: MarketDataClient,
    viewport: Viewport,
    limit: NonZeroU32,
    brl: bool,
) -> String {
    let mut view = ListingView::mount(client, viewport, limit);
    view.set_brl(brl);
    ui::with_spinner(view.settled()).await;
    view.render()
}

/// Renders the detail view of `id` once every request it issued has finished.
pub async fn show(client: MarketDataClient, viewport: Viewport, id: &str, brl: bool) -> String {
    let mut view = DetailView::mount(client, viewport, id);
    view.set_brl(brl);
    ui::with_spinner(view.settled()).await;
    view.render()
}
