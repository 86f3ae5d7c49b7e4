use super::route::Route;
use super::ui::{self, Viewport};
use crate::core::asset::Asset;
use crate::core::currency::{Currency, CurrencyDisplay};
use crate::core::format::{self, ChangeIndicator};
use crate::core::market::MarketDataClient;
use crate::core::query::{Query, QueryState};
use comfy_table::{Cell, Table};
use std::num::NonZeroU32;

#[derive(Debug, Clone, PartialEq)]
pub struct ListingRow {
    pub id: String,
    pub rank: u32,
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub market_cap: String,
    pub change: ChangeIndicator,
}

/// The ranked asset table as it will be displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingTable {
    pub currency: Currency,
    pub narrow: bool,
    pub rows: Vec<ListingRow>,
}

impl ListingTable {
    /// One row per asset, in the order given.
    pub fn build(assets: &[Asset], display: &CurrencyDisplay, viewport: Viewport) -> Self {
        let rows = assets
            .iter()
            .map(|asset| ListingRow {
                id: asset.id.clone(),
                rank: asset.rank,
                symbol: asset.symbol.clone(),
                name: asset.name.clone(),
                price: format::price(asset.price_usd, display),
                market_cap: format::millions(asset.market_cap_usd, display),
                change: ChangeIndicator::new(asset.change_percent_24h),
            })
            .collect();
        Self {
            currency: display.currency(),
            narrow: viewport.narrow,
            rows,
        }
    }

    pub fn headers(&self) -> Vec<String> {
        let price = format!("Price {}", self.currency.code());
        if self.narrow {
            vec!["Rank".to_string(), price, "24h Change".to_string()]
        } else {
            vec![
                "Rank".to_string(),
                "Name".to_string(),
                price,
                "Market Cap".to_string(),
                "24h Change".to_string(),
            ]
        }
    }

    pub fn to_table(&self) -> Table {
        let mut table = ui::new_styled_table();
        table.set_header(
            self.headers()
                .iter()
                .map(|h| ui::header_cell(h))
                .collect::<Vec<_>>(),
        );

        for row in &self.rows {
            let mut cells = vec![Cell::new(row.rank)];
            if !self.narrow {
                cells.push(Cell::new(format!(
                    "{} {}",
                    row.symbol,
                    ui::style_text(&row.name, ui::StyleType::Subtle)
                )));
            }
            cells.push(ui::right_cell(&row.price));
            if !self.narrow {
                cells.push(ui::right_cell(&row.market_cap));
            }
            cells.push(ui::change_cell(&row.change));
            table.add_row(cells);
        }
        table
    }

    /// Finds the row a user picked, by 1-based row number, id or symbol.
    pub fn select(&self, input: &str) -> Option<&ListingRow> {
        let input = input.trim();
        if let Ok(number) = input.parse::<usize>() {
            return number.checked_sub(1).and_then(|i| self.rows.get(i));
        }
        self.rows.iter().find(|row| {
            row.id.eq_ignore_ascii_case(input) || row.symbol.eq_ignore_ascii_case(input)
        })
    }
}

pub struct ListingView {
    client: MarketDataClient,
    viewport: Viewport,
    assets: Query<Vec<Asset>>,
    brl: bool,
    rate: Option<Query<f64>>,
}

impl ListingView {
    /// Mounts the view: issues the listing request, currency starts in USD.
    pub fn mount(client: MarketDataClient, viewport: Viewport, limit: NonZeroU32) -> Self {
        let fetch_client = client.clone();
        let assets = Query::spawn(format!("assets?limit={limit}"), async move {
            fetch_client.list_assets(limit).await
        });
        Self {
            client,
            viewport,
            assets,
            brl: false,
            rate: None,
        }
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

    /// Waits for the listing request to finish.
    pub async fn loaded(&self) -> QueryState<Vec<Asset>> {
        self.assets.settled().await
    }

    /// Waits for every request the view has issued.
    pub async fn settled(&self) {
        self.assets.settled().await;
        if let Some(rate) = &self.rate {
            rate.settled().await;
        }
    }

    pub fn table(&self) -> Option<ListingTable> {
        self.assets
            .data()
            .map(|assets| ListingTable::build(&assets, &self.currency_display(), self.viewport))
    }

    pub fn render(&self) -> String {
        let assets = match self.assets.state() {
            QueryState::Loading => return ui::LOADING_LABEL.to_string(),
            QueryState::Failed(e) => return ui::error_line(&e),
            QueryState::Ready(assets) => assets,
        };

        let table = ListingTable::build(&assets, &self.currency_display(), self.viewport);
        let mut output = format!(
            "{}\n\n{}",
            ui::style_text("Crypto Assets", ui::StyleType::Title),
            table.to_table()
        );
        if let Some(note) = super::currency_note(self.brl, self.rate.as_ref()) {
            output.push_str(&format!("\n{note}"));
        }
        output
    }

    /// Route for the row the user picked, if any.
    pub fn select(&self, input: &str) -> Option<Route> {
        let table = self.table()?;
        table
            .select(input)
            .map(|row| Route::Detail(row.id.clone()))
    }
}
