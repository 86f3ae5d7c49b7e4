//! Interactive navigation between the listing and detail screens.

use super::detail::DetailView;
use super::listing::ListingView;
use super::route::Route;
use super::ui::{self, Viewport};
use crate::core::market::MarketDataClient;
use anyhow::{Context, Result};
use std::num::NonZeroU32;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "Commands: <row #|id|symbol> open asset (listing), b back, c toggle USD/BRL, r refresh, q quit";
const DETAIL_HINT: &str = "Assets are opened from the listing; press b to go back to it";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(String),
    Back,
    ToggleCurrency,
    Refresh,
    Help,
    Quit,
}

impl Command {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "" | "r" | "refresh" => Command::Refresh,
            "b" | "back" => Command::Back,
            "c" | "brl" | "usd" => Command::ToggleCurrency,
            "?" | "h" | "help" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            other => Command::Open(other.to_string()),
        }
    }
}

/// What the screen loop should do after handling a command.
enum Next {
    Stay,
    Go(Route),
    Quit,
}

async fn read_command<R>(lines: &mut tokio::io::Lines<R>) -> Result<Command>
where
    R: AsyncBufRead + Unpin,
{
    print!("{} ", ui::style_text(">", ui::StyleType::Label));
    std::io::Write::flush(&mut std::io::stdout()).context("Failed to flush stdout")?;
    let line = lines
        .next_line()
        .await
        .context("Failed to read from stdin")?;
    // end of input behaves like quit
    Ok(line.map_or(Command::Quit, |l| Command::parse(&l)))
}

async fn listing_screen<R>(
    client: &MarketDataClient,
    viewport: Viewport,
    limit: NonZeroU32,
    lines: &mut tokio::io::Lines<R>,
) -> Result<Option<Route>>
where
    R: AsyncBufRead + Unpin,
{
    let mut view = ListingView::mount(client.clone(), viewport, limit);
    ui::with_spinner(view.loaded()).await;
    println!("{}", view.render());

    loop {
        let next = match read_command(lines).await? {
            Command::Quit => Next::Quit,
            Command::Back => Next::Stay,
            Command::Help => {
                println!("{HELP}");
                Next::Stay
            }
            Command::ToggleCurrency => {
                view.toggle_currency();
                Next::Stay
            }
            Command::Refresh => Next::Stay,
            Command::Open(input) => match view.select(&input) {
                Some(route) => Next::Go(route),
                None => {
                    println!(
                        "{}",
                        ui::style_text(&format!("No asset matches {input:?}"), ui::StyleType::Error)
                    );
                    continue;
                }
            },
        };
        match next {
            Next::Quit => return Ok(None),
            Next::Go(route) => return Ok(Some(route)),
            Next::Stay => println!("{}", view.render()),
        }
    }
}

async fn detail_screen<R>(
    client: &MarketDataClient,
    viewport: Viewport,
    id: &str,
    lines: &mut tokio::io::Lines<R>,
) -> Result<Option<Route>>
where
    R: AsyncBufRead + Unpin,
{
    let mut view = DetailView::mount(client.clone(), viewport, id);
    ui::with_spinner(view.loaded()).await;
    println!("{}", view.render());

    loop {
        match read_command(lines).await? {
            Command::Quit => return Ok(None),
            Command::Back => return Ok(Some(Route::Listing)),
            Command::Help => println!("{HELP}"),
            Command::ToggleCurrency => {
                view.toggle_currency();
                println!("{}", view.render());
            }
            Command::Refresh => println!("{}", view.render()),
            Command::Open(input) => println!(
                "{}",
                ui::style_text(
                    &format!("Unknown command {input:?}. {DETAIL_HINT}"),
                    ui::StyleType::Error
                )
            ),
        }
    }
}

/// Runs the screen loop on `input` starting at `start` until the user quits.
pub async fn run_with_input<R>(
    client: MarketDataClient,
    viewport: Viewport,
    limit: NonZeroU32,
    start: Route,
    input: R,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut route = start;
    println!("{HELP}");
    loop {
        debug!(%route, "Navigating");
        let next = match &route {
            Route::Listing => listing_screen(&client, viewport, limit, &mut lines).await?,
            Route::Detail(id) => detail_screen(&client, viewport, id, &mut lines).await?,
        };
        match next {
            Some(next) => {
                ui::print_separator(viewport);
                route = next;
            }
            None => return Ok(()),
        }
    }
}

pub async fn run(
    client: MarketDataClient,
    viewport: Viewport,
    limit: NonZeroU32,
    start: Route,
) -> Result<()> {
    run_with_input(
        client,
        viewport,
        limit,
        start,
        BufReader::new(tokio::io::stdin()),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::fixtures::{asset, fake_client};

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(""), Command::Refresh);
        assert_eq!(Command::parse(" b "), Command::Back);
        assert_eq!(Command::parse("c"), Command::ToggleCurrency);
        assert_eq!(Command::parse("q"), Command::Quit);
        assert_eq!(Command::parse("?"), Command::Help);
        assert_eq!(Command::parse("3"), Command::Open("3".to_string()));
        assert_eq!(Command::parse("btc"), Command::Open("btc".to_string()));
    }

    #[tokio::test]
    async fn test_browse_session() {
        let (client, calls) = fake_client(
            vec![
                asset("bitcoin", 1, "BTC", "42000.12", "819000000000", "2.5"),
                asset("ethereum", 2, "ETH", "2250.50", "270000000000", "-0.75"),
            ],
            Some(5.0),
        );
        // open row 1, toggle BRL, go back, open ETH by symbol, quit
        let input: &[u8] = b"1\nc\nb\neth\nq\n";

        run_with_input(
            client,
            Viewport::new(false),
            NonZeroU32::new(50).unwrap(),
            Route::Listing,
            input,
        )
        .await
        .unwrap();

        // Without a caching provider every mount issues its own requests
        assert_eq!(calls.listings(), 2);
        assert_eq!(calls.details(), 2);
        assert_eq!(calls.histories(), 2);
    }

    #[tokio::test]
    async fn test_browse_ends_on_end_of_input() {
        let (client, calls) = fake_client(
            vec![asset("bitcoin", 1, "BTC", "42000.12", "819000000000", "2.5")],
            None,
        );
        let input: &[u8] = b"";

        run_with_input(
            client,
            Viewport::new(false),
            NonZeroU32::new(50).unwrap(),
            Route::Detail("bitcoin".to_string()),
            input,
        )
        .await
        .unwrap();

        assert_eq!(calls.details(), 1);
        assert_eq!(calls.listings(), 0);
    }

    #[tokio::test]
    async fn test_detail_screen_ignores_listing_selections() {
        let (client, calls) = fake_client(
            vec![
                asset("bitcoin", 1, "BTC", "42000.12", "819000000000", "2.5"),
                asset("ethereum", 2, "ETH", "2250.50", "270000000000", "-0.75"),
            ],
            None,
        );
        // row numbers and symbols only mean something on the listing
        let input: &[u8] = b"1\neth\n2\nq\n";

        run_with_input(
            client,
            Viewport::new(false),
            NonZeroU32::new(50).unwrap(),
            Route::Listing,
            input,
        )
        .await
        .unwrap();

        assert_eq!(calls.listings(), 1);
        assert_eq!(calls.details(), 1);
        assert_eq!(calls.histories(), 1);
    }
}
