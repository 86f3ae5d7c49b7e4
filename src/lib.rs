pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::route::Route;
use crate::cli::ui::Viewport;
use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::io::Write;
use std::num::NonZeroU32;
use tracing::{debug, info};

pub enum AppCommand {
    List {
        limit: Option<NonZeroU32>,
        brl: bool,
    },
    Show {
        id: String,
        brl: bool,
    },
    Browse {
        route: Route,
    },
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    narrow: bool,
) -> Result<()> {
    run_command_with_output(command, config_path, narrow, &mut std::io::stdout()).await
}

/// Runs `command`, writing the rendered `list`/`show` output to `out`.
/// `browse` is interactive and always uses the terminal.
pub async fn run_command_with_output<W: Write>(
    command: AppCommand,
    config_path: Option<&str>,
    narrow: bool,
    out: &mut W,
) -> Result<()> {
    info!("coinview starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let client = providers::client_from_config(&config.api_config())?;
    let viewport = Viewport::detect(narrow);
    let default_limit = config.listing.limit;

    let rendered = match command {
        AppCommand::List { limit, brl } => {
            cli::list(client, viewport, limit.unwrap_or(default_limit), brl).await
        }
        AppCommand::Show { id, brl } => cli::show(client, viewport, &id, brl).await,
        AppCommand::Browse { route } => {
            return cli::browse::run(client, viewport, default_limit, route).await;
        }
    };
    writeln!(out, "{rendered}").context("Failed to write output")?;
    Ok(())
}
