use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use coinview::cli::route::Route;
use coinview::core::log::init_logging;
use std::num::NonZeroU32;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Use the compact layout regardless of terminal width
    #[arg(long, global = true)]
    narrow: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for coinview::AppCommand {
    fn from(cmd: Commands) -> coinview::AppCommand {
        match cmd {
            Commands::List { limit, brl } => coinview::AppCommand::List { limit, brl },
            Commands::Show { id, brl } => coinview::AppCommand::Show { id, brl },
            Commands::Browse { route } => coinview::AppCommand::Browse { route },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the ranked asset listing
    List {
        /// Number of assets to fetch
        #[arg(short, long)]
        limit: Option<NonZeroU32>,
        /// Show prices in Brazilian reais
        #[arg(long)]
        brl: bool,
    },
    /// Display details and price history of one asset
    Show {
        /// Asset id, e.g. `bitcoin`
        id: String,
        /// Show prices in Brazilian reais
        #[arg(long)]
        brl: bool,
    },
    /// Navigate between the listing and asset details interactively
    Browse {
        /// Screen to start on: `/` or `/asset/<id>`
        #[arg(long, default_value = "/")]
        route: Route,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => coinview::cli::setup::setup(),
        Some(cmd) => {
            coinview::run_command(cmd.into(), cli.config_path.as_deref(), cli.narrow).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
