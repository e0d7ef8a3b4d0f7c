use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use networth::cli::assets::SortKey;
use networth::core::asset::{Category, Currency, Market};
use networth::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for networth::AppCommand {
    fn from(cmd: Commands) -> networth::AppCommand {
        match cmd {
            Commands::Summary => networth::AppCommand::Summary,
            Commands::History { months } => networth::AppCommand::History { months },
            Commands::List { category, sort } => networth::AppCommand::List { category, sort },
            Commands::Add {
                category,
                name,
                value,
                currency,
                note,
            } => networth::AppCommand::Add {
                category,
                name,
                value,
                currency,
                note,
            },
            Commands::AddStock {
                symbol,
                shares,
                market,
                note,
            } => networth::AppCommand::AddStock {
                symbol,
                shares,
                market,
                note,
            },
            Commands::Edit {
                id,
                name,
                value,
                note,
            } => networth::AppCommand::Edit {
                id,
                name,
                value,
                note,
            },
            Commands::Rm { id } => networth::AppCommand::Remove { id },
            Commands::Import { path } => networth::AppCommand::Import { path },
            Commands::Export { path } => networth::AppCommand::Export { path },
            Commands::Backup { path } => networth::AppCommand::Backup { path },
            Commands::Restore { path } => networth::AppCommand::Restore { path },
            Commands::Reset { yes } => networth::AppCommand::Reset { yes },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Refresh quotes and display the portfolio valuation
    Summary,
    /// Display recorded snapshots and growth rates
    History {
        /// How many months back to include
        #[arg(long, default_value_t = 12)]
        months: u32,
    },
    /// List the assets in the ledger
    List {
        /// Only show one category
        #[arg(long)]
        category: Option<Category>,
        /// Sort by 'value' or 'date'
        #[arg(long)]
        sort: Option<SortKey>,
    },
    /// Add an asset
    Add {
        /// Category name, e.g. cash, insurance, property, mortgage
        category: Category,
        name: String,
        value: f64,
        /// Currency code: TWD, USD, JPY, CNY or EUR
        #[arg(long, default_value = "TWD")]
        currency: Currency,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Add a stock holding valued by live quotes
    AddStock {
        symbol: String,
        shares: u64,
        /// Market the symbol trades on: 'tw' or 'us'
        #[arg(long, default_value = "tw")]
        market: Market,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Edit an asset, matched by id prefix
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        value: Option<f64>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Remove an asset, matched by id prefix
    Rm { id: String },
    /// Import assets from a CSV file
    Import { path: PathBuf },
    /// Export assets as CSV, to a file or stdout
    Export { path: Option<PathBuf> },
    /// Write a JSON backup of assets and history
    Backup { path: PathBuf },
    /// Restore assets and history from a JSON backup
    Restore { path: PathBuf },
    /// Delete every asset and the entire history
    Reset {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => networth::cli::setup::setup(),
        Some(cmd) => networth::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
