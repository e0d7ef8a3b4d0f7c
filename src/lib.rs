pub mod cli;
pub mod core;
pub mod providers;
pub mod store;
pub mod tracker;

use crate::cli::assets::SortKey;
use crate::core::asset::{Category, Currency, Market};
use crate::core::clock::SystemClock;
use crate::core::config::AppConfig;
use crate::core::quote::QuoteCache;
use crate::providers::yahoo::{YahooFxProvider, YahooQuoteProvider};
use crate::store::DiskStore;
use crate::tracker::Tracker;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Commands the library knows how to run, decoupled from the clap surface.
#[derive(Debug, Clone)]
pub enum AppCommand {
    Summary,
    History {
        months: u32,
    },
    List {
        category: Option<Category>,
        sort: Option<SortKey>,
    },
    Add {
        category: Category,
        name: String,
        value: f64,
        currency: Currency,
        note: String,
    },
    AddStock {
        symbol: String,
        shares: u64,
        market: Market,
        note: String,
    },
    Edit {
        id: String,
        name: Option<String>,
        value: Option<f64>,
        note: Option<String>,
    },
    Remove {
        id: String,
    },
    Import {
        path: PathBuf,
    },
    Export {
        path: Option<PathBuf>,
    },
    Backup {
        path: PathBuf,
    },
    Restore {
        path: PathBuf,
    },
    Reset {
        yes: bool,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Net worth tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let base_url = config
        .providers
        .yahoo
        .as_ref()
        .map_or("https://query1.finance.yahoo.com", |p| &p.base_url);

    let store = Arc::new(DiskStore::open(&config.default_data_path()?.join("store"))?);
    let mut tracker = Tracker::open(
        store,
        Arc::new(QuoteCache::new()),
        Arc::new(YahooQuoteProvider::new(base_url)),
        Arc::new(YahooFxProvider::new(base_url)),
        Arc::new(SystemClock),
    );

    match command {
        AppCommand::Summary => cli::summary::run(&tracker).await,
        AppCommand::History { months } => cli::history::run(&tracker, months),
        AppCommand::List { category, sort } => cli::assets::list(&tracker, category, sort),
        AppCommand::Add {
            category,
            name,
            value,
            currency,
            note,
        } => cli::assets::add(&mut tracker, category, &name, value, currency, &note),
        AppCommand::AddStock {
            symbol,
            shares,
            market,
            note,
        } => cli::assets::add_stock(&mut tracker, &symbol, shares, market, &note),
        AppCommand::Edit {
            id,
            name,
            value,
            note,
        } => cli::assets::edit(&mut tracker, &id, name.as_deref(), value, note.as_deref()),
        AppCommand::Remove { id } => cli::assets::remove(&mut tracker, &id),
        AppCommand::Import { path } => cli::transfer::import(&mut tracker, &path),
        AppCommand::Export { path } => cli::transfer::export(&tracker, path.as_deref()),
        AppCommand::Backup { path } => cli::transfer::backup(&tracker, &path),
        AppCommand::Restore { path } => cli::transfer::restore(&mut tracker, &path),
        AppCommand::Reset { yes } => cli::assets::reset(&mut tracker, yes),
    }
}
