use crate::core::asset::{Asset, Category, Currency, Market};
use crate::core::clock::Clock;
use crate::core::csv;
use crate::core::history::{GrowthPoint, History, Snapshot};
use crate::core::quote::{FxRateProvider, QuoteCache, QuoteProvider};
use crate::core::store::{Backup, Store};
use crate::core::valuation::{self, PortfolioValuation};
use anyhow::{Result, bail};
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

const EVENT_CAPACITY: usize = 32;
const FX_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    AssetsChanged,
    QuotesRefreshed,
}

/// The stateful engine behind every command: the asset ledger, its snapshot
/// history, the quote cache, and the store they persist through.
///
/// Mutations apply in memory, persist through the store, append a history
/// snapshot, and kick off a background quote refresh. They never await
/// network I/O themselves; reads are synchronous over whatever the cache
/// holds right now.
pub struct Tracker {
    assets: Vec<Asset>,
    history: History,
    store: Arc<dyn Store>,
    quotes: Arc<QuoteCache>,
    quote_provider: Arc<dyn QuoteProvider>,
    fx_provider: Arc<dyn FxRateProvider>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<ChangeEvent>,
}

impl Tracker {
    /// Loads the ledger and history from the store. A load failure is logged
    /// and treated as an empty ledger rather than aborting startup.
    pub fn open(
        store: Arc<dyn Store>,
        quotes: Arc<QuoteCache>,
        quote_provider: Arc<dyn QuoteProvider>,
        fx_provider: Arc<dyn FxRateProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let assets = store.load_assets().unwrap_or_else(|err| {
            warn!("Failed to load assets, starting empty: {err:#}");
            Vec::new()
        });
        let snapshots = store.load_snapshots().unwrap_or_else(|err| {
            warn!("Failed to load history, starting empty: {err:#}");
            Vec::new()
        });
        debug!(
            assets = assets.len(),
            snapshots = snapshots.len(),
            "Opened tracker"
        );
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let tracker = Tracker {
            assets,
            history: History::new(snapshots),
            store,
            quotes,
            quote_provider,
            fx_provider,
            clock,
            events,
        };
        tracker.quotes.set_watchlist(tracker.watch_symbols());
        tracker
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    pub fn quotes(&self) -> &QuoteCache {
        &self.quotes
    }

    // ---- Mutations ----

    pub fn add_asset(
        &mut self,
        category: Category,
        name: &str,
        value: f64,
        currency: Currency,
        note: &str,
    ) -> Result<Uuid> {
        let asset = Asset::new(category, name, value, currency, note, self.clock.now())?;
        let id = asset.id;
        self.assets.push(asset);
        self.commit()?;
        Ok(id)
    }

    /// Adds a stock holding. The share count stands in as the nominal value
    /// until the first live quote lands.
    pub fn add_stock(
        &mut self,
        symbol: &str,
        shares: u64,
        market: Market,
        note: &str,
    ) -> Result<Uuid> {
        let asset =
            Asset::new_stock(symbol, shares, market, shares as f64, note, self.clock.now())?;
        let id = asset.id;
        self.assets.push(asset);
        self.commit()?;
        Ok(id)
    }

    pub fn update_asset(
        &mut self,
        id: Uuid,
        name: Option<&str>,
        value: Option<f64>,
        note: Option<&str>,
    ) -> Result<()> {
        let now = self.clock.now();
        let Some(asset) = self.assets.iter_mut().find(|asset| asset.id == id) else {
            bail!("No asset found with id {id}");
        };
        if let Some(name) = name {
            asset.name = name.to_string();
        }
        if let Some(value) = value {
            asset.set_value(value)?;
        }
        if let Some(note) = note {
            asset.note = note.to_string();
        }
        asset.touch(now);
        self.commit()
    }

    pub fn remove_asset(&mut self, id: Uuid) -> Result<()> {
        let before = self.assets.len();
        self.assets.retain(|asset| asset.id != id);
        if self.assets.len() == before {
            bail!("No asset found with id {id}");
        }
        self.commit()
    }

    /// Parses CSV rows into the ledger and returns how many were added.
    /// Unparseable rows were already skipped by the codec; an input with no
    /// usable rows leaves the ledger untouched.
    pub fn import_csv(&mut self, content: &str) -> Result<usize> {
        let imported = csv::import(content, self.clock.now());
        let count = imported.len();
        if count == 0 {
            return Ok(0);
        }
        self.assets.extend(imported);
        self.commit()?;
        Ok(count)
    }

    pub fn export_csv(&self) -> String {
        csv::export(&self.assets)
    }

    pub fn backup(&self) -> Backup {
        Backup {
            assets: self.assets.clone(),
            history: self.history.snapshots().to_vec(),
        }
    }

    /// Replaces the ledger and history wholesale. No snapshot is appended;
    /// the restored history is taken as-is.
    pub fn restore(&mut self, backup: Backup) -> Result<()> {
        self.assets = backup.assets;
        self.history = History::new(backup.history);
        self.store.save_assets(&self.assets)?;
        self.store.save_snapshots(self.history.snapshots())?;
        self.quotes.set_watchlist(self.watch_symbols());
        self.spawn_quote_refresh();
        let _ = self.events.send(ChangeEvent::AssetsChanged);
        Ok(())
    }

    pub fn reset_all(&mut self) -> Result<()> {
        self.assets.clear();
        self.history.clear();
        self.store.clear_all()?;
        self.quotes.clear();
        self.quotes.set_watchlist(self.watch_symbols());
        let _ = self.events.send(ChangeEvent::AssetsChanged);
        Ok(())
    }

    /// Persists the mutated ledger, appends a snapshot valued from the
    /// current cache contents, and kicks off a refresh. Quotes fetched by
    /// that refresh show up in later reads, not in this snapshot.
    fn commit(&mut self) -> Result<()> {
        self.store.save_assets(&self.assets)?;
        let now = self.clock.now();
        let total = self.net_worth();
        self.history.record(now, total);
        self.store.save_snapshots(self.history.snapshots())?;
        self.quotes.set_watchlist(self.watch_symbols());
        self.spawn_quote_refresh();
        let _ = self.events.send(ChangeEvent::AssetsChanged);
        Ok(())
    }

    fn watch_symbols(&self) -> BTreeSet<String> {
        self.assets
            .iter()
            .filter_map(|asset| asset.stock_position())
            .map(|position| position.lookup_symbol())
            .collect()
    }

    // ---- Quote refresh ----

    /// Fetches every watched symbol plus the USD/TWD rate concurrently.
    /// Per-symbol failures are logged and skipped; the cache keeps whatever
    /// it had for them.
    pub async fn refresh_quotes(&self) {
        Self::run_refresh(
            self.watch_symbols().into_iter().collect(),
            self.quote_provider.clone(),
            self.fx_provider.clone(),
            self.quotes.clone(),
            self.events.clone(),
        )
        .await;
    }

    pub fn spawn_quote_refresh(&self) -> JoinHandle<()> {
        tokio::spawn(Self::run_refresh(
            self.watch_symbols().into_iter().collect(),
            self.quote_provider.clone(),
            self.fx_provider.clone(),
            self.quotes.clone(),
            self.events.clone(),
        ))
    }

    /// Re-fetches the USD/TWD rate every five minutes for long-lived
    /// sessions. The first tick fires immediately.
    pub fn spawn_fx_ticker(&self) -> JoinHandle<()> {
        let fx_provider = self.fx_provider.clone();
        let quotes = self.quotes.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(FX_REFRESH_INTERVAL);
            loop {
                ticker.tick().await;
                match fx_provider
                    .fetch_rate(Currency::Usd.code(), Currency::Twd.code())
                    .await
                {
                    Ok(rate) => {
                        quotes.record_fx_rate(rate);
                        let _ = events.send(ChangeEvent::QuotesRefreshed);
                    }
                    Err(err) => {
                        warn!("Failed to refresh USD/TWD rate, keeping previous: {err:#}");
                    }
                }
            }
        })
    }

    async fn run_refresh(
        symbols: Vec<String>,
        quote_provider: Arc<dyn QuoteProvider>,
        fx_provider: Arc<dyn FxRateProvider>,
        quotes: Arc<QuoteCache>,
        events: broadcast::Sender<ChangeEvent>,
    ) {
        let fetches = symbols.into_iter().map(|symbol| {
            let provider = quote_provider.clone();
            let quotes = quotes.clone();
            async move {
                match provider.fetch_price(&symbol).await {
                    Ok(price) => quotes.record_price(&symbol, price),
                    Err(err) => warn!("Failed to fetch quote for {symbol}: {err:#}"),
                }
            }
        });
        let fx = async {
            match fx_provider
                .fetch_rate(Currency::Usd.code(), Currency::Twd.code())
                .await
            {
                Ok(rate) => quotes.record_fx_rate(rate),
                Err(err) => warn!("Failed to fetch USD/TWD rate, keeping previous: {err:#}"),
            }
        };
        tokio::join!(join_all(fetches), fx);
        let _ = events.send(ChangeEvent::QuotesRefreshed);
    }

    // ---- Read queries ----

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn assets_in(&self, category: Category) -> Vec<&Asset> {
        self.assets
            .iter()
            .filter(|asset| asset.category == category)
            .collect()
    }

    /// Matches assets whose id starts with the given hex prefix, so commands
    /// can take a shortened id.
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<&Asset> {
        let needle = prefix.to_lowercase();
        self.assets
            .iter()
            .filter(|asset| asset.id.to_string().starts_with(&needle))
            .collect()
    }

    pub fn valuation(&self) -> PortfolioValuation {
        valuation::value_portfolio(&self.assets, &self.quotes)
    }

    pub fn net_worth(&self) -> f64 {
        valuation::net_worth(&self.assets, &self.quotes)
    }

    pub fn totals_by_category(&self) -> BTreeMap<Category, f64> {
        self.valuation().by_category
    }

    pub fn category_total(&self, category: Category) -> f64 {
        valuation::category_total(&self.assets, &self.quotes, category)
    }

    pub fn monthly_growth_rate(&self) -> f64 {
        self.history
            .monthly_growth_rate(self.clock.now(), self.net_worth())
    }

    pub fn history_window(&self, months: u32) -> Vec<Snapshot> {
        self.history.window(self.clock.now(), months)
    }

    pub fn growth_series(&self, months: u32) -> Vec<GrowthPoint> {
        self.history.growth_series(self.clock.now(), months)
    }
}
