//! Quote provider seams and the last-known quote cache

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use tracing::debug;

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Current price for a fully qualified symbol, in the market's currency.
    async fn fetch_price(&self, symbol: &str) -> Result<f64>;
}

#[async_trait]
pub trait FxRateProvider: Send + Sync {
    async fn fetch_rate(&self, from: &str, to: &str) -> Result<f64>;
}

/// Last-known quotes, readable without blocking.
///
/// Valuation reads only ever see whatever the most recent completed fetch
/// wrote here; a failed fetch leaves earlier values untouched. The watchlist
/// tells the cache which symbols are still part of the ledger so results from
/// superseded fetches are dropped instead of recorded.
#[derive(Default)]
pub struct QuoteCache {
    prices: RwLock<HashMap<String, f64>>,
    fx_rate: RwLock<Option<f64>>,
    // None until the first watchlist is installed, which means "accept all"
    watchlist: RwLock<Option<HashSet<String>>>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn price(&self, symbol: &str) -> Option<f64> {
        let price = self.prices.read().unwrap().get(symbol).copied();
        if price.is_some() {
            debug!("Quote cache HIT for {}", symbol);
        } else {
            debug!("Quote cache MISS for {}", symbol);
        }
        price
    }

    /// USD to TWD rate from the most recent successful refresh, if any.
    pub fn fx_rate(&self) -> Option<f64> {
        *self.fx_rate.read().unwrap()
    }

    pub fn record_price(&self, symbol: &str, price: f64) {
        if let Some(watching) = self.watchlist.read().unwrap().as_ref() {
            if !watching.contains(symbol) {
                debug!("Discarding quote for untracked symbol {}", symbol);
                return;
            }
        }
        debug!(price, "Quote cache PUT for {}", symbol);
        self.prices.write().unwrap().insert(symbol.to_string(), price);
    }

    pub fn record_fx_rate(&self, rate: f64) {
        debug!(rate, "FX rate cache PUT");
        *self.fx_rate.write().unwrap() = Some(rate);
    }

    /// Installs the set of symbols the ledger currently cares about and drops
    /// cached prices that fell off it. The FX rate is kept; it is not tied to
    /// any one holding.
    pub fn set_watchlist<I>(&self, symbols: I)
    where
        I: IntoIterator<Item = String>,
    {
        let watching: HashSet<String> = symbols.into_iter().collect();
        self.prices
            .write()
            .unwrap()
            .retain(|symbol, _| watching.contains(symbol));
        *self.watchlist.write().unwrap() = Some(watching);
    }

    pub fn clear(&self) {
        self.prices.write().unwrap().clear();
        *self.fx_rate.write().unwrap() = None;
        *self.watchlist.write().unwrap() = None;
        debug!("Quote cache CLEAR");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_last_writer_wins() {
        let cache = QuoteCache::new();
        assert!(cache.price("2330.TW").is_none());

        cache.record_price("2330.TW", 595.0);
        cache.record_price("2330.TW", 600.0);
        assert_eq!(cache.price("2330.TW"), Some(600.0));
    }

    #[test]
    fn test_fx_rate_survives_until_next_write() {
        let cache = QuoteCache::new();
        assert!(cache.fx_rate().is_none());

        cache.record_fx_rate(31.2);
        assert_eq!(cache.fx_rate(), Some(31.2));

        // A refresh that never completes writes nothing; the old rate stays.
        cache.record_fx_rate(31.4);
        assert_eq!(cache.fx_rate(), Some(31.4));
    }

    #[test]
    fn test_watchlist_drops_untracked_symbols() {
        let cache = QuoteCache::new();

        // No watchlist installed yet: everything is accepted.
        cache.record_price("AMD", 120.0);
        assert_eq!(cache.price("AMD"), Some(120.0));

        cache.set_watchlist(vec!["2330.TW".to_string()]);
        // AMD fell off the ledger; its cached price goes with it.
        assert!(cache.price("AMD").is_none());

        // A late result for AMD is discarded, not recorded.
        cache.record_price("AMD", 125.0);
        assert!(cache.price("AMD").is_none());

        cache.record_price("2330.TW", 600.0);
        assert_eq!(cache.price("2330.TW"), Some(600.0));
    }

    #[test]
    fn test_empty_watchlist_rejects_everything() {
        let cache = QuoteCache::new();
        cache.set_watchlist(Vec::new());
        cache.record_price("2330.TW", 600.0);
        assert!(cache.price("2330.TW").is_none());
    }

    #[test]
    fn test_clear_resets_all_state() {
        let cache = QuoteCache::new();
        cache.record_price("2330.TW", 600.0);
        cache.record_fx_rate(31.2);

        cache.clear();
        assert!(cache.price("2330.TW").is_none());
        assert!(cache.fx_rate().is_none());
    }
}
