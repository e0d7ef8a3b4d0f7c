//! TWD-normalized appraisal of the ledger against cached quotes
//!
//! Everything here is pure over the cache's current contents; no function in
//! this module performs network I/O, so callers can value the ledger at any
//! time and simply see whatever the background refresh has written so far.

use crate::core::asset::{Asset, Category, Currency};
use crate::core::quote::QuoteCache;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Appraisal of a single record, normalized to TWD.
#[derive(Debug, Clone)]
pub struct AssetValue {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    pub shares: Option<u64>,
    /// Live quote in the market's own currency, when one was cached.
    pub price: Option<f64>,
    pub value: f64,
    pub warning: Option<String>,
}

/// Whole-ledger appraisal. `by_category` already nets the mortgage magnitude
/// into the property bucket, so mortgages never show up as a bucket of their
/// own and `net_worth` is exactly the sum of the map.
#[derive(Debug)]
pub struct PortfolioValuation {
    pub assets: Vec<AssetValue>,
    pub by_category: BTreeMap<Category, f64>,
    pub net_worth: f64,
}

/// TWD value of one record against the current cache state.
///
/// Stocks with a share position use shares times the cached quote; without a
/// cached quote (or without a position at all) the nominal value stands in,
/// taken as already-TWD. Every other category converts its nominal value by
/// the record's currency factor.
pub fn appraise(asset: &Asset, quotes: &QuoteCache) -> AssetValue {
    let mut shares = None;
    let mut price = None;
    let mut warning = None;

    let value = if asset.category == Category::Stock {
        match asset.stock_position() {
            Some(position) => {
                shares = Some(position.shares);
                match quotes.price(&position.lookup_symbol()) {
                    Some(quote) => {
                        price = Some(quote);
                        let market_value = position.shares as f64 * quote;
                        to_twd(market_value, asset.currency, quotes, &asset.name, &mut warning)
                    }
                    None => {
                        debug!(
                            "No cached quote for {}, valuing {} at its nominal amount",
                            position.lookup_symbol(),
                            asset.name
                        );
                        asset.value
                    }
                }
            }
            // No share info recorded, the nominal amount is all there is
            None => asset.value,
        }
    } else {
        to_twd(asset.value, asset.currency, quotes, &asset.name, &mut warning)
    };

    AssetValue {
        id: asset.id,
        name: asset.name.clone(),
        category: asset.category,
        shares,
        price,
        value,
        warning,
    }
}

/// Converts an amount into TWD. USD prefers the live FX rate over the static
/// factor; a non-positive effective rate is a data-quality problem, so the
/// amount passes through unconverted with a warning instead of poisoning the
/// totals.
fn to_twd(
    amount: f64,
    currency: Currency,
    quotes: &QuoteCache,
    name: &str,
    warning: &mut Option<String>,
) -> f64 {
    if currency == Currency::Twd {
        return amount;
    }
    let rate = match currency {
        Currency::Usd => quotes.fx_rate().unwrap_or_else(|| currency.static_rate()),
        _ => currency.static_rate(),
    };
    if rate <= 0.0 {
        warn!(
            "Non-positive {} rate {} for {}, leaving amount unconverted",
            currency.code(),
            rate,
            name
        );
        *warning = Some(format!("invalid {} rate: {}", currency.code(), rate));
        return amount;
    }
    amount * rate
}

/// Appraises every record and folds the results into category buckets plus a
/// single net worth figure.
pub fn value_portfolio(assets: &[Asset], quotes: &QuoteCache) -> PortfolioValuation {
    let mut values = Vec::with_capacity(assets.len());
    let mut by_category: BTreeMap<Category, f64> = BTreeMap::new();
    let mut mortgage_total = 0.0;

    for asset in assets {
        let appraisal = appraise(asset, quotes);
        if appraisal.category.is_liability() {
            mortgage_total += appraisal.value;
        } else {
            *by_category.entry(appraisal.category).or_insert(0.0) += appraisal.value;
        }
        values.push(appraisal);
    }

    if mortgage_total > 0.0 {
        *by_category.entry(Category::Property).or_insert(0.0) -= mortgage_total;
    }

    let net_worth = by_category.values().sum();
    PortfolioValuation {
        assets: values,
        by_category,
        net_worth,
    }
}

pub fn net_worth(assets: &[Asset], quotes: &QuoteCache) -> f64 {
    value_portfolio(assets, quotes).net_worth
}

/// Total for a single category, live-quote-aware for stocks. Mortgages
/// report their positive magnitude here; the sign flip belongs to the
/// netted breakdown alone.
pub fn category_total(assets: &[Asset], quotes: &QuoteCache, category: Category) -> f64 {
    assets
        .iter()
        .filter(|a| a.category == category)
        .map(|a| appraise(a, quotes).value)
        .sum()
}
