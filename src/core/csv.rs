//! Five-column CSV interchange for the ledger
//!
//! The format is the one the legacy exports used: a fixed Chinese header,
//! plain comma splitting with no quoting, and dates as `yyyy/mm/dd`. Stock
//! rows carry the ticker as the name and the share count as the quantity;
//! every other row carries the nominal amount. Import never aborts a batch,
//! rows it cannot make sense of are skipped with a debug log.

use crate::core::asset::{Asset, Category, Currency, Market};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

pub const HEADER: &str = "類別,名稱,數量,建立於,備註";

const DATE_FORMAT: &str = "%Y/%m/%d";
const LABEL_TW_STOCK: &str = "台灣股票";
const LABEL_US_STOCK: &str = "美國股票";

pub fn export(assets: &[Asset]) -> String {
    let mut out = String::from(HEADER);
    for asset in assets {
        out.push('\n');
        out.push_str(&export_row(asset));
    }
    out.push('\n');
    out
}

fn export_row(asset: &Asset) -> String {
    let date = asset.created_at.format(DATE_FORMAT);
    match (asset.category, asset.stock_position()) {
        (Category::Stock, Some(position)) => {
            let label = match position.market {
                Market::Tw => LABEL_TW_STOCK,
                Market::Us => LABEL_US_STOCK,
            };
            format!(
                "{},{},{},{},{}",
                label, position.symbol, position.shares, date, asset.note
            )
        }
        (Category::Cash, _) => {
            // The legacy format has no currency column, the code rides along
            // in the note where import looks for it.
            let note = if asset.currency == Currency::Twd {
                asset.note.clone()
            } else if asset.note.is_empty() {
                asset.currency.code().to_string()
            } else {
                format!("{} {}", asset.note, asset.currency.code())
            };
            format!("現金,{},{:.0},{},{}", asset.name, asset.value, date, note)
        }
        _ => format!(
            "{},{},{:.0},{},{}",
            asset.category.label(),
            asset.name,
            asset.value,
            date,
            asset.note
        ),
    }
}

/// Parses exported rows back into asset records. `now` stamps the update
/// time and stands in for unparseable creation dates.
pub fn import(content: &str, now: DateTime<Utc>) -> Vec<Asset> {
    let mut assets = Vec::new();
    for (index, row) in content.lines().skip(1).enumerate() {
        if row.trim().is_empty() {
            continue;
        }
        match parse_row(row, now) {
            Some(asset) => assets.push(asset),
            None => debug!("Skipping unparseable CSV row {}: {}", index + 2, row),
        }
    }
    assets
}

fn parse_row(row: &str, now: DateTime<Utc>) -> Option<Asset> {
    let columns: Vec<&str> = row.split(',').collect();
    if columns.len() < 5 {
        return None;
    }

    let label = columns[0].trim();
    let name = columns[1].trim();
    let quantity = columns[2].trim();
    let date_str = columns[3].trim();
    let note = columns[4].trim();

    let mut asset = match label {
        "現金" => {
            let amount: f64 = quantity.parse().ok()?;
            let currency = currency_from_note(note);
            Asset::new(Category::Cash, name, amount, currency, note, now)
        }
        LABEL_TW_STOCK | LABEL_US_STOCK => {
            let shares: f64 = quantity.parse().ok()?;
            if shares < 0.0 {
                return None;
            }
            let market = if label == LABEL_US_STOCK {
                Market::Us
            } else {
                Market::Tw
            };
            // The format has no price column; the share count stands in as
            // the nominal value until the first live quote supersedes it.
            Asset::new_stock(name, shares.round() as u64, market, shares, note, now)
        }
        "股票" => {
            // A stock exported without share info, just its nominal amount
            let amount: f64 = quantity.parse().ok()?;
            Asset::new(Category::Stock, name, amount, Currency::Twd, note, now)
        }
        "基金" | "保險" | "房產" | "房貸" | "其他" => {
            let amount: f64 = quantity.parse().ok()?;
            let category = label.parse().ok()?;
            Asset::new(category, name, amount, Currency::Twd, note, now)
        }
        _ => return None,
    }
    .ok()?;

    asset.created_at = parse_date(date_str).unwrap_or(now);
    Some(asset)
}

/// Recovers the cash currency from a code substring in the note, the only
/// place the legacy format records it.
fn currency_from_note(note: &str) -> Currency {
    [Currency::Usd, Currency::Jpy, Currency::Cny, Currency::Eur]
        .into_iter()
        .find(|c| note.contains(c.code()))
        .unwrap_or(Currency::Twd)
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
