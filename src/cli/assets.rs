use super::ui;
use crate::core::asset::{Asset, Category, Currency, Market};
use crate::tracker::Tracker;
use anyhow::{Result, bail};
use comfy_table::{Cell, CellAlignment, Color};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Value,
    Date,
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "value" => Ok(SortKey::Value),
            "date" => Ok(SortKey::Date),
            _ => bail!("Unknown sort key: {s} (expected 'value' or 'date')"),
        }
    }
}

pub fn list(tracker: &Tracker, category: Option<Category>, sort: Option<SortKey>) -> Result<()> {
    let mut assets: Vec<&Asset> = match category {
        Some(category) => tracker.assets_in(category),
        None => tracker.assets().iter().collect(),
    };

    if assets.is_empty() {
        println!(
            "{}",
            ui::style_text(
                "No assets yet. Add one with 'networth add'.",
                ui::StyleType::Subtle
            )
        );
        return Ok(());
    }

    match sort {
        Some(SortKey::Value) => assets.sort_by(|a, b| b.value.total_cmp(&a.value)),
        Some(SortKey::Date) => assets.sort_by_key(|asset| std::cmp::Reverse(asset.created_at)),
        None => {}
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Category"),
        ui::header_cell("Name"),
        ui::header_cell("Value"),
        ui::header_cell("Currency"),
        ui::header_cell("Created"),
        ui::header_cell("Note"),
    ]);
    for asset in &assets {
        table.add_row(vec![
            Cell::new(short_id(asset.id)).fg(Color::DarkGrey),
            Cell::new(asset.category.label()),
            Cell::new(&asset.name),
            Cell::new(format!("{:.0}", asset.value)).set_alignment(CellAlignment::Right),
            Cell::new(asset.currency.code()),
            Cell::new(asset.created_at.format("%Y/%m/%d").to_string()),
            Cell::new(&asset.note),
        ]);
    }
    println!("{table}");

    Ok(())
}

pub fn add(
    tracker: &mut Tracker,
    category: Category,
    name: &str,
    value: f64,
    currency: Currency,
    note: &str,
) -> Result<()> {
    let id = tracker.add_asset(category, name, value, currency, note)?;
    println!("Added {} {} ({})", category.label(), name, short_id(id));
    Ok(())
}

pub fn add_stock(
    tracker: &mut Tracker,
    symbol: &str,
    shares: u64,
    market: Market,
    note: &str,
) -> Result<()> {
    let id = tracker.add_stock(symbol, shares, market, note)?;
    println!(
        "Added {} {symbol} x {shares} ({})",
        market.label(),
        short_id(id)
    );
    Ok(())
}

pub fn edit(
    tracker: &mut Tracker,
    id_prefix: &str,
    name: Option<&str>,
    value: Option<f64>,
    note: Option<&str>,
) -> Result<()> {
    if name.is_none() && value.is_none() && note.is_none() {
        bail!("Nothing to change; pass --name, --value or --note");
    }
    let id = resolve_prefix(tracker, id_prefix)?;
    tracker.update_asset(id, name, value, note)?;
    println!("Updated {}", short_id(id));
    Ok(())
}

pub fn remove(tracker: &mut Tracker, id_prefix: &str) -> Result<()> {
    let id = resolve_prefix(tracker, id_prefix)?;
    let name = tracker
        .assets()
        .iter()
        .find(|asset| asset.id == id)
        .map(|asset| asset.name.clone())
        .unwrap_or_default();
    tracker.remove_asset(id)?;
    println!("Removed {name} ({})", short_id(id));
    Ok(())
}

pub fn reset(tracker: &mut Tracker, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to wipe all assets and history without --yes");
    }
    tracker.reset_all()?;
    println!("All assets and history cleared.");
    Ok(())
}

/// Resolves a shortened id against the ledger; anything other than exactly
/// one match is an error.
fn resolve_prefix(tracker: &Tracker, prefix: &str) -> Result<Uuid> {
    let matches = tracker.find_by_prefix(prefix);
    match matches.len() {
        0 => bail!("No asset found matching '{prefix}'"),
        1 => Ok(matches[0].id),
        n => bail!("Id prefix '{prefix}' is ambiguous ({n} matches)"),
    }
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}
