use super::ui;
use crate::core::valuation::PortfolioValuation;
use crate::tracker::Tracker;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};
use console::style;

impl PortfolioValuation {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("Category"),
            ui::header_cell("Name"),
            ui::header_cell("Shares"),
            ui::header_cell("Price"),
            ui::header_cell("Value (TWD)"),
        ]);

        for asset in &self.assets {
            let shares = ui::format_optional_cell(asset.shares, |s| s.to_string());
            let price = ui::format_optional_cell(asset.price, |p| format!("{p:.2}"));

            table.add_row(vec![
                Cell::new(asset.category.label()),
                Cell::new(&asset.name),
                shares,
                price,
                Cell::new(ui::format_twd(asset.value)).set_alignment(CellAlignment::Right),
            ]);
        }

        let mut output = format!("{}\n\n", ui::style_text("Holdings", ui::StyleType::Title));
        output.push_str(&table.to_string());

        for asset in &self.assets {
            if let Some(warning) = &asset.warning {
                output.push('\n');
                output.push_str(&ui::style_text(
                    &format!("Warning: {}: {warning}", asset.name),
                    ui::StyleType::Error,
                ));
            }
        }

        output
    }
}

fn breakdown_table(valuation: &PortfolioValuation) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Total (TWD)"),
    ]);
    for (category, total) in &valuation.by_category {
        table.add_row(vec![
            Cell::new(category.label()),
            Cell::new(ui::format_twd(*total)).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}

pub async fn run(tracker: &Tracker) -> Result<()> {
    if tracker.assets().is_empty() {
        println!(
            "{}",
            ui::style_text(
                "No assets yet. Add one with 'networth add'.",
                ui::StyleType::Subtle
            )
        );
        return Ok(());
    }

    let spinner = ui::new_spinner("Fetching quotes...");
    tracker.refresh_quotes().await;
    spinner.finish_and_clear();

    let valuation = tracker.valuation();
    println!("{}", valuation.display_as_table());

    ui::print_separator();

    println!(
        "{}\n",
        ui::style_text("By category", ui::StyleType::Title)
    );
    println!("{}", breakdown_table(&valuation));

    println!(
        "\n{} {}",
        ui::style_text("Net worth:", ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_twd(valuation.net_worth), ui::StyleType::TotalValue)
    );

    let growth = tracker.monthly_growth_rate();
    let growth_text = format!("{growth:.2}%");
    let styled_growth = if growth >= 0.0 {
        style(growth_text).green()
    } else {
        style(growth_text).red()
    };
    println!("Monthly growth: {styled_growth}");

    if let Some(rate) = tracker.quotes().fx_rate() {
        println!(
            "{}",
            ui::style_text(&format!("USD/TWD rate: {rate:.2}"), ui::StyleType::Subtle)
        );
    }

    Ok(())
}
