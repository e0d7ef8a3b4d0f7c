use super::ui;
use crate::tracker::Tracker;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

pub fn run(tracker: &Tracker, months: u32) -> Result<()> {
    let snapshots = tracker.history_window(months);
    if snapshots.is_empty() {
        println!("No snapshots recorded in the last {months} months.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Recorded"),
        ui::header_cell("Net Worth (TWD)"),
        ui::header_cell("Monthly Growth"),
    ]);
    for snapshot in &snapshots {
        table.add_row(vec![
            Cell::new(snapshot.at.format("%Y/%m/%d %H:%M").to_string()),
            Cell::new(ui::format_twd(snapshot.total)).set_alignment(CellAlignment::Right),
            ui::change_cell(snapshot.growth_rate),
        ]);
    }
    println!("{}\n", ui::style_text("Snapshots", ui::StyleType::Title));
    println!("{table}");

    let series = tracker.growth_series(months);
    if series.is_empty() {
        return Ok(());
    }

    ui::print_separator();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Recorded"),
        ui::header_cell("Net Worth (TWD)"),
        ui::header_cell("vs Previous"),
    ]);
    for point in &series {
        table.add_row(vec![
            Cell::new(point.at.format("%Y/%m/%d %H:%M").to_string()),
            Cell::new(ui::format_twd(point.total)).set_alignment(CellAlignment::Right),
            ui::change_cell(point.rate),
        ]);
    }
    println!(
        "{}\n",
        ui::style_text("Change between snapshots", ui::StyleType::Title)
    );
    println!("{table}");

    Ok(())
}
