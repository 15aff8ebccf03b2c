use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use mfx_model::FormId;

use crate::types::{ExportListing, ExportOutcome};

pub fn print_listings(listings: &[ExportListing]) {
    if listings.is_empty() {
        println!("No exports registered.");
        return;
    }
    println!("{}", listing_table(listings));
}

fn listing_table(listings: &[ExportListing]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Export"),
        header_cell("Columns"),
        header_cell("Forms"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for listing in listings {
        table.add_row(vec![
            Cell::new(&listing.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(listing.columns),
            form_list_cell(&listing.forms),
        ]);
    }
    table
}

pub fn print_summary(outcome: &ExportOutcome) {
    println!("Export: {}", outcome.export_name);
    match &outcome.path {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Output: <stdout> ({})", outcome.filename),
    }
    println!("Content type: {}", outcome.content_type);
    println!("{}", summary_table(outcome));
}

fn summary_table(outcome: &ExportOutcome) -> Table {
    let stats = &outcome.stats;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entries"),
        header_cell("Rows"),
        header_cell("Pages"),
        header_cell("Bytes"),
        header_cell("Unavailable forms"),
        header_cell("Re-encoded"),
    ]);
    apply_table_style(&mut table);
    for index in 0..4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 5, CellAlignment::Center);
    let unavailable = if stats.unavailable_forms.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(join_form_ids(&stats.unavailable_forms)).fg(Color::Yellow)
    };
    let reencoded = if stats.reencoded {
        Cell::new("yes").fg(Color::Yellow)
    } else {
        dim_cell("no")
    };
    table.add_row(vec![
        Cell::new(stats.total),
        Cell::new(stats.rows).add_attribute(Attribute::Bold),
        Cell::new(stats.pages),
        Cell::new(outcome.bytes),
        unavailable,
        reencoded,
    ]);
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn form_list_cell(forms: &[FormId]) -> Cell {
    if forms.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(join_form_ids(forms))
    }
}

fn join_form_ids(forms: &[FormId]) -> String {
    forms
        .iter()
        .map(FormId::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
