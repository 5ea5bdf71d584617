use comfy_table::{Attribute, Cell, CellAlignment, Table, presets};
use crossterm::style::{Color, Stylize, style};

/// Borderless table the way all reports are printed
#[must_use]
pub fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table
}

#[must_use]
pub fn header<'a>(titles: impl IntoIterator<Item = &'a str>) -> Vec<Cell> {
    titles
        .into_iter()
        .map(|t| Cell::new(t).add_attribute(Attribute::Bold))
        .collect()
}

#[must_use]
pub fn number(value: usize) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

/// Table of a single column. Returns `None` if there are no items
#[must_use]
pub fn one_column_table<'a>(head: &str, items: impl IntoIterator<Item = &'a str>) -> Option<Table> {
    let mut table = new_table();
    table.set_header(header([head]));
    for item in items {
        table.add_row(vec![item]);
    }
    if table.row_count() == 0 {
        None
    } else {
        Some(table)
    }
}

pub fn print_one_column_table<'a>(head: &str, items: impl IntoIterator<Item = &'a str>) {
    if let Some(table) = one_column_table(head, items) {
        println!("{table}");
        println!();
    }
}

pub fn print_solution_path(path: &str) {
    let path = style(path)
        .with(Color::Rgb {
            r: 0xAA,
            g: 0xAA,
            b: 0xAA,
        })
        .bold();
    println!(" {path}");
}
