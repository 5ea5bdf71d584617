#![warn(unused_extern_crates)]
pub mod error;
pub mod import;
pub mod info;
pub mod json;
pub mod ux;

use crossterm::style::Stylize;

/// Prints failed solution path with its diagnostic
pub fn print_error(path: &str, report: &miette::Report) {
    eprintln!("Error scanning {} solution", path.red());
    eprintln!("{report:?}");
}
