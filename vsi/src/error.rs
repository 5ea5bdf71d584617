use std::fmt::Display;

use crossterm::style::Stylize;

use crate::ux;

/// Paths of solutions that failed to scan
#[derive(Default)]
pub struct Collector {
    paths: Vec<String>,
}

impl Collector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_path(&mut self, path: &str) {
        self.paths.push(path.to_owned());
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.paths.len()
    }
}

impl Display for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(table) =
            ux::one_column_table("Path", self.paths.iter().map(String::as_str))
        else {
            return Ok(());
        };
        writeln!(
            f,
            "{}",
            " These solutions cannot be scanned:".dark_red().bold()
        )?;
        writeln!(f, "{table}")?;
        writeln!(f)
    }
}
