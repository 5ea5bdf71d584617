use std::collections::BTreeMap;
use std::fmt::{self, Display};

use comfy_table::{Cell, Table};
use crossterm::style::Stylize;
use itertools::Itertools;
use vsimport::{Consume, ImportSession, OutputType};

use crate::error::Collector;
use crate::ux;

/// Prints what would be imported from every scanned solution
#[derive(Default)]
pub struct Info {
    projects_by_type: BTreeMap<String, usize>,
    solutions: usize,
    projects: usize,
    failed: usize,
    unsupported: usize,
    errors: Collector,
}

impl Info {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Consume for Info {
    fn ok(&mut self, session: &ImportSession) {
        self.solutions += 1;
        self.projects += session.items().len();
        self.failed += session.failures().len();
        self.unsupported += session.unsupported().len();
        for item in session.items() {
            *self
                .projects_by_type
                .entry(item.project.type_description().to_owned())
                .or_default() += 1;
        }

        ux::print_solution_path(&session.solution_path().to_string_lossy());
        println!();
        if !session.items().is_empty() {
            println!("{}", projects_table(session));
            println!();
        }
        if let Some(table) = failures_table(session) {
            println!("{}", " Failed projects:".dark_red().bold());
            println!("{table}");
            println!();
        }
        ux::print_one_column_table(
            "Unsupported project",
            session.unsupported().iter().map(|p| p.name.as_str()),
        );
    }

    fn err(&mut self, path: &str) {
        self.errors.add_path(path);
    }
}

fn projects_table(session: &ImportSession) -> Table {
    let mut table = ux::new_table();
    table.set_header(ux::header([
        "Project",
        "Type",
        "Target",
        "Output",
        "Framework",
        "Configurations",
        "References",
        "Sources",
    ]));

    for item in session.items() {
        let configurations = item.model.configurations.values();
        let framework = configurations
            .clone()
            .filter_map(|c| c.target_framework_version.as_deref())
            .unique()
            .join(", ");
        let output = configurations
            .clone()
            .map(|c| output_name(c.output_type))
            .unique()
            .join(", ");
        table.add_row(vec![
            Cell::new(&item.project.name),
            Cell::new(item.project.type_description()),
            Cell::new(item.target),
            Cell::new(output),
            Cell::new(framework),
            Cell::new(item.model.configurations.keys().join(", ")),
            ux::number(item.model.references.len()),
            ux::number(item.model.compile_items.len()),
        ]);
    }
    table
}

fn failures_table(session: &ImportSession) -> Option<Table> {
    if session.failures().is_empty() {
        return None;
    }
    let mut table = ux::new_table();
    table.set_header(ux::header(["Project", "Error"]));
    for failure in session.failures() {
        table.add_row(vec![failure.project.name.clone(), failure.error.to_string()]);
    }
    Some(table)
}

fn output_name(output: OutputType) -> &'static str {
    match output {
        OutputType::Executable => "Executable",
        OutputType::Library => "Library",
        OutputType::Unset => "Executable (default)",
    }
}

impl Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", " Totals:".dark_red().bold())?;
        writeln!(f)?;

        let mut table = ux::new_table();
        table.set_header(ux::header(["Project type", "Count", "%"]));
        for (key, value) in &self.projects_by_type {
            table.add_row(vec![
                Cell::new(key),
                ux::number(*value),
                Cell::new(format!("{:.2}%", percent(*value, self.projects))),
            ]);
        }
        if table.row_count() > 0 {
            writeln!(f, "{table}")?;
            writeln!(f)?;
        }

        let mut table = ux::new_table();
        table.add_row(vec![Cell::new("Total solutions"), ux::number(self.solutions)]);
        table.add_row(vec![Cell::new("Importable projects"), ux::number(self.projects)]);
        table.add_row(vec![Cell::new("Failed projects"), ux::number(self.failed)]);
        table.add_row(vec![
            Cell::new("Unsupported projects"),
            ux::number(self.unsupported),
        ]);
        writeln!(f, "{table}")?;
        writeln!(f)?;

        write!(f, "{}", self.errors)
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(value: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        value as f64 / total as f64 * 100_f64
    }
}
