use std::fmt::{self, Display};

use comfy_table::{Cell, Table};
use crossterm::style::Stylize;
use itertools::Itertools;
use vsimport::{Consume, ImportSession, MemoryModel, ModuleTarget, host::Module};

use crate::error::Collector;
use crate::ux;

/// Commits every scanned solution into in-memory module model
/// and prints resulting modules
#[derive(Default)]
pub struct Import {
    modules: usize,
    layers: usize,
    failed: usize,
    errors: Collector,
}

impl Import {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any project or solution failed to import
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.errors.count() > 0
    }
}

impl Consume for Import {
    fn ok(&mut self, session: &ImportSession) {
        let mut model = MemoryModel::new();
        let report = session.commit(&mut model);
        self.failed += report.failed;

        ux::print_solution_path(&session.solution_path().to_string_lossy());
        println!();
        for module in model.modules() {
            self.modules += 1;
            self.layers += module.layers.len();
            println!(
                " {} {}",
                module.name.as_str().bold(),
                module.content_root.display()
            );
            if !module.layers.is_empty() {
                println!("{}", layers_table(module));
            }
            println!();
        }
        for failure in session.failures() {
            println!(
                " {} {}: {}",
                "Failed".dark_red().bold(),
                failure.project.name,
                failure.error
            );
        }
        if !session.failures().is_empty() {
            println!();
        }
    }

    fn err(&mut self, path: &str) {
        self.errors.add_path(path);
    }
}

fn layers_table(module: &Module) -> Table {
    let mut table = ux::new_table();
    table.set_header(ux::header([
        "Layer",
        "Target",
        "Debug",
        "Unsafe",
        "Symbols",
        "Extensions",
        "References",
        "Entries",
    ]));

    for (name, layer) in &module.layers {
        let name = if module.current_layer.as_deref() == Some(name.as_str()) {
            format!("{name} *")
        } else {
            name.clone()
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(target_name(layer.target)),
            Cell::new(layer.debug_info),
            Cell::new(layer.unsafe_code),
            Cell::new(layer.preprocessor_symbols.join(";")),
            Cell::new(layer.extensions.iter().join(", ")),
            ux::number(layer.references.len()),
            ux::number(layer.content_entries.len()),
        ]);
    }
    table
}

fn target_name(target: ModuleTarget) -> &'static str {
    match target {
        ModuleTarget::Executable => "Executable",
        ModuleTarget::Library => "Library",
    }
}

impl Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", " Totals:".dark_red().bold())?;
        writeln!(f)?;

        let mut table = ux::new_table();
        table.add_row(vec![Cell::new("Modules"), ux::number(self.modules)]);
        table.add_row(vec![Cell::new("Layers"), ux::number(self.layers)]);
        table.add_row(vec![Cell::new("Failed projects"), ux::number(self.failed)]);
        writeln!(f, "{table}")?;
        writeln!(f)?;

        write!(f, "{}", self.errors)
    }
}
