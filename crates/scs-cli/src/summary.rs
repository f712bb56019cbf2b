use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use scs_cli::report::CompileReport;
use scs_model::{CompilerBuild, Diagnostic, Severity};
use scs_persistence::{SavedEntry, Snippet};

pub fn print_compile_report(report: &CompileReport) {
    match &report.build {
        Some(build) => println!("Build: {build}"),
        None => println!("Build: -"),
    }
    println!("Optimizer: {}", if report.optimize { "on" } else { "off" });

    if !report.contracts.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Contract"),
            header_cell("Bytecode"),
            header_cell("Metadata hash"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 1, CellAlignment::Right);
        for contract in &report.contracts {
            let name = if contract.selected {
                Cell::new(format!("* {}", contract.name))
                    .fg(Color::Blue)
                    .add_attribute(Attribute::Bold)
            } else {
                Cell::new(&contract.name)
            };
            table.add_row(vec![
                name,
                Cell::new(format!("{} B", contract.bytecode_bytes)),
                match &contract.metadata_hash {
                    Some(hash) => Cell::new(hash),
                    None => dim_cell("-"),
                },
            ]);
        }
        println!("{table}");
    }

    print_diagnostics_table(&report.diagnostics);

    let counts = report.counts;
    let mut totals = Table::new();
    totals.set_header(vec![
        header_cell("Errors"),
        header_cell("Warnings"),
        header_cell("Info"),
        header_cell("Formal"),
    ]);
    apply_table_style(&mut totals);
    totals.add_row(vec![
        count_cell(counts.errors, Color::Red),
        count_cell(counts.warnings, Color::Yellow),
        count_cell(counts.infos, Color::Blue),
        count_cell(counts.formal, Color::Magenta),
    ]);
    for index in 0..4 {
        align_column(&mut totals, index, CellAlignment::Right);
    }
    println!("{totals}");

    if let Some(error) = &report.worker_error {
        eprintln!("Compiler unavailable: {error}");
    }
}

fn print_diagnostics_table(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    let mut ordered: Vec<&Diagnostic> = diagnostics.iter().collect();
    ordered.sort_by(|a, b| {
        severity_rank(b.severity)
            .cmp(&severity_rank(a.severity))
            .then(a.line.cmp(&b.line))
            .then(a.column.cmp(&b.column))
    });

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Location"),
        header_cell("Source"),
        header_cell("Message"),
    ]);
    apply_diagnostic_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 1, CellAlignment::Right);
    for diagnostic in ordered {
        table.add_row(vec![
            severity_cell(diagnostic),
            Cell::new(format!("{}:{}", diagnostic.line, diagnostic.column)),
            match &diagnostic.contract_name {
                Some(name) => Cell::new(name),
                None => dim_cell("-"),
            },
            Cell::new(&diagnostic.message),
        ]);
    }
    println!();
    println!("Diagnostics:");
    println!("{table}");
}

pub fn print_builds_table(builds: &[CompilerBuild]) {
    let latest_release = builds.iter().position(|build| build.is_release);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Version"),
        header_cell("Long version"),
        header_cell("Release"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for (index, build) in builds.iter().enumerate() {
        let version = if Some(index) == latest_release {
            Cell::new(&build.version)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(&build.version)
        };
        table.add_row(vec![
            dim_cell(index),
            version,
            Cell::new(&build.long_version),
            if build.is_release {
                Cell::new("✓").fg(Color::Green)
            } else {
                dim_cell("-")
            },
        ]);
    }
    println!("{table}");
}

pub fn print_saved_table(entries: &[SavedEntry]) {
    if entries.is_empty() {
        println!("No saved contracts.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Id"),
        header_cell("Name"),
        header_cell("Saved"),
        header_cell("Size"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for entry in entries {
        table.add_row(vec![
            dim_cell(&entry.id),
            Cell::new(&entry.contract.name).add_attribute(Attribute::Bold),
            Cell::new(entry.contract.timestamp.format("%Y-%m-%d %H:%M")),
            Cell::new(format!("{} B", entry.contract.sourcecode.len())),
        ]);
    }
    println!("{table}");
}

pub fn print_snippets_table(snippets: &[Snippet]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Id"),
        header_cell("Name"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    for snippet in snippets {
        table.add_row(vec![
            dim_cell(snippet.id),
            Cell::new(snippet.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(snippet.description),
        ]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_diagnostic_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 4 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(9)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::UpperBoundary(Width::Fixed(16)),
            ColumnConstraint::UpperBoundary(Width::Percentage(70)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(diagnostic: &Diagnostic) -> Cell {
    let cell = match diagnostic.severity {
        Severity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
        Severity::Info => Cell::new("INFO").fg(Color::Blue),
    };
    if diagnostic.is_formal_verification {
        cell.add_attribute(Attribute::Italic)
    } else {
        cell
    }
}

fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 3,
        Severity::Warning => 2,
        Severity::Info => 1,
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
