use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ivr_map::AliasEntry;
use ivr_model::{
    ConfidenceLevel, ConfidenceThresholds, FieldMapping, MappingReport, MatchMethod, OcrVerdict,
};

pub fn print_report(report: &MappingReport) {
    if let Some(template_id) = report.template_id() {
        println!("Template: {template_id}");
    }
    if let Some(scope) = report.scope() {
        println!("Scope: {scope}");
    }

    let thresholds = ConfidenceThresholds::default();
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source key"),
        header_cell("Target"),
        header_cell("Method"),
        header_cell("Confidence"),
        header_cell("Review"),
        header_cell("OCR"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    for mapping in report.mappings() {
        table.add_row(vec![
            Cell::new(&mapping.source_key)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            target_cell(mapping),
            method_cell(mapping.method),
            confidence_cell(mapping),
            level_cell(mapping, &thresholds),
            ocr_cell(&mapping.ocr),
        ]);
    }
    let summary = report.summary();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} accepted", summary.accepted)).add_attribute(Attribute::Bold),
        Cell::new(format!(
            "{}/{}/{}",
            summary.exact, summary.alias, summary.fuzzy
        ))
        .add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(summary.unresolved, Color::Yellow),
        count_cell(summary.ocr_diverged, Color::Red),
    ]);
    println!("{table}");

    print_corrections(report);
    print_removals(report);

    let missing = report.missing_required();
    if !missing.is_empty() {
        println!();
        println!(
            "Required fields without a mapping ({}/{} mapped):",
            summary.required_mapped, summary.required_total
        );
        for name in missing {
            println!("- {name}");
        }
    }
    let duplicates = report.duplicate_targets();
    if !duplicates.is_empty() {
        println!();
        println!("Targets claimed by more than one source field:");
        for (target, keys) in duplicates {
            println!("- {target}: {}", keys.join(", "));
        }
    }
}

fn print_corrections(report: &MappingReport) {
    if report.corrections().is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source key"),
        header_cell("Stored target"),
        header_cell("Corrected target"),
        header_cell("Method"),
        header_cell("Confidence"),
        header_cell("Reason"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for correction in report.corrections() {
        let reason = format!("{:?}", correction.reason);
        table.add_row(vec![
            Cell::new(&correction.source_key),
            Cell::new(&correction.original_target_name).fg(Color::DarkGrey),
            Cell::new(&correction.corrected_target_name).fg(Color::Green),
            method_cell(correction.method),
            Cell::new(format!("{:.2}", correction.confidence)),
            Cell::new(reason),
        ]);
    }
    println!();
    println!("Corrections:");
    println!("{table}");
}

fn print_removals(report: &MappingReport) {
    if report.removals().is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source key"),
        header_cell("Stored target"),
        header_cell("Reason"),
        header_cell("Best candidate"),
        header_cell("Confidence"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for removal in report.removals() {
        table.add_row(vec![
            Cell::new(&removal.source_key),
            Cell::new(&removal.invalid_target_name).fg(Color::Red),
            Cell::new(format!("{:?}", removal.reason)),
            match &removal.best_candidate {
                Some(name) => Cell::new(name),
                None => dim_cell("-"),
            },
            match removal.best_confidence {
                Some(confidence) => Cell::new(format!("{confidence:.2}")),
                None => dim_cell("-"),
            },
        ]);
    }
    println!();
    println!("Removals:");
    println!("{table}");
}

pub fn print_aliases(entries: &[AliasEntry]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Scope"),
        header_cell("Canonical name"),
        header_cell("Variant"),
    ]);
    apply_table_style(&mut table);
    for entry in entries {
        let scope = if entry.scope.is_global() {
            dim_cell(entry.scope.as_str())
        } else {
            Cell::new(entry.scope.as_str()).fg(Color::Blue)
        };
        table.add_row(vec![
            scope,
            Cell::new(entry.canonical.as_str()).add_attribute(Attribute::Bold),
            Cell::new(&entry.variant),
        ]);
    }
    println!("{table}");
    println!("{} entries", entries.len());
}

fn target_cell(mapping: &FieldMapping) -> Cell {
    match &mapping.target_name {
        Some(name) => Cell::new(name),
        None => dim_cell("-"),
    }
}

fn method_cell(method: MatchMethod) -> Cell {
    let color = match method {
        MatchMethod::Exact => Color::Green,
        MatchMethod::Alias => Color::Cyan,
        MatchMethod::Fuzzy => Color::Yellow,
        MatchMethod::Unresolved => Color::DarkGrey,
    };
    Cell::new(method.as_str()).fg(color)
}

fn confidence_cell(mapping: &FieldMapping) -> Cell {
    if mapping.is_resolved() {
        Cell::new(format!("{:.2}", mapping.confidence))
    } else {
        dim_cell("-")
    }
}

fn level_cell(mapping: &FieldMapping, thresholds: &ConfidenceThresholds) -> Cell {
    if !mapping.is_resolved() {
        return dim_cell("-");
    }
    match thresholds.categorize(mapping.confidence) {
        Some(level) => {
            let color = match level {
                ConfidenceLevel::High => Color::Green,
                ConfidenceLevel::Medium => Color::Yellow,
                ConfidenceLevel::Low => Color::Red,
            };
            Cell::new(level.description()).fg(color)
        }
        None => dim_cell("-"),
    }
}

fn ocr_cell(verdict: &OcrVerdict) -> Cell {
    match verdict {
        OcrVerdict::NotChecked => dim_cell("-"),
        OcrVerdict::Verified { similarity, .. } => {
            Cell::new(format!("ok {similarity:.2}")).fg(Color::Green)
        }
        OcrVerdict::Diverged {
            nearest_label,
            similarity,
            ..
        } => {
            let label = nearest_label.as_deref().unwrap_or("no label");
            Cell::new(format!("diverged: {label} ({similarity:.2})"))
                .fg(Color::Red)
                .add_attribute(Attribute::Bold)
        }
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
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
