use csrs_core::audit::{RunWarning, WarningSeverity};
use csrs_core::classify::{Classification, MatchSource, StatutoryClassification};
use csrs_core::extract::DispositionOutcome;
use csrs_core::model::{CaseRecord, Gender};
use csrs_core::summary::PivotTable;
use csrs_core::FillResult;
use std::path::Path;

pub fn print_run(result: &FillResult, out: &Path) {
    let tally = &result.run.tally;

    println!("=== {} cases, {} ===\n", tally.mode, tally.period);
    println!("  Inputs: {}", result.loaded.join(", "));
    println!(
        "  Rows read: {}, counted: {}, excluded: {}",
        tally.rows_read,
        tally.qualifying,
        tally.exclusions.total()
    );
    if tally.exclusions.total() > 0 {
        let ex = &tally.exclusions;
        println!(
            "    ({} outside the period, {} without a date, {} with an unreadable date)",
            ex.out_of_period, ex.missing_date, ex.unparseable_date
        );
    }
    println!();

    let width = tally
        .category_totals()
        .iter()
        .map(|(c, _, _)| c.label().len())
        .max()
        .unwrap_or(10);
    println!("  {:<width$}  {:>7}  {:>7}", "Category", "Cases", "Persons", width = width);
    for (category, cases, persons) in tally.category_totals() {
        println!(
            "  {:<width$}  {:>7}  {:>7}",
            category.label(),
            cases,
            persons,
            width = width
        );
    }
    println!(
        "  {:<width$}  {:>7}  {:>7}",
        "Total",
        tally.total_cases(),
        tally.total_persons(),
        width = width
    );

    if !tally.dispositions.is_empty() {
        println!();
        let line: Vec<String> = DispositionOutcome::ALL
            .iter()
            .map(|outcome| {
                let n: u64 = tally
                    .dispositions
                    .values()
                    .filter_map(|m| m.get(outcome))
                    .sum();
                format!("{outcome} {n}")
            })
            .collect();
        println!("  Dispositions: {}", line.join(", "));
    }

    if let Some(ref pivot) = result.pivot {
        println!();
        print_pivot(pivot);
    }

    print_warnings(&result.run.warnings);

    println!("\nReturn written to {}", out.display());
}

pub fn print_classification(c: &Classification, statutory: &StatutoryClassification) {
    println!("  Category:  {}", c.category);
    println!("  Row:       {} {}", c.row, c.label);
    let reason = match &c.matched_by {
        MatchSource::AuthorityOverride { rule: Some(rule) } => {
            format!("police/government complainant, rule '{rule}'")
        }
        MatchSource::AuthorityOverride { rule: None } => {
            "police/government complainant".to_string()
        }
        MatchSource::Rule { id } => format!("rule '{id}'"),
        MatchSource::Fallback => "no rule matched".to_string(),
    };
    println!("  Matched:   {}", reason);
    println!(
        "  Statutory: {} {}{}",
        statutory.row,
        statutory.label,
        statutory
            .rule
            .as_ref()
            .map(|r| format!(" (rule '{r}')"))
            .unwrap_or_default()
    );
}

pub fn print_preview(records: &[CaseRecord], total: usize) {
    if records.is_empty() {
        println!("No rows.");
        return;
    }

    let id_width = records
        .iter()
        .map(|r| r.case_id.len())
        .max()
        .unwrap_or(4)
        .max(4);
    let charge_width = records
        .iter()
        .map(|r| r.charge.chars().count().min(40))
        .max()
        .unwrap_or(6)
        .max(6);

    println!(
        "  {:<id$}  {:<charge$}  {:<10}  {:<10}  {:>3}  {:<7}  {}",
        "Case",
        "Charge",
        "Arraigned",
        "Disposed",
        "Age",
        "Sex",
        "Status",
        id = id_width,
        charge = charge_width
    );
    for r in records {
        let charge: String = r.charge.chars().take(40).collect();
        println!(
            "  {:<id$}  {:<charge$}  {:<10}  {:<10}  {:>3}  {:<7}  {}",
            r.case_id,
            charge,
            r.arraignment_date.to_string(),
            r.disposal_date.to_string(),
            r.age.map(|a| a.to_string()).unwrap_or_default(),
            gender_short(r.gender),
            r.status,
            id = id_width,
            charge = charge_width
        );
    }

    if total > records.len() {
        println!("\n  ... {} of {} rows shown", records.len(), total);
    }
}

fn gender_short(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "M",
        Gender::Female => "F",
        Gender::Unknown => "",
    }
}

pub fn print_pivot(pivot: &PivotTable) {
    let label_width = pivot
        .rows
        .iter()
        .map(|r| r.category.label().len())
        .max()
        .unwrap_or(10);
    let widths: Vec<usize> = pivot.statuses.iter().map(|s| s.len().max(5)).collect();

    let mut header = format!("  {:<width$}", "Category", width = label_width);
    for (status, w) in pivot.statuses.iter().zip(&widths) {
        header.push_str(&format!("  {:>w$}", status, w = w));
    }
    header.push_str(&format!("  {:>5}", "Total"));
    println!("{header}");

    for row in &pivot.rows {
        let mut line = format!("  {:<width$}", row.category.label(), width = label_width);
        for (n, w) in row.counts.iter().zip(&widths) {
            line.push_str(&format!("  {:>w$}", n, w = w));
        }
        line.push_str(&format!("  {:>5}", row.total));
        println!("{line}");
    }

    let mut footer = format!("  {:<width$}", "Total", width = label_width);
    for (n, w) in pivot.column_totals.iter().zip(&widths) {
        footer.push_str(&format!("  {:>w$}", n, w = w));
    }
    footer.push_str(&format!("  {:>5}", pivot.grand_total));
    println!("{footer}");
}

pub fn print_warnings(warnings: &[RunWarning]) {
    if warnings.is_empty() {
        return;
    }
    let serious = warnings
        .iter()
        .filter(|w| w.severity == WarningSeverity::Warning)
        .count();
    println!(
        "\nWarnings ({} of {} need attention):",
        serious,
        warnings.len()
    );
    for w in warnings {
        println!("  {}", w);
    }
}

