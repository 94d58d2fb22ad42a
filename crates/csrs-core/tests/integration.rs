//! Integration tests for fill_report() and the aggregation pipeline.
//!
//! Inputs are written as CSV into temp directories; templates are produced
//! with rust_xlsxwriter and read back through the calamine template loader.

use std::path::{Path, PathBuf};

use csrs_core::aggregate::Aggregator;
use csrs_core::error::CsrsError;
use csrs_core::extract::parse_date;
use csrs_core::model::{CaseRecord, CountMode, OffenseCategory, ReportPeriod};
use csrs_core::report::{
    export_workbook, load_layout_preset, load_template, load_template_file, scaffold, CellRef,
    CellValue, ReportGrid, DEFAULT_LAYOUT,
};
use csrs_core::taxonomy::builtin::{load_preset, DEFAULT_PRESET};
use csrs_core::{fill_report, FillRequest, PIVOT_SHEET};

const RETURN_SHEET: &str = "Criminal Return";

const CASES_CSV: &str = "\
Case No,Charge,Complainant,Arraignment Date,Disposal Date,Age,Sex,Remarks,Further Particulars,Status
CB-100,Theft,John Doe,04/03/2025,,34,M,,,Pending
CB-100,Burglary,John Doe,04/03/2025,,34,M,,,Pending
CB-101,Common Assault,PC Jones,12/03/2025,,22,F,,,Pending
CB-102,Murder,Mary Roe,sometime in March,,41,M,,,Pending
CB-090,Possession of cannabis,Police,10/01/2025,15/04/2025,16,M,Convicted,Fined $300,Closed
CB-091,Theft,Shop Ltd,11/01/2025,16/04/2025,28,F,Dismissed,,Closed
CB-092,Robbery,Ann Lee,12/02/2025,20/04/2025,52,M,Pleaded guilty,18 months imprisonment,Closed
CB-093,Theft,Bob Ray,13/02/2025,02/05/2025,30,M,Convicted,Fine,Closed
";

fn write_input(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn number(grid: &ReportGrid, sheet: &str, a1: &str) -> f64 {
    match grid.read(sheet, CellRef::parse(a1).unwrap()) {
        Some(CellValue::Number(n)) => *n,
        None => 0.0,
        Some(other) => panic!("{sheet}!{a1} holds {other:?}"),
    }
}

fn theft_row(case_id: &str, arraigned: &str) -> CaseRecord {
    CaseRecord {
        source: "test".into(),
        case_id: case_id.into(),
        charge: "Theft".into(),
        arraignment_date: parse_date(arraigned),
        ..Default::default()
    }
}

/// A minimal template: one prefilled count and a formula total.
fn write_template(path: &Path) {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(RETURN_SHEET).unwrap();
    sheet.write_string(36, 1, "Theft").unwrap();
    sheet.write_number(36, 2, 5.0).unwrap();
    sheet
        .write_formula(47, 2, rust_xlsxwriter::Formula::new("=SUM(C8:C47)"))
        .unwrap();
    workbook.save(path).unwrap();
}

// ---------------------------------------------------------------------------
// Test 1: Case-level counts deduplicate, person-level counts do not
// ---------------------------------------------------------------------------
#[test]
fn duplicate_case_counts_once_as_case_twice_as_persons() {
    let tx = load_preset(DEFAULT_PRESET).unwrap();
    let layout = load_layout_preset(DEFAULT_LAYOUT).unwrap();
    let mut records = vec![theft_row("CB-100", "2025-03-04"), theft_row("CB-100", "2025-03-04")];
    records[1].charge = "Theft of cattle".into();

    let run = Aggregator::new(&tx, &layout).run(
        &records,
        ReportPeriod::month(2025, 3).unwrap(),
        CountMode::New,
        scaffold(&tx, &layout),
    );

    assert_eq!(run.tally.total_cases(), 1);
    assert_eq!(run.tally.total_persons(), 2);
    assert_eq!(number(&run.grid, RETURN_SHEET, "C37"), 1.0);
    assert_eq!(number(&run.grid, RETURN_SHEET, "D37"), 2.0);
}

// ---------------------------------------------------------------------------
// Test 2: Template writes are additive: 5 -> 6 -> 7
// ---------------------------------------------------------------------------
#[test]
fn template_counts_accumulate_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("template.xlsx");
    write_template(&template);

    let tx = load_preset(DEFAULT_PRESET).unwrap();
    let layout = load_layout_preset(DEFAULT_LAYOUT).unwrap();
    let agg = Aggregator::new(&tx, &layout);
    let period = ReportPeriod::month(2025, 3).unwrap();
    let records = vec![theft_row("CB-1", "2025-03-10")];

    let first = agg.run(&records, period, CountMode::New, load_template_file(&template).unwrap());
    assert_eq!(number(&first.grid, RETURN_SHEET, "C37"), 6.0);

    let filled = dir.path().join("filled.xlsx");
    export_workbook(&first.grid, &first.audit, &first.warnings, &filled).unwrap();

    let bytes = std::fs::read(&filled).unwrap();
    let second = agg.run(&records, period, CountMode::New, load_template(&bytes).unwrap());
    assert_eq!(number(&second.grid, RETURN_SHEET, "C37"), 7.0);

    // The formula total survives both round trips.
    assert_eq!(
        second.grid.read(RETURN_SHEET, CellRef::parse("C48").unwrap()),
        Some(&CellValue::Formula("SUM(C8:C47)".into()))
    );

    // The filled return, audit sheet included, is itself a valid template.
    let refilled = dir.path().join("refilled.xlsx");
    export_workbook(&second.grid, &second.audit, &second.warnings, &refilled).unwrap();
    let third = agg.run(&records, period, CountMode::New, load_template_file(&refilled).unwrap());
    assert_eq!(number(&third.grid, RETURN_SHEET, "C37"), 8.0);
    assert_eq!(
        third.grid.sheet_names().iter().filter(|n| n.eq_ignore_ascii_case("Audit")).count(),
        1
    );
}

// ---------------------------------------------------------------------------
// Test 3: NEW run for March counts only March arraignments
// ---------------------------------------------------------------------------
#[test]
fn new_run_counts_only_period_arraignments() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "court.csv", CASES_CSV);
    let tx = load_preset(DEFAULT_PRESET).unwrap();
    let layout = load_layout_preset(DEFAULT_LAYOUT).unwrap();
    let inputs = [input];

    let result = fill_report(&FillRequest {
        inputs: &inputs,
        sheet: None,
        period: ReportPeriod::month(2025, 3).unwrap(),
        mode: CountMode::New,
        template: None,
        taxonomy: &tx,
        layout: &layout,
        pivot: false,
    })
    .unwrap();
    let run = &result.run;

    // CB-100 (two rows) and CB-101; CB-102 has an unparseable date.
    assert_eq!(run.tally.qualifying, 3);
    assert_eq!(run.tally.total_cases(), 2);
    assert_eq!(run.tally.exclusions.unparseable_date, 1);
    assert_eq!(run.audit.len(), 3);
    assert!(run.audit.iter().all(|e| e.kind == CountMode::New));

    // PC complainant files the assault under lawful authority, row 9.
    assert_eq!(number(&run.grid, RETURN_SHEET, "C9"), 1.0);
    assert_eq!(number(&run.grid, RETURN_SHEET, "C29"), 0.0);
    // The murder row stays empty: its only row had no usable date.
    assert_eq!(number(&run.grid, RETURN_SHEET, "D22"), 0.0);
    // NEW runs never touch the disposal side.
    assert_eq!(number(&run.grid, RETURN_SHEET, "E37"), 0.0);
    assert_eq!(number(&run.grid, "Sentences", "C44"), 0.0);
}

// ---------------------------------------------------------------------------
// Test 4: DISPOSED run for April fills conviction breakdowns
// ---------------------------------------------------------------------------
#[test]
fn disposed_run_fills_breakdowns_for_convictions_only() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "court.csv", CASES_CSV);
    let tx = load_preset(DEFAULT_PRESET).unwrap();
    let layout = load_layout_preset(DEFAULT_LAYOUT).unwrap();
    let inputs = [input];

    let result = fill_report(&FillRequest {
        inputs: &inputs,
        sheet: None,
        period: ReportPeriod::month(2025, 4).unwrap(),
        mode: CountMode::Disposed,
        template: None,
        taxonomy: &tx,
        layout: &layout,
        pivot: false,
    })
    .unwrap();
    let run = &result.run;
    let grid = &run.grid;

    // CB-090, CB-091, CB-092; CB-093 was disposed of in May.
    assert_eq!(run.tally.qualifying, 3);
    assert_eq!(run.tally.convictions(), 2);

    // Police complainant: the drug charge goes to lawful authority (row 14).
    assert_eq!(number(grid, RETURN_SHEET, "E14"), 1.0);
    assert_eq!(number(grid, RETURN_SHEET, "G14"), 1.0);
    // Dismissed theft: counted as disposed, no breakdowns.
    assert_eq!(number(grid, RETURN_SHEET, "E37"), 1.0);
    assert_eq!(number(grid, RETURN_SHEET, "H37"), 1.0);
    assert_eq!(number(grid, "Convicted Persons", "C8"), 0.0);
    // Robbery, guilty plea, 52-year-old man, prison sentence.
    assert_eq!(number(grid, RETURN_SHEET, "G34"), 1.0);
    assert_eq!(number(grid, "Sentences", "D34"), 1.0);
    assert_eq!(number(grid, "Convicted Persons", "B10"), 1.0);
    // 16-year-old: juvenile band and juvenile sheet (row 14 - 3).
    assert_eq!(number(grid, "Convicted Persons", "B6"), 1.0);
    assert_eq!(number(grid, "Juvenile", "C11"), 1.0);
    assert_eq!(number(grid, "Sentences", "C14"), 1.0);
    // Statutory: drugs and the robbery's "Other".
    assert_eq!(number(grid, "Statutory Offences", "C6"), 1.0);
    assert_eq!(number(grid, "Statutory Offences", "C12"), 1.0);
}

// ---------------------------------------------------------------------------
// Test 5: Full-year mode with pivot summary
// ---------------------------------------------------------------------------
#[test]
fn full_year_run_with_pivot() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "court.csv", CASES_CSV);
    let tx = load_preset(DEFAULT_PRESET).unwrap();
    let layout = load_layout_preset(DEFAULT_LAYOUT).unwrap();
    let inputs = [input];

    let result = fill_report(&FillRequest {
        inputs: &inputs,
        sheet: None,
        period: ReportPeriod::year(2025),
        mode: CountMode::New,
        template: None,
        taxonomy: &tx,
        layout: &layout,
        pivot: true,
    })
    .unwrap();

    assert_eq!(result.run.tally.qualifying, 7);
    let pivot = result.pivot.unwrap();
    assert_eq!(pivot.statuses, vec!["CLOSED", "PENDING"]);
    assert_eq!(pivot.grand_total, 7);
    let property = pivot
        .rows
        .iter()
        .find(|r| r.category == OffenseCategory::Property)
        .unwrap();
    assert_eq!(property.total, 5);
    assert!(result.run.grid.sheet(PIVOT_SHEET).is_some());
}

// ---------------------------------------------------------------------------
// Test 6: Unusable inputs are skipped, unless all of them are
// ---------------------------------------------------------------------------
#[test]
fn missing_column_input_is_skipped_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_input(dir.path(), "court.csv", CASES_CSV);
    let bad = write_input(dir.path(), "other.csv", "Case No,Charge\nX-1,Theft\n");
    let tx = load_preset(DEFAULT_PRESET).unwrap();
    let layout = load_layout_preset(DEFAULT_LAYOUT).unwrap();
    let inputs = [bad.clone(), good];

    let result = fill_report(&FillRequest {
        inputs: &inputs,
        sheet: None,
        period: ReportPeriod::month(2025, 3).unwrap(),
        mode: CountMode::New,
        template: None,
        taxonomy: &tx,
        layout: &layout,
        pivot: false,
    })
    .unwrap();
    assert_eq!(result.loaded, vec!["court.csv"]);
    assert!(result.run.warnings[0].message.contains("ArraignmentDate"));

    let only_bad = [bad];
    let err = fill_report(&FillRequest {
        inputs: &only_bad,
        sheet: None,
        period: ReportPeriod::month(2025, 3).unwrap(),
        mode: CountMode::New,
        template: None,
        taxonomy: &tx,
        layout: &layout,
        pivot: false,
    })
    .unwrap_err();
    assert!(matches!(err, CsrsError::NoUsableInput { count: 1 }));
}

// ---------------------------------------------------------------------------
// Test 7: Unreadable template aborts the run without an artifact
// ---------------------------------------------------------------------------
#[test]
fn unreadable_template_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "court.csv", CASES_CSV);
    let template = write_input(dir.path(), "template.xlsx", "not really xlsx");
    let tx = load_preset(DEFAULT_PRESET).unwrap();
    let layout = load_layout_preset(DEFAULT_LAYOUT).unwrap();
    let inputs = [input];

    let err = fill_report(&FillRequest {
        inputs: &inputs,
        sheet: None,
        period: ReportPeriod::month(2025, 3).unwrap(),
        mode: CountMode::New,
        template: Some(&template),
        taxonomy: &tx,
        layout: &layout,
        pivot: false,
    })
    .unwrap_err();
    assert!(matches!(err, CsrsError::TemplateRead(_)));
}

// ---------------------------------------------------------------------------
// Test 8: Exported workbook carries the audit trail
// ---------------------------------------------------------------------------
#[test]
fn export_includes_audit_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let tx = load_preset(DEFAULT_PRESET).unwrap();
    let layout = load_layout_preset(DEFAULT_LAYOUT).unwrap();
    let records = vec![theft_row("CB-7", "2025-03-02"), theft_row("CB-8", "bad date")];
    let run = Aggregator::new(&tx, &layout).run(
        &records,
        ReportPeriod::month(2025, 3).unwrap(),
        CountMode::New,
        scaffold(&tx, &layout),
    );

    let out = dir.path().join("return.xlsx");
    export_workbook(&run.grid, &run.audit, &run.warnings, &out).unwrap();

    let grid = load_template_file(&out).unwrap();
    assert!(grid.sheet("Audit").is_some());
    assert!(grid.sheet("Warnings").is_some());
    assert_eq!(
        grid.read("Audit", CellRef::parse("C2").unwrap()),
        Some(&CellValue::Text("CB-7".into()))
    );
    assert!(grid.read("Audit", CellRef::parse("C3").unwrap()).is_none());
    assert_eq!(number(&grid, RETURN_SHEET, "C37"), 1.0);
}
