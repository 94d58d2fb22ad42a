pub mod aggregate;
pub mod audit;
pub mod classify;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod model;
pub mod report;
pub mod summary;
pub mod taxonomy;

use std::path::{Path, PathBuf};

use aggregate::{AggregationRun, Aggregator};
use audit::RunWarning;
use error::CsrsError;
use ingest::{load_inputs, required_columns};
use model::{CountMode, ReportPeriod};
use report::{load_template_file, scaffold, ReportLayout};
use summary::PivotTable;
use taxonomy::schema::TaxonomyDef;

/// Sheet the pivot summary is written to, when requested.
pub const PIVOT_SHEET: &str = "Summary";

/// One monthly-return run.
pub struct FillRequest<'a> {
    pub inputs: &'a [PathBuf],
    /// Worksheet to read from spreadsheet inputs; the first one otherwise.
    pub sheet: Option<&'a str>,
    pub period: ReportPeriod,
    pub mode: CountMode,
    /// Pre-filled return to add to. A fresh scaffold is used without one.
    pub template: Option<&'a Path>,
    pub taxonomy: &'a TaxonomyDef,
    pub layout: &'a ReportLayout,
    /// Also write a category × status pivot of the period's rows.
    pub pivot: bool,
}

#[derive(Debug)]
pub struct FillResult {
    pub run: AggregationRun,
    /// Inputs that loaded, by file name.
    pub loaded: Vec<String>,
    pub pivot: Option<PivotTable>,
}

/// Main API entry point: read the inputs, count them and fill the return.
///
/// An unreadable template aborts the run. Inputs that cannot be used are
/// skipped with a warning, unless none can be used.
pub fn fill_report(request: &FillRequest<'_>) -> Result<FillResult, CsrsError> {
    let grid = match request.template {
        Some(path) => load_template_file(path)?,
        None => scaffold(request.taxonomy, request.layout),
    };

    let batch = load_inputs(
        request.inputs,
        request.sheet,
        &required_columns(Some(request.mode)),
    )?;

    let mut run = Aggregator::new(request.taxonomy, request.layout).run(
        &batch.records,
        request.period,
        request.mode,
        grid,
    );

    let mut warnings: Vec<RunWarning> = batch
        .failures
        .iter()
        .map(|f| RunWarning::warning(format!("input {} skipped: {}", f.source, f.error)))
        .collect();
    warnings.append(&mut run.warnings);
    run.warnings = warnings;

    let pivot = if request.pivot {
        let in_period: Vec<_> = batch
            .records
            .iter()
            .filter(|r| request.period.includes(r, request.mode))
            .cloned()
            .collect();
        let pivot = PivotTable::build(request.taxonomy, &in_period);
        let sheet = fresh_sheet_name(&run.grid, PIVOT_SHEET);
        pivot.write_to(&mut run.grid, &sheet);
        Some(pivot)
    } else {
        None
    };

    Ok(FillResult {
        run,
        loaded: batch.loaded,
        pivot,
    })
}

/// `base`, or `base (2)`, `base (3)`... whichever the grid does not have yet.
fn fresh_sheet_name(grid: &report::ReportGrid, base: &str) -> String {
    if grid.sheet(base).is_none() {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base} ({n})"))
        .find(|name| grid.sheet(name).is_none())
        .unwrap_or_else(|| base.to_string())
}
