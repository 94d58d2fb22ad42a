use csrs_core::audit::RunWarning;
use csrs_core::ingest::{load_inputs, required_columns};
use csrs_core::report::{export_workbook, ReportGrid};
use csrs_core::summary::PivotTable;
use csrs_core::PIVOT_SHEET;
use std::path::PathBuf;

use super::{parse_mode, parse_period, resolve_taxonomy};
use crate::config::CliConfig;
use crate::error::CliError;
use crate::output;

pub struct SummaryArgs {
    pub inputs: Vec<PathBuf>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub full_year: bool,
    pub mode: String,
    pub sheet: Option<String>,
    pub taxonomy: Option<PathBuf>,
    pub out: Option<PathBuf>,
}

pub fn run(args: SummaryArgs, config: &CliConfig, output_format: &str) -> Result<(), CliError> {
    let taxonomy = resolve_taxonomy(args.taxonomy, config)?;
    let filter = match args.year {
        Some(year) => Some((
            parse_period(year, args.month, args.full_year)?,
            parse_mode(&args.mode)?,
        )),
        None => None,
    };

    let required = required_columns(filter.map(|(_, mode)| mode));
    let batch = load_inputs(&args.inputs, args.sheet.as_deref(), &required)?;
    let warnings: Vec<RunWarning> = batch
        .failures
        .iter()
        .map(|f| RunWarning::warning(format!("input {} skipped: {}", f.source, f.error)))
        .collect();

    let records: Vec<_> = match filter {
        Some((period, mode)) => batch
            .records
            .into_iter()
            .filter(|r| period.includes(r, mode))
            .collect(),
        None => batch.records,
    };
    let pivot = PivotTable::build(&taxonomy, &records);

    if let Some(out) = &args.out {
        let mut grid = ReportGrid::new();
        pivot.write_to(&mut grid, PIVOT_SHEET);
        export_workbook(&grid, &[], &warnings, out)?;
        eprintln!("Summary written to {}", out.display());
    }

    match output_format {
        "json" => output::json::print(&pivot)?,
        _ => {
            output::table::print_pivot(&pivot);
            output::table::print_warnings(&warnings);
        }
    }
    Ok(())
}
