use csrs_core::report::export_workbook;
use csrs_core::{fill_report, FillRequest};
use std::path::PathBuf;

use super::{parse_mode, parse_period, resolve_layout, resolve_taxonomy};
use crate::config::CliConfig;
use crate::error::CliError;
use crate::output;

pub struct FillArgs {
    pub inputs: Vec<PathBuf>,
    pub mode: String,
    pub year: i32,
    pub month: Option<u32>,
    pub full_year: bool,
    pub template: Option<PathBuf>,
    pub out: PathBuf,
    pub taxonomy: Option<PathBuf>,
    pub layout: Option<PathBuf>,
    pub sheet: Option<String>,
    pub pivot: bool,
}

pub fn run(args: FillArgs, config: &CliConfig, output_format: &str) -> Result<(), CliError> {
    let mode = parse_mode(&args.mode)?;
    let period = parse_period(args.year, args.month, args.full_year)?;
    let taxonomy = resolve_taxonomy(args.taxonomy, config)?;
    let layout = resolve_layout(args.layout, config)?;

    let result = fill_report(&FillRequest {
        inputs: &args.inputs,
        sheet: args.sheet.as_deref(),
        period,
        mode,
        template: args.template.as_deref(),
        taxonomy: &taxonomy,
        layout: &layout,
        pivot: args.pivot,
    })?;

    // Nothing is written unless the whole run succeeded.
    export_workbook(
        &result.run.grid,
        &result.run.audit,
        &result.run.warnings,
        &args.out,
    )?;

    match output_format {
        "json" => output::json::print_run(&result, &args.out)?,
        _ => output::table::print_run(&result, &args.out),
    }

    Ok(())
}
