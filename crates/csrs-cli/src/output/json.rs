use csrs_core::aggregate::Tally;
use csrs_core::audit::{AuditEntry, RunWarning, AUDIT_SCHEMA_VERSION};
use csrs_core::summary::PivotTable;
use csrs_core::FillResult;
use serde::Serialize;
use std::path::Path;

use crate::error::CliError;

#[derive(Serialize)]
struct RunReport<'a> {
    audit_version: &'static str,
    output: &'a Path,
    inputs: &'a [String],
    tally: &'a Tally,
    #[serde(skip_serializing_if = "Option::is_none")]
    pivot: Option<&'a PivotTable>,
    warnings: &'a [RunWarning],
    audit: &'a [AuditEntry],
}

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

pub fn print_run(result: &FillResult, out: &Path) -> Result<(), CliError> {
    print(&RunReport {
        audit_version: AUDIT_SCHEMA_VERSION,
        output: out,
        inputs: &result.loaded,
        tally: &result.run.tally,
        pivot: result.pivot.as_ref(),
        warnings: &result.run.warnings,
        audit: &result.run.audit,
    })
}
