use csrs_core::ingest::{normalize_table, read_table, required_columns, source_name};
use std::path::Path;

use crate::error::CliError;
use crate::output;

pub fn run(input: &Path, sheet: Option<&str>, limit: usize, output_format: &str) -> Result<(), CliError> {
    let table = read_table(input, sheet)?;
    let records = normalize_table(&table, &source_name(input), &required_columns(None))?;
    let shown = &records[..records.len().min(limit)];

    match output_format {
        "json" => output::json::print(shown)?,
        _ => output::table::print_preview(shown, records.len()),
    }
    Ok(())
}
