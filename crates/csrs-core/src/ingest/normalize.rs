use tracing::debug;

use super::columns::{ColumnMap, LogicalColumn};
use super::RawTable;
use crate::error::CsrsError;
use crate::extract::{gender, parse_age, parse_date};
use crate::model::{CaseRecord, CountMode};

/// Columns a table must carry for a run in `mode`.
///
/// Without a mode (preview, pivot) only the case id and charge are required.
pub fn required_columns(mode: Option<CountMode>) -> Vec<LogicalColumn> {
    let mut required = vec![LogicalColumn::CaseId, LogicalColumn::Charge];
    match mode {
        Some(CountMode::New) => required.push(LogicalColumn::ArraignmentDate),
        Some(CountMode::Disposed) => required.push(LogicalColumn::DisposalDate),
        None => {}
    }
    required
}

/// Turn a raw table into case records.
///
/// Fails with `MissingColumn` when a required logical column has no header.
/// Optional columns that are absent read as empty for every row; rows whose
/// cells are all blank are skipped.
pub fn normalize_table(
    table: &RawTable,
    source: &str,
    required: &[LogicalColumn],
) -> Result<Vec<CaseRecord>, CsrsError> {
    let map = ColumnMap::resolve(&table.headers);

    if let Some(missing) = required.iter().find(|c| !map.contains(**c)) {
        return Err(CsrsError::MissingColumn {
            source_name: source.to_string(),
            column: missing.name().to_string(),
        });
    }

    let mut records = Vec::with_capacity(table.rows.len());
    let mut blank = 0usize;
    for row in &table.rows {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            blank += 1;
            continue;
        }
        records.push(CaseRecord {
            source: source.to_string(),
            case_id: map.get(row, LogicalColumn::CaseId).to_string(),
            charge: map.get(row, LogicalColumn::Charge).to_string(),
            complainant: map.get(row, LogicalColumn::Complainant).to_string(),
            arraignment_date: parse_date(map.get(row, LogicalColumn::ArraignmentDate)),
            disposal_date: parse_date(map.get(row, LogicalColumn::DisposalDate)),
            age: parse_age(map.get(row, LogicalColumn::Age)),
            gender: gender(map.get(row, LogicalColumn::Gender)),
            remark: map.get(row, LogicalColumn::Remark).to_string(),
            sentence: map.get(row, LogicalColumn::Sentence).to_string(),
            status: map.get(row, LogicalColumn::Status).to_string(),
        });
    }

    if blank > 0 {
        debug!(source, blank, "skipped blank rows");
    }
    Ok(records)
}
