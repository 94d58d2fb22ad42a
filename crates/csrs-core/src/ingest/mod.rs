pub mod columns;
pub mod delimited;
pub mod normalize;
pub mod workbook;

use crate::error::CsrsError;
use crate::model::CaseRecord;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub use columns::{ColumnMap, LogicalColumn};
pub use delimited::read_csv;
pub use normalize::{normalize_table, required_columns};
pub use workbook::read_xlsx;

/// A table of text cells with a header row, as read from an input file.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read an input table, choosing the reader from the file extension.
///
/// `.csv`/`.txt` are read as CSV; everything else goes through the
/// spreadsheet reader (xlsx, xlsm, xls, ods).
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<RawTable, CsrsError> {
    let bytes = std::fs::read(path)?;
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);

    if is_csv {
        read_csv(&bytes)
    } else {
        read_xlsx(&bytes, sheet)
    }
}

/// An input file that could not be used.
#[derive(Debug)]
pub struct InputFailure {
    pub source: String,
    pub error: CsrsError,
}

/// Records of every input that loaded, plus the inputs that did not.
#[derive(Debug, Default)]
pub struct InputBatch {
    pub records: Vec<CaseRecord>,
    pub loaded: Vec<String>,
    pub failures: Vec<InputFailure>,
}

/// Read and normalize several inputs.
///
/// A file that cannot be read, or lacks a required column, is recorded in
/// `failures` and skipped. Fails only when no input loaded at all.
pub fn load_inputs(
    paths: &[PathBuf],
    sheet: Option<&str>,
    required: &[LogicalColumn],
) -> Result<InputBatch, CsrsError> {
    let mut batch = InputBatch::default();
    for path in paths {
        let source = source_name(path);
        let loaded = read_table(path, sheet)
            .and_then(|table| normalize_table(&table, &source, required));
        match loaded {
            Ok(records) => {
                info!(source = %source, rows = records.len(), "loaded input");
                batch.records.extend(records);
                batch.loaded.push(source);
            }
            Err(error) => {
                warn!(source = %source, %error, "skipping input");
                batch.failures.push(InputFailure { source, error });
            }
        }
    }

    if batch.loaded.is_empty() {
        return Err(CsrsError::NoUsableInput { count: paths.len() });
    }
    Ok(batch)
}

/// File name used to tag records and audit entries.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CountMode;

    #[test]
    fn test_load_inputs_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("march.csv");
        let bad = dir.path().join("broken.csv");
        std::fs::write(&good, "CaseID,Charge,Arraignment Date\nCB-1,Theft,2025-03-04\n").unwrap();
        std::fs::write(&bad, "Something,Else\n1,2\n").unwrap();

        let batch = load_inputs(
            &[good, bad, dir.path().join("missing.csv")],
            None,
            &required_columns(Some(CountMode::New)),
        )
        .unwrap();
        assert_eq!(batch.loaded, vec!["march.csv"]);
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].source, "march.csv");
        assert_eq!(batch.failures.len(), 2);
        assert!(matches!(
            batch.failures[0].error,
            CsrsError::MissingColumn { .. }
        ));
    }

    #[test]
    fn test_no_usable_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_inputs(&[dir.path().join("nope.csv")], None, &[]).unwrap_err();
        assert!(matches!(err, CsrsError::NoUsableInput { count: 1 }));
    }
}
