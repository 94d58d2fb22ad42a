use std::io::Cursor;

use calamine::{Data, Reader};
use tracing::debug;

use super::RawTable;
use crate::error::CsrsError;

/// Read a spreadsheet table. The first used row of the sheet is the header row.
///
/// `sheet` selects a worksheet by name; the first worksheet is used otherwise.
pub fn read_xlsx(bytes: &[u8], sheet: Option<&str>) -> Result<RawTable, CsrsError> {
    let cursor = Cursor::new(bytes);
    let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
        .map_err(|e| CsrsError::InputRead(format!("failed to open spreadsheet: {e}")))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| CsrsError::InputRead("spreadsheet has no worksheets".into()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| CsrsError::InputRead(format!("sheet '{sheet_name}' not found: {e}")))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_text).collect(),
        None => {
            return Err(CsrsError::InputRead(format!(
                "sheet '{sheet_name}' is empty"
            )))
        }
    };
    let rows: Vec<Vec<String>> = rows.map(|r| r.iter().map(cell_text).collect()).collect();

    debug!(sheet = %sheet_name, rows = rows.len(), "read spreadsheet table");
    Ok(RawTable { headers, rows })
}

/// Render a cell as text. Date cells become ISO dates so the date parser sees one format.
pub(crate) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => ndt.date().format("%Y-%m-%d").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) => s.clone(),
        Data::Empty => String::new(),
        _ => format!("{cell}"),
    }
}
