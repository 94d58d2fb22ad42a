use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use tracing::debug;

use super::grid::{CellRef, CellValue, ReportGrid};
use crate::error::CsrsError;

/// Read a pre-filled return from a template file.
pub fn load_template_file(path: &Path) -> Result<ReportGrid, CsrsError> {
    let bytes = std::fs::read(path)
        .map_err(|e| CsrsError::TemplateRead(format!("{}: {e}", path.display())))?;
    load_template(&bytes)
}

/// Read a pre-filled return from xlsx bytes.
///
/// Values and formulas are kept; formula cells stay formulas so their counts
/// are never overwritten.
pub fn load_template(bytes: &[u8]) -> Result<ReportGrid, CsrsError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
        .map_err(|e| CsrsError::TemplateRead(format!("failed to open xlsx: {e}")))?;

    let mut grid = ReportGrid::new();
    for name in workbook.sheet_names() {
        let values = workbook
            .worksheet_range(&name)
            .map_err(|e| CsrsError::TemplateRead(format!("sheet '{name}': {e}")))?;
        let sheet = grid.add_sheet(&name);

        if let Some((row0, col0)) = values.start() {
            for (r, c, cell) in values.used_cells() {
                let Some(value) = cell_value(cell) else {
                    continue;
                };
                if let Some(at) = absolute(row0, col0, r, c) {
                    sheet.set(at, value);
                }
            }
        }

        let formulas = workbook
            .worksheet_formula(&name)
            .map_err(|e| CsrsError::TemplateRead(format!("sheet '{name}' formulas: {e}")))?;
        if let Some((row0, col0)) = formulas.start() {
            for (r, c, formula) in formulas.used_cells() {
                if formula.trim().is_empty() {
                    continue;
                }
                if let Some(at) = absolute(row0, col0, r, c) {
                    let text = formula.trim_start_matches('=').to_string();
                    sheet.set(at, CellValue::Formula(text));
                }
            }
        }
        debug!(sheet = %name, "loaded template sheet");
    }

    if grid.sheets().is_empty() {
        return Err(CsrsError::TemplateRead("workbook has no worksheets".into()));
    }
    Ok(grid)
}

/// calamine ranges are 0-based and relative to their first used cell.
fn absolute(row0: u32, col0: u32, r: usize, c: usize) -> Option<CellRef> {
    let row = row0 as usize + r + 1;
    let col = col0 as usize + c + 1;
    CellRef::new(u32::try_from(row).ok()?, u32::try_from(col).ok()?)
}

fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Bool(b) => Some(CellValue::Text(b.to_string())),
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(_) | Data::Empty => None,
    }
}
