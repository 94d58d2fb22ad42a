use std::io::Write;
use std::path::Path;

use rust_xlsxwriter::{Format, Formula, Workbook, Worksheet, XlsxError};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::grid::{CellValue, ReportGrid};
use crate::audit::{AuditEntry, RunWarning};
use crate::error::CsrsError;

pub const AUDIT_SHEET: &str = "Audit";
pub const WARNINGS_SHEET: &str = "Warnings";

/// Render the filled return, the audit trail and any warnings as xlsx bytes.
pub fn render_workbook(
    grid: &ReportGrid,
    audit: &[AuditEntry],
    warnings: &[RunWarning],
) -> Result<Vec<u8>, CsrsError> {
    build(grid, audit, warnings).map_err(|e| CsrsError::Export(e.to_string()))
}

/// Write the workbook to `path`.
///
/// The file is staged next to its destination and only moved into place once
/// it is complete, so a failed export never leaves a partial artifact.
///
/// Audit and warning sheets carried over from a previously filled template
/// are replaced by this run's. Only cell values and formulas are written:
/// styles, merged ranges, column widths and number formats of a template are
/// not preserved, and template dates come back as plain serial numbers.
pub fn export_workbook(
    grid: &ReportGrid,
    audit: &[AuditEntry],
    warnings: &[RunWarning],
    path: &Path,
) -> Result<(), CsrsError> {
    let bytes = render_workbook(grid, audit, warnings)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(&bytes)?;
    staged.flush()?;
    staged
        .persist(path)
        .map_err(|e| CsrsError::Export(format!("{}: {}", path.display(), e.error)))?;

    info!(path = %path.display(), sheets = grid.sheets().len(), audit = audit.len(), "exported workbook");
    Ok(())
}

fn build(
    grid: &ReportGrid,
    audit: &[AuditEntry],
    warnings: &[RunWarning],
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    for sheet in grid.sheets() {
        if is_generated_sheet(&sheet.name) {
            debug!(sheet = %sheet.name, "replacing sheet from a previous run");
            continue;
        }
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        for (cell, value) in sheet.cells() {
            // Grid addresses are 1-based; rust_xlsxwriter is 0-based.
            let row = cell.row - 1;
            let Ok(col) = u16::try_from(cell.col - 1) else {
                continue;
            };
            match value {
                CellValue::Number(n) => {
                    worksheet.write_number(row, col, *n)?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string(row, col, s)?;
                }
                CellValue::Formula(f) => {
                    worksheet.write_formula(row, col, Formula::new(format!("={f}")))?;
                }
            }
        }
    }

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(AUDIT_SHEET)?;
    write_headings(worksheet, &AuditEntry::HEADINGS, &bold)?;
    for (i, entry) in audit.iter().enumerate() {
        let row = i as u32 + 1;
        for (col, text) in entry.cells().iter().enumerate() {
            worksheet.write_string(row, col as u16, text)?;
        }
    }

    if !warnings.is_empty() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(WARNINGS_SHEET)?;
        write_headings(worksheet, &["Severity", "Sheet", "Cell", "Message"], &bold)?;
        for (i, warning) in warnings.iter().enumerate() {
            let row = i as u32 + 1;
            worksheet.write_string(row, 0, warning.severity.to_string())?;
            worksheet.write_string(row, 1, warning.sheet.as_deref().unwrap_or(""))?;
            worksheet.write_string(row, 2, warning.cell.as_deref().unwrap_or(""))?;
            worksheet.write_string(row, 3, &warning.message)?;
        }
    }

    workbook.save_to_buffer()
}

/// Sheet names are case-insensitive in xlsx.
fn is_generated_sheet(name: &str) -> bool {
    name.eq_ignore_ascii_case(AUDIT_SHEET) || name.eq_ignore_ascii_case(WARNINGS_SHEET)
}

fn write_headings(worksheet: &mut Worksheet, headings: &[&str], bold: &Format) -> Result<(), XlsxError> {
    for (col, heading) in headings.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *heading, bold)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::grid::CellRef;
    use crate::report::template::load_template;

    #[test]
    fn test_render_produces_xlsx_bytes() {
        let mut grid = ReportGrid::new();
        grid.set("Return", CellRef::new(1, 1).unwrap(), CellValue::Text("Title".into()));
        grid.set("Return", CellRef::new(2, 3).unwrap(), CellValue::Number(4.0));
        grid.set("Return", CellRef::new(3, 3).unwrap(), CellValue::Formula("SUM(C2:C2)".into()));
        let bytes = render_workbook(&grid, &[], &[RunWarning::info("note")]).unwrap();
        // xlsx files are zip archives.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_previous_audit_and_warnings_sheets_are_replaced() {
        let mut grid = ReportGrid::new();
        grid.set("Return", CellRef::new(2, 3).unwrap(), CellValue::Number(4.0));
        grid.set(AUDIT_SHEET, CellRef::new(2, 1).unwrap(), CellValue::Text("stale".into()));
        grid.set("warnings", CellRef::new(2, 4).unwrap(), CellValue::Text("stale".into()));

        let bytes = render_workbook(&grid, &[], &[]).unwrap();
        let reloaded = load_template(&bytes).unwrap();

        assert_eq!(reloaded.sheet_names(), vec!["Return", AUDIT_SHEET]);
        assert_eq!(reloaded.number("Return", CellRef::new(2, 3).unwrap()), Some(4.0));
        assert!(reloaded.read(AUDIT_SHEET, CellRef::new(2, 1).unwrap()).is_none());
    }
}
