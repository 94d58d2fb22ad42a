use serde::Serialize;
use std::collections::BTreeSet;

use crate::classify::{classify, normalize_text};
use crate::model::{CaseRecord, OffenseCategory};
use crate::report::grid::{CellRef, CellValue, ReportGrid};
use crate::taxonomy::schema::TaxonomyDef;

/// Status column heading for rows without a status.
pub const UNKNOWN_STATUS: &str = "UNKNOWN";

/// Category × status counts, with totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotTable {
    /// Distinct normalised statuses, sorted.
    pub statuses: Vec<String>,
    pub rows: Vec<PivotRow>,
    pub column_totals: Vec<u64>,
    pub grand_total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotRow {
    pub category: OffenseCategory,
    /// One count per entry of `PivotTable::statuses`.
    pub counts: Vec<u64>,
    pub total: u64,
}

impl PivotTable {
    /// Count rows with a case id by category and status.
    ///
    /// Every category gets a row, counted or not.
    pub fn build(taxonomy: &TaxonomyDef, records: &[CaseRecord]) -> Self {
        let counted: Vec<(OffenseCategory, String)> = records
            .iter()
            .filter(|r| !r.case_id.trim().is_empty())
            .map(|r| {
                let category = classify(taxonomy, &r.charge, &r.complainant).category;
                (category, status_key(&r.status))
            })
            .collect();

        let statuses: Vec<String> = counted
            .iter()
            .map(|(_, s)| s.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows: Vec<PivotRow> = OffenseCategory::ALL
            .iter()
            .map(|category| {
                let counts: Vec<u64> = statuses
                    .iter()
                    .map(|status| {
                        counted
                            .iter()
                            .filter(|(c, s)| c == category && s == status)
                            .count() as u64
                    })
                    .collect();
                let total = counts.iter().sum();
                PivotRow {
                    category: *category,
                    counts,
                    total,
                }
            })
            .collect();

        let column_totals = (0..statuses.len())
            .map(|i| rows.iter().map(|r| r.counts[i]).sum())
            .collect();
        let grand_total = rows.iter().map(|r| r.total).sum();

        Self {
            statuses,
            rows,
            column_totals,
            grand_total,
        }
    }

    /// Write the table onto `sheet`, starting at A1. Values are set, not added.
    pub fn write_to(&self, grid: &mut ReportGrid, sheet: &str) {
        let mut put = |row: u32, col: u32, value: CellValue| {
            if let Some(cell) = CellRef::new(row, col) {
                grid.set(sheet, cell, value);
            }
        };
        let total_col = self.statuses.len() as u32 + 2;

        put(1, 1, CellValue::Text("Category".into()));
        for (i, status) in self.statuses.iter().enumerate() {
            put(1, i as u32 + 2, CellValue::Text(status.clone()));
        }
        put(1, total_col, CellValue::Text("Total".into()));

        for (r, row) in self.rows.iter().enumerate() {
            let at = r as u32 + 2;
            put(at, 1, CellValue::Text(row.category.to_string()));
            for (i, count) in row.counts.iter().enumerate() {
                put(at, i as u32 + 2, CellValue::Number(*count as f64));
            }
            put(at, total_col, CellValue::Number(row.total as f64));
        }

        let at = self.rows.len() as u32 + 2;
        put(at, 1, CellValue::Text("Total".into()));
        for (i, count) in self.column_totals.iter().enumerate() {
            put(at, i as u32 + 2, CellValue::Number(*count as f64));
        }
        put(at, total_col, CellValue::Number(self.grand_total as f64));
    }
}

fn status_key(status: &str) -> String {
    let normalized = normalize_text(status);
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        UNKNOWN_STATUS.to_string()
    } else {
        trimmed.to_string()
    }
}
