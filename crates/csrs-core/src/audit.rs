use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::extract::DispositionOutcome;
use crate::model::{CountMode, OffenseCategory};

pub const AUDIT_SCHEMA_VERSION: &str = "1.0";

/// One row that qualified for a run, whichever cells it ended up in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub source: String,
    pub kind: CountMode,
    pub case_id: String,
    pub category: OffenseCategory,
    pub row: u32,
    pub row_label: String,
    pub charge: String,
    pub date: NaiveDate,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition: Option<DispositionOutcome>,
}

impl AuditEntry {
    /// Column headings of the audit sheet, matching `cells()`.
    pub const HEADINGS: [&'static str; 9] = [
        "Source", "Type", "Case ID", "Category", "Row", "Charge", "Date", "Status", "Disposition",
    ];

    pub fn cells(&self) -> [String; 9] {
        [
            self.source.clone(),
            self.kind.to_string(),
            self.case_id.clone(),
            self.category.to_string(),
            self.row_label.clone(),
            self.charge.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            self.status.clone(),
            self.disposition.map(|d| d.to_string()).unwrap_or_default(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    /// Counts were lost.
    Warning,
    Info,
}

impl fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningSeverity::Warning => write!(f, "warning"),
            WarningSeverity::Info => write!(f, "info"),
        }
    }
}

/// Something a run could not do, surfaced instead of swallowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunWarning {
    pub severity: WarningSeverity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<String>,
}

impl RunWarning {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: WarningSeverity::Warning,
            message: message.into(),
            sheet: None,
            cell: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: WarningSeverity::Info,
            ..Self::warning(message)
        }
    }

    pub fn at(mut self, sheet: &str, cell: impl Into<String>) -> Self {
        self.sheet = Some(sheet.to_string());
        self.cell = Some(cell.into());
        self
    }
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.sheet, &self.cell) {
            (Some(sheet), Some(cell)) => {
                write!(f, "[{}] {}!{}: {}", self.severity, sheet, cell, self.message)
            }
            _ => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}
