use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use super::grid::column_index;
use crate::error::CsrsError;
use crate::extract::{AgeBand, DispositionOutcome, SentenceKind};
use crate::model::{CountMode, Gender, OffenseCategory};

const MONTHLY_RETURN_JSON: &str = include_str!("../../../../rules/report-layout.json");

/// Available predefined layouts.
pub const LAYOUT_PRESETS: &[&str] = &["monthly-return"];

pub const DEFAULT_LAYOUT: &str = "monthly-return";

/// Excel refuses longer sheet names.
const MAX_SHEET_NAME: usize = 31;

/// Where each section of the return lives in the workbook.
///
/// Offense, disposition and sentence rows are the taxonomy row ids; the
/// juvenile section shifts them by a per-category offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLayout {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    pub offenses: OffenseSection,
    pub dispositions: DispositionSection,
    pub sentences: SentenceSection,
    pub demographics: DemographicSection,
    pub juvenile: JuvenileSection,
    pub statutory: StatutorySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffenseSection {
    pub sheet: String,
    pub heading_row: u32,
    pub label_column: String,
    pub new_cases: String,
    pub new_persons: String,
    pub disposed_cases: String,
    pub disposed_persons: String,
}

impl OffenseSection {
    /// Column of case-level (deduplicated) counts for `mode`.
    pub fn cases_column(&self, mode: CountMode) -> u32 {
        match mode {
            CountMode::New => col(&self.new_cases),
            CountMode::Disposed => col(&self.disposed_cases),
        }
    }

    /// Column of person-level counts for `mode`.
    pub fn persons_column(&self, mode: CountMode) -> u32 {
        match mode {
            CountMode::New => col(&self.new_persons),
            CountMode::Disposed => col(&self.disposed_persons),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispositionSection {
    pub sheet: String,
    /// Defaults to the offenses heading row, which is only right when both
    /// sections share a sheet.
    #[serde(default)]
    pub heading_row: Option<u32>,
    pub columns: BTreeMap<DispositionOutcome, String>,
}

impl DispositionSection {
    pub fn heading_row(&self, offenses: &OffenseSection) -> u32 {
        self.heading_row.unwrap_or(offenses.heading_row)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceSection {
    pub sheet: String,
    pub heading_row: u32,
    pub label_column: String,
    pub columns: BTreeMap<SentenceKind, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemographicSection {
    pub sheet: String,
    pub heading_row: u32,
    pub label_column: String,
    pub rows: BTreeMap<AgeBand, u32>,
    pub columns: BTreeMap<Gender, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JuvenileSection {
    pub sheet: String,
    pub heading_row: u32,
    pub label_column: String,
    pub column: String,
    /// Juvenile row = offense row + offset of the offense's category.
    pub row_offsets: BTreeMap<OffenseCategory, i64>,
}

impl JuvenileSection {
    pub fn row_for(&self, category: OffenseCategory, offense_row: u32) -> i64 {
        let offset = self.row_offsets.get(&category).copied().unwrap_or(0);
        i64::from(offense_row) + offset
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatutorySection {
    pub sheet: String,
    pub heading_row: u32,
    pub label_column: String,
    pub column: String,
}

/// Column index of a validated column name. Zero never addresses a cell.
pub(crate) fn col(letters: &str) -> u32 {
    column_index(letters).unwrap_or(0)
}

impl ReportLayout {
    /// Sheets the layout writes to, in first-use order, without repeats.
    pub fn sheet_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in [
            self.offenses.sheet.as_str(),
            self.dispositions.sheet.as_str(),
            self.sentences.sheet.as_str(),
            self.demographics.sheet.as_str(),
            self.juvenile.sheet.as_str(),
            self.statutory.sheet.as_str(),
        ] {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// Load a layout from a JSON file.
pub fn load_layout(path: &Path) -> Result<ReportLayout, CsrsError> {
    let content = std::fs::read_to_string(path).map_err(|e| CsrsError::LayoutLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_layout(&content, path)
}

/// Parse a layout from a JSON string.
pub fn parse_layout(json: &str, source: &Path) -> Result<ReportLayout, CsrsError> {
    let layout: ReportLayout = serde_json::from_str(json).map_err(|e| CsrsError::LayoutLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_layout(&layout)?;
    Ok(layout)
}

/// Parse a layout from a JSON string (no file path context).
pub fn parse_layout_str(json: &str) -> Result<ReportLayout, CsrsError> {
    let layout: ReportLayout = serde_json::from_str(json)?;
    validate_layout(&layout)?;
    Ok(layout)
}

/// Load a predefined layout by name.
pub fn load_layout_preset(name: &str) -> Result<ReportLayout, CsrsError> {
    match name {
        "monthly-return" => parse_layout_str(MONTHLY_RETURN_JSON),
        _ => Err(CsrsError::LayoutInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            LAYOUT_PRESETS.join(", ")
        ))),
    }
}

/// Validate that a layout addresses real cells for every bucket.
pub fn validate_layout(layout: &ReportLayout) -> Result<(), CsrsError> {
    for name in layout.sheet_names() {
        if name.trim().is_empty() || name.chars().count() > MAX_SHEET_NAME {
            return Err(CsrsError::LayoutInvalid(format!(
                "sheet name '{name}' must be 1 to {MAX_SHEET_NAME} characters"
            )));
        }
    }

    let o = &layout.offenses;
    check_column("offenses.label_column", &o.label_column)?;
    check_column("offenses.new_cases", &o.new_cases)?;
    check_column("offenses.new_persons", &o.new_persons)?;
    check_column("offenses.disposed_cases", &o.disposed_cases)?;
    check_column("offenses.disposed_persons", &o.disposed_persons)?;
    check_column("sentences.label_column", &layout.sentences.label_column)?;
    check_column("demographics.label_column", &layout.demographics.label_column)?;
    check_column("juvenile.label_column", &layout.juvenile.label_column)?;
    check_column("juvenile.column", &layout.juvenile.column)?;
    check_column("statutory.label_column", &layout.statutory.label_column)?;
    check_column("statutory.column", &layout.statutory.column)?;

    check_keys("dispositions.columns", &layout.dispositions.columns, &DispositionOutcome::ALL)?;
    check_keys("sentences.columns", &layout.sentences.columns, &SentenceKind::ALL)?;
    check_keys("demographics.rows", &layout.demographics.rows, &AgeBand::ALL)?;
    check_keys("demographics.columns", &layout.demographics.columns, &Gender::ALL)?;
    check_keys("juvenile.row_offsets", &layout.juvenile.row_offsets, &OffenseCategory::ALL)?;

    for (outcome, letters) in &layout.dispositions.columns {
        check_column(&format!("dispositions.columns.{outcome}"), letters)?;
    }
    for (kind, letters) in &layout.sentences.columns {
        check_column(&format!("sentences.columns.{kind}"), letters)?;
    }
    for (gender, letters) in &layout.demographics.columns {
        check_column(&format!("demographics.columns.{gender}"), letters)?;
    }

    let mut seen = HashSet::new();
    for (band, row) in &layout.demographics.rows {
        if *row == 0 || *row <= layout.demographics.heading_row {
            return Err(CsrsError::LayoutInvalid(format!(
                "demographics row of '{band}' must be below the heading row"
            )));
        }
        if !seen.insert(*row) {
            return Err(CsrsError::LayoutInvalid(format!(
                "demographics row {row} is used by more than one age band"
            )));
        }
    }

    let heading_rows = [
        ("offenses", o.heading_row),
        ("dispositions", layout.dispositions.heading_row(o)),
        ("sentences", layout.sentences.heading_row),
        ("demographics", layout.demographics.heading_row),
        ("juvenile", layout.juvenile.heading_row),
        ("statutory", layout.statutory.heading_row),
    ];
    if let Some((section, _)) = heading_rows.iter().find(|(_, row)| *row == 0) {
        return Err(CsrsError::LayoutInvalid(format!(
            "{section}.heading_row must be 1 or greater"
        )));
    }

    Ok(())
}

fn check_column(field: &str, letters: &str) -> Result<(), CsrsError> {
    if column_index(letters).is_none() {
        return Err(CsrsError::LayoutInvalid(format!(
            "{field}: '{letters}' is not a column name"
        )));
    }
    Ok(())
}

fn check_keys<K: Ord + std::fmt::Display, V>(
    field: &str,
    map: &BTreeMap<K, V>,
    expected: &[K],
) -> Result<(), CsrsError> {
    match expected.iter().find(|k| !map.contains_key(*k)) {
        Some(missing) => Err(CsrsError::LayoutInvalid(format!(
            "{field} has no entry for '{missing}'"
        ))),
        None => Ok(()),
    }
}
