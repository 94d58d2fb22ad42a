use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Spreadsheet limits. Addresses beyond these do not exist.
pub const MAX_ROWS: u32 = 1_048_576;
pub const MAX_COLS: u32 = 16_384;

/// Value of one report cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Number(f64),
    Text(String),
    /// Formula text without the leading `=`.
    Formula(String),
}

impl CellValue {
    /// Numeric reading of the cell. Numeric text counts; blank text is zero.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) if s.trim().is_empty() => Some(0.0),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            CellValue::Formula(_) => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Formula(s) => write!(f, "={s}"),
        }
    }
}

/// A 1-based cell address within the spreadsheet limits.
///
/// Field order gives row-major ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> Option<Self> {
        if (1..=MAX_ROWS).contains(&row) && (1..=MAX_COLS).contains(&col) {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// Parse an A1-style reference ("C14", "$C$14").
    pub fn parse(a1: &str) -> Option<Self> {
        let cleaned: String = a1.trim().chars().filter(|c| *c != '$').collect();
        let split = cleaned.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = cleaned.split_at(split);
        let col = column_index(letters)?;
        let row = digits.parse().ok()?;
        Self::new(row, col)
    }

    pub fn a1(&self) -> String {
        format!("{}{}", column_letters(self.col), self.row)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.a1())
    }
}

/// 1-based index of a column name ("A" -> 1, "AA" -> 27).
pub fn column_index(letters: &str) -> Option<u32> {
    let letters = letters.trim();
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let mut idx: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        idx = idx * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    (idx <= MAX_COLS).then_some(idx)
}

pub fn column_letters(mut col: u32) -> String {
    let mut out = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        out.push((b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    out.iter().rev().collect()
}

/// What became of one additive write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellWrite {
    Written { previous: f64, current: f64 },
    /// The cell held text; it was read as zero and overwritten.
    ReplacedNonNumeric { previous: String, current: f64 },
    /// Missing sheet, or an address outside the sheet. The count is dropped.
    AddressNotFound { reason: String },
    /// The cell holds a formula, which is kept. The count is dropped.
    Locked { formula: String },
}

impl CellWrite {
    pub fn is_dropped(&self) -> bool {
        matches!(self, CellWrite::AddressNotFound { .. } | CellWrite::Locked { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    cells: BTreeMap<CellRef, CellValue>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: BTreeMap::new(),
        }
    }

    pub fn get(&self, cell: CellRef) -> Option<&CellValue> {
        self.cells.get(&cell)
    }

    pub fn set(&mut self, cell: CellRef, value: CellValue) {
        self.cells.insert(cell, value);
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &CellValue)> {
        self.cells.iter().map(|(k, v)| (*k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// The report being filled: ordered sheets of sparse cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportGrid {
    sheets: Vec<Sheet>,
}

impl ReportGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a sheet by name, appending an empty one if it does not exist yet.
    pub fn add_sheet(&mut self, name: &str) -> &mut Sheet {
        let idx = match self.sheets.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.sheets.push(Sheet::new(name));
                self.sheets.len() - 1
            }
        };
        &mut self.sheets[idx]
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn read(&self, sheet: &str, cell: CellRef) -> Option<&CellValue> {
        self.sheet(sheet)?.get(cell)
    }

    /// Numeric reading of a cell, zero when absent.
    pub fn number(&self, sheet: &str, cell: CellRef) -> Option<f64> {
        match self.read(sheet, cell) {
            Some(value) => value.as_number(),
            None => Some(0.0),
        }
    }

    /// Write-once: set a cell, creating the sheet if needed.
    pub fn set(&mut self, sheet: &str, cell: CellRef, value: CellValue) {
        self.add_sheet(sheet).set(cell, value);
    }

    /// Additive write: add `n` to whatever the cell holds.
    ///
    /// `row` is signed because computed rows (base row plus offset) can fall
    /// below the sheet; such rows are reported as `AddressNotFound`.
    pub fn add(&mut self, sheet: &str, row: i64, col: u32, n: f64) -> CellWrite {
        let Some(target) = self.sheet_mut(sheet) else {
            return CellWrite::AddressNotFound {
                reason: format!("sheet '{sheet}' does not exist"),
            };
        };
        let cell = u32::try_from(row).ok().and_then(|r| CellRef::new(r, col));
        let Some(cell) = cell else {
            return CellWrite::AddressNotFound {
                reason: format!("row {row}, column {col} is outside the sheet"),
            };
        };

        match target.get(cell) {
            Some(CellValue::Formula(formula)) => CellWrite::Locked {
                formula: formula.clone(),
            },
            Some(value) => match value.as_number() {
                Some(previous) => {
                    let current = previous + n;
                    target.set(cell, CellValue::Number(current));
                    CellWrite::Written { previous, current }
                }
                None => {
                    let previous = value.to_string();
                    target.set(cell, CellValue::Number(n));
                    CellWrite::ReplacedNonNumeric {
                        previous,
                        current: n,
                    }
                }
            },
            None => {
                target.set(cell, CellValue::Number(n));
                CellWrite::Written {
                    previous: 0.0,
                    current: n,
                }
            }
        }
    }
}
