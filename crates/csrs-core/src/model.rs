use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CsrsError;

/// Top-level offense grouping of the statistical return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OffenseCategory {
    #[serde(rename = "AGAINST LAWFUL AUTHORITY")]
    LawfulAuthority,
    #[serde(rename = "AGAINST PUBLIC MORALITY")]
    PublicMorality,
    #[serde(rename = "AGAINST THE PERSON")]
    Person,
    #[serde(rename = "AGAINST PROPERTY")]
    Property,
    #[serde(rename = "OTHERS")]
    Others,
}

impl OffenseCategory {
    /// Categories in the order they appear on the return.
    pub const ALL: [OffenseCategory; 5] = [
        OffenseCategory::LawfulAuthority,
        OffenseCategory::PublicMorality,
        OffenseCategory::Person,
        OffenseCategory::Property,
        OffenseCategory::Others,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OffenseCategory::LawfulAuthority => "AGAINST LAWFUL AUTHORITY",
            OffenseCategory::PublicMorality => "AGAINST PUBLIC MORALITY",
            OffenseCategory::Person => "AGAINST THE PERSON",
            OffenseCategory::Property => "AGAINST PROPERTY",
            OffenseCategory::Others => "OTHERS",
        }
    }
}

impl fmt::Display for OffenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A date cell after best-effort parsing.
///
/// Unparseable input is kept as such and never defaulted to a real date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CaseDate {
    #[default]
    Absent,
    Unparseable(String),
    Valid(NaiveDate),
}

impl CaseDate {
    pub fn valid(&self) -> Option<NaiveDate> {
        match self {
            CaseDate::Valid(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for CaseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseDate::Absent => Ok(()),
            CaseDate::Unparseable(raw) => write!(f, "unparseable ({raw})"),
            CaseDate::Valid(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Unknown];
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One normalized row of court data: a single person/charge within a case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseRecord {
    /// File the row was read from, for the audit trail.
    pub source: String,
    /// Case identifier. Shared by every charge row of the same case.
    pub case_id: String,
    pub charge: String,
    pub complainant: String,
    pub arraignment_date: CaseDate,
    pub disposal_date: CaseDate,
    pub age: Option<u32>,
    pub gender: Gender,
    pub remark: String,
    pub sentence: String,
    pub status: String,
}

/// Which side of the return a run fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CountMode {
    /// Cases arraigned in the period.
    New,
    /// Cases disposed of in the period.
    Disposed,
}

impl CountMode {
    pub fn from_str_loose(s: &str) -> Option<CountMode> {
        match s.trim().to_lowercase().as_str() {
            "new" | "n" | "arraigned" => Some(CountMode::New),
            "disposed" | "d" | "concluded" => Some(CountMode::Disposed),
            _ => None,
        }
    }

    /// The date a row is filtered on in this mode.
    pub fn date_of<'a>(&self, record: &'a CaseRecord) -> &'a CaseDate {
        match self {
            CountMode::New => &record.arraignment_date,
            CountMode::Disposed => &record.disposal_date,
        }
    }
}

impl fmt::Display for CountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountMode::New => write!(f, "NEW"),
            CountMode::Disposed => write!(f, "DISPOSED"),
        }
    }
}

/// Reporting period: one calendar month, or a whole year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub month: u32,
    pub year: i32,
    pub full_year: bool,
}

impl ReportPeriod {
    pub fn month(year: i32, month: u32) -> Result<Self, CsrsError> {
        if !(1..=12).contains(&month) {
            return Err(CsrsError::InvalidPeriod(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self {
            month,
            year,
            full_year: false,
        })
    }

    pub fn year(year: i32) -> Self {
        Self {
            month: 1,
            year,
            full_year: true,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && (self.full_year || date.month() == self.month)
    }

    /// Whether the row's `mode` date is a valid date inside the period.
    pub fn includes(&self, record: &CaseRecord, mode: CountMode) -> bool {
        mode.date_of(record).valid().is_some_and(|d| self.contains(d))
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.full_year {
            write!(f, "{}", self.year)
        } else {
            write!(f, "{}-{:02}", self.year, self.month)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_contains_month() {
        let p = ReportPeriod::month(2025, 3).unwrap();
        assert!(p.contains(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()));
        assert!(!p.contains(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()));
        assert!(!p.contains(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
    }

    #[test]
    fn test_period_full_year() {
        let p = ReportPeriod::year(2025);
        assert!(p.contains(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(p.contains(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
        assert!(!p.contains(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    }

    #[test]
    fn test_period_includes_uses_mode_date() {
        let p = ReportPeriod::month(2025, 4).unwrap();
        let record = CaseRecord {
            arraignment_date: CaseDate::Valid(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()),
            disposal_date: CaseDate::Valid(NaiveDate::from_ymd_opt(2025, 4, 20).unwrap()),
            ..Default::default()
        };
        assert!(!p.includes(&record, CountMode::New));
        assert!(p.includes(&record, CountMode::Disposed));

        let unparseable = CaseRecord {
            disposal_date: CaseDate::Unparseable("April-ish".into()),
            ..Default::default()
        };
        assert!(!p.includes(&unparseable, CountMode::Disposed));
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!(ReportPeriod::month(2025, 0).is_err());
        assert!(ReportPeriod::month(2025, 13).is_err());
    }

    #[test]
    fn test_category_serde_uses_report_labels() {
        let json = serde_json::to_string(&OffenseCategory::Person).unwrap();
        assert_eq!(json, "\"AGAINST THE PERSON\"");
        let back: OffenseCategory = serde_json::from_str("\"OTHERS\"").unwrap();
        assert_eq!(back, OffenseCategory::Others);
    }

    #[test]
    fn test_mode_from_str_loose() {
        assert_eq!(CountMode::from_str_loose(" New "), Some(CountMode::New));
        assert_eq!(CountMode::from_str_loose("DISPOSED"), Some(CountMode::Disposed));
        assert_eq!(CountMode::from_str_loose("pending"), None);
    }
}
