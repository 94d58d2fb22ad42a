use std::collections::HashMap;
use std::fmt;

/// Logical columns of a normalized court-data table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalColumn {
    CaseId,
    Charge,
    Complainant,
    ArraignmentDate,
    DisposalDate,
    Age,
    Gender,
    Remark,
    Sentence,
    Status,
}

impl LogicalColumn {
    pub const ALL: [LogicalColumn; 10] = [
        LogicalColumn::CaseId,
        LogicalColumn::Charge,
        LogicalColumn::Complainant,
        LogicalColumn::ArraignmentDate,
        LogicalColumn::DisposalDate,
        LogicalColumn::Age,
        LogicalColumn::Gender,
        LogicalColumn::Remark,
        LogicalColumn::Sentence,
        LogicalColumn::Status,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LogicalColumn::CaseId => "CaseID",
            LogicalColumn::Charge => "Charge",
            LogicalColumn::Complainant => "Complainant",
            LogicalColumn::ArraignmentDate => "ArraignmentDate",
            LogicalColumn::DisposalDate => "DisposalDate",
            LogicalColumn::Age => "Age",
            LogicalColumn::Gender => "Gender",
            LogicalColumn::Remark => "Remark",
            LogicalColumn::Sentence => "Sentence",
            LogicalColumn::Status => "Status",
        }
    }

    /// Accepted header spellings, already in `normalize_header` form.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            LogicalColumn::CaseId => &[
                "caseid", "caseno", "casenumber", "case", "docketno", "docketnumber",
                "fileno", "filenumber",
            ],
            LogicalColumn::Charge => &[
                "charge", "charges", "offence", "offense", "offences", "offenses",
                "description", "chargedescription", "offencedescription", "natureofoffence",
            ],
            LogicalColumn::Complainant => &[
                "complainant", "victim", "victimcomplainant", "complainantvictim",
                "complainantname", "victimname",
            ],
            LogicalColumn::ArraignmentDate => &[
                "arraignmentdate", "arraignment", "arraigned", "datearraigned",
                "dateofarraignment", "datecharged", "firsthearingdate",
            ],
            LogicalColumn::DisposalDate => &[
                "disposaldate", "disposeddate", "datedisposed", "dateofdisposal",
                "conclusiondate", "dateconcluded", "concluded", "dateofconclusion",
            ],
            LogicalColumn::Age => &["age", "defendantage", "ageofdefendant", "accusedage"],
            LogicalColumn::Gender => &["gender", "sex", "defendantgender", "defendantsex"],
            LogicalColumn::Remark => &[
                "remark", "remarks", "outcome", "result", "disposition", "verdict",
            ],
            LogicalColumn::Sentence => &[
                "sentence", "furtherparticulars", "particulars", "penalty",
            ],
            LogicalColumn::Status => &["status", "casestatus"],
        }
    }
}

impl fmt::Display for LogicalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercase a header and drop everything but letters and digits,
/// so "Case No.", "case_no" and "CASE NO" all read as "caseno".
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Position of each logical column in a header row.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    indices: HashMap<LogicalColumn, usize>,
}

impl ColumnMap {
    /// Map headers onto logical columns. The first header matching an alias wins.
    pub fn resolve(headers: &[String]) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let mut indices = HashMap::new();
        for column in LogicalColumn::ALL {
            let aliases = column.aliases();
            if let Some(idx) = normalized.iter().position(|h| aliases.contains(&h.as_str())) {
                indices.insert(column, idx);
            }
        }
        Self { indices }
    }

    pub fn index(&self, column: LogicalColumn) -> Option<usize> {
        self.indices.get(&column).copied()
    }

    pub fn contains(&self, column: LogicalColumn) -> bool {
        self.indices.contains_key(&column)
    }

    /// Cell text of `column` in `row`; empty when the column or cell is missing.
    pub fn get<'a>(&self, row: &'a [String], column: LogicalColumn) -> &'a str {
        self.index(column)
            .and_then(|idx| row.get(idx))
            .map(|s| s.trim())
            .unwrap_or("")
    }
}
