use crate::model::OffenseCategory;
use serde::{Deserialize, Serialize};

/// Why a charge landed on its row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchSource {
    /// The complainant is police/government; `rule` is the subtype that refined the row, if any.
    AuthorityOverride { rule: Option<String> },
    /// A charge keyword rule matched.
    Rule { id: String },
    /// Nothing matched; the catch-all row was used.
    Fallback,
}

/// Main-section classification of one charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: OffenseCategory,
    /// Report row the charge increments.
    pub row: u32,
    /// Row label from the taxonomy.
    pub label: String,
    pub matched_by: MatchSource,
}

/// Statutory-section classification of one charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryClassification {
    pub row: u32,
    pub label: String,
    /// Matching rule id, or `None` for the fallback row.
    pub rule: Option<String>,
}
