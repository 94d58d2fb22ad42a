use crate::model::OffenseCategory;
use serde::{Deserialize, Serialize};

/// The offense taxonomy of a statistical return: named rows and the ordered
/// keyword rules that map charge text onto them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    pub categories: Vec<CategoryDef>,
    /// Every offense row of the return, in report order.
    pub rows: Vec<OffenseRowDef>,
    pub authority_override: AuthorityOverrideDef,
    /// Charge rules, evaluated in order. The first match wins.
    pub rules: Vec<KeywordRuleDef>,
    /// Row used when no rule matches. Must belong to OTHERS.
    pub fallback_row: u32,
    pub statutory: StatutoryDef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDef {
    pub category: OffenseCategory,
    /// Row carrying the category heading on the return.
    pub header_row: u32,
    /// Row for offenses of this category that no specific rule names.
    pub catch_all_row: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffenseRowDef {
    pub row: u32,
    pub category: OffenseCategory,
    pub label: String,
}

/// Complainant-driven rule that files a charge under lawful authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityOverrideDef {
    /// Complainant keywords denoting police or government complainants.
    pub complainant_any: Vec<String>,
    /// Complainant keywords that cancel the override (e.g. "MINOR").
    #[serde(default)]
    pub complainant_none: Vec<String>,
    /// Charge-based refinements, evaluated in order.
    #[serde(default)]
    pub subtypes: Vec<KeywordRuleDef>,
    pub default_row: u32,
}

/// A keyword predicate over normalized text, pointing at a report row.
///
/// Matches when every `all` keyword is present, at least one `any` keyword is
/// present (if any are listed), and no `none` keyword is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRuleDef {
    pub id: String,
    pub row: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub none: Vec<String>,
}

impl KeywordRuleDef {
    /// `text` must already be normalized (see `classify::normalize_text`).
    pub fn matches(&self, text: &str) -> bool {
        self.all.iter().all(|k| text.contains(k.as_str()))
            && (self.any.is_empty() || self.any.iter().any(|k| text.contains(k.as_str())))
            && !self.none.iter().any(|k| text.contains(k.as_str()))
    }

    pub fn keywords_mut(&mut self) -> impl Iterator<Item = &mut String> {
        self.any
            .iter_mut()
            .chain(self.all.iter_mut())
            .chain(self.none.iter_mut())
    }
}

/// Secondary classification into regulatory-offense rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatutoryDef {
    pub rows: Vec<StatutoryRowDef>,
    pub rules: Vec<KeywordRuleDef>,
    pub fallback_row: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatutoryRowDef {
    pub row: u32,
    pub label: String,
}

impl TaxonomyDef {
    pub fn row(&self, row: u32) -> Option<&OffenseRowDef> {
        self.rows.iter().find(|r| r.row == row)
    }

    pub fn category_def(&self, category: OffenseCategory) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| c.category == category)
    }

    pub fn statutory_row(&self, row: u32) -> Option<&StatutoryRowDef> {
        self.statutory.rows.iter().find(|r| r.row == row)
    }

    /// Rows of one category, in report order.
    pub fn rows_of(&self, category: OffenseCategory) -> impl Iterator<Item = &OffenseRowDef> {
        self.rows.iter().filter(move |r| r.category == category)
    }
}
