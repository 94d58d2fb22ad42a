pub mod builtin;
pub mod schema;

use crate::error::CsrsError;
use crate::model::OffenseCategory;
use schema::{KeywordRuleDef, TaxonomyDef};
use std::collections::HashSet;
use std::path::Path;

/// Load a taxonomy from a JSON file.
pub fn load_taxonomy(path: &Path) -> Result<TaxonomyDef, CsrsError> {
    let content = std::fs::read_to_string(path).map_err(|e| CsrsError::TaxonomyLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_taxonomy(&content, path)
}

/// Parse a taxonomy from a JSON string.
pub fn parse_taxonomy(json: &str, source: &Path) -> Result<TaxonomyDef, CsrsError> {
    let taxonomy: TaxonomyDef =
        serde_json::from_str(json).map_err(|e| CsrsError::TaxonomyLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    prepare(taxonomy)
}

/// Parse a taxonomy from a JSON string (no file path context).
pub fn parse_taxonomy_str(json: &str) -> Result<TaxonomyDef, CsrsError> {
    let taxonomy: TaxonomyDef = serde_json::from_str(json)?;
    prepare(taxonomy)
}

fn prepare(mut taxonomy: TaxonomyDef) -> Result<TaxonomyDef, CsrsError> {
    uppercase_keywords(&mut taxonomy);
    validate_taxonomy(&taxonomy)?;
    Ok(taxonomy)
}

/// Keywords are matched against uppercased text, so store them uppercased.
fn uppercase_keywords(taxonomy: &mut TaxonomyDef) {
    let ov = &mut taxonomy.authority_override;
    for k in ov
        .complainant_any
        .iter_mut()
        .chain(ov.complainant_none.iter_mut())
    {
        *k = k.to_uppercase();
    }
    let rules = ov
        .subtypes
        .iter_mut()
        .chain(taxonomy.rules.iter_mut())
        .chain(taxonomy.statutory.rules.iter_mut());
    for rule in rules {
        for k in rule.keywords_mut() {
            *k = k.to_uppercase();
        }
    }
}

/// Validate that a taxonomy is well-formed.
pub fn validate_taxonomy(taxonomy: &TaxonomyDef) -> Result<(), CsrsError> {
    if taxonomy.rows.is_empty() {
        return Err(CsrsError::TaxonomyInvalid("rows must not be empty".into()));
    }
    if taxonomy.rules.is_empty() {
        return Err(CsrsError::TaxonomyInvalid("rules must not be empty".into()));
    }

    let mut seen = HashSet::new();
    for row in &taxonomy.rows {
        if !seen.insert(row.row) {
            return Err(CsrsError::TaxonomyInvalid(format!(
                "row {} is defined more than once",
                row.row
            )));
        }
        if row.label.trim().is_empty() {
            return Err(CsrsError::TaxonomyInvalid(format!(
                "row {} has an empty label",
                row.row
            )));
        }
    }

    for category in OffenseCategory::ALL {
        let Some(def) = taxonomy.category_def(category) else {
            return Err(CsrsError::TaxonomyInvalid(format!(
                "category '{category}' is not defined"
            )));
        };
        match taxonomy.row(def.catch_all_row) {
            Some(row) if row.category == category => {}
            _ => {
                return Err(CsrsError::TaxonomyInvalid(format!(
                    "catch-all row {} of '{category}' is not a row of that category",
                    def.catch_all_row
                )));
            }
        }
    }

    match taxonomy.row(taxonomy.fallback_row) {
        Some(row) if row.category == OffenseCategory::Others => {}
        _ => {
            return Err(CsrsError::TaxonomyInvalid(format!(
                "fallback row {} must be an OTHERS row",
                taxonomy.fallback_row
            )));
        }
    }

    let ov = &taxonomy.authority_override;
    if ov.complainant_any.is_empty() {
        return Err(CsrsError::TaxonomyInvalid(
            "authority_override.complainant_any must not be empty".into(),
        ));
    }
    if ov
        .complainant_any
        .iter()
        .chain(ov.complainant_none.iter())
        .any(|k| k.trim().is_empty())
    {
        return Err(CsrsError::TaxonomyInvalid(
            "authority_override contains a blank keyword".into(),
        ));
    }
    let authority_row = |row: u32| {
        taxonomy
            .row(row)
            .is_some_and(|r| r.category == OffenseCategory::LawfulAuthority)
    };
    if !authority_row(ov.default_row) {
        return Err(CsrsError::TaxonomyInvalid(format!(
            "authority_override.default_row {} is not a lawful-authority row",
            ov.default_row
        )));
    }
    for rule in &ov.subtypes {
        validate_rule(rule)?;
        if !authority_row(rule.row) {
            return Err(CsrsError::TaxonomyInvalid(format!(
                "override subtype '{}' points at row {}, which is not a lawful-authority row",
                rule.id, rule.row
            )));
        }
    }

    let mut ids = HashSet::new();
    for rule in &taxonomy.rules {
        validate_rule(rule)?;
        if !ids.insert(rule.id.as_str()) {
            return Err(CsrsError::TaxonomyInvalid(format!(
                "rule id '{}' is used more than once",
                rule.id
            )));
        }
        if taxonomy.row(rule.row).is_none() {
            return Err(CsrsError::TaxonomyInvalid(format!(
                "rule '{}' references unknown row {}",
                rule.id, rule.row
            )));
        }
    }

    let statutory = &taxonomy.statutory;
    if statutory.rows.is_empty() {
        return Err(CsrsError::TaxonomyInvalid(
            "statutory.rows must not be empty".into(),
        ));
    }
    if taxonomy.statutory_row(statutory.fallback_row).is_none() {
        return Err(CsrsError::TaxonomyInvalid(format!(
            "statutory fallback row {} is not a statutory row",
            statutory.fallback_row
        )));
    }
    for rule in &statutory.rules {
        validate_rule(rule)?;
        if taxonomy.statutory_row(rule.row).is_none() {
            return Err(CsrsError::TaxonomyInvalid(format!(
                "statutory rule '{}' references unknown row {}",
                rule.id, rule.row
            )));
        }
    }

    Ok(())
}

fn validate_rule(rule: &KeywordRuleDef) -> Result<(), CsrsError> {
    if rule.id.trim().is_empty() {
        return Err(CsrsError::TaxonomyInvalid("rule id must not be empty".into()));
    }
    if rule.any.is_empty() && rule.all.is_empty() {
        return Err(CsrsError::TaxonomyInvalid(format!(
            "rule '{}' needs at least one 'any' or 'all' keyword",
            rule.id
        )));
    }
    let mut keywords = rule.any.iter().chain(&rule.all).chain(&rule.none);
    if keywords.any(|k| k.trim().is_empty()) {
        return Err(CsrsError::TaxonomyInvalid(format!(
            "rule '{}' contains a blank keyword",
            rule.id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(rules: &str, fallback_row: u32) -> String {
        format!(
            r#"{{
            "name": "Test",
            "version": "1.0",
            "categories": [
                {{ "category": "AGAINST LAWFUL AUTHORITY", "header_row": 1, "catch_all_row": 2 }},
                {{ "category": "AGAINST PUBLIC MORALITY", "header_row": 3, "catch_all_row": 4 }},
                {{ "category": "AGAINST THE PERSON", "header_row": 5, "catch_all_row": 6 }},
                {{ "category": "AGAINST PROPERTY", "header_row": 7, "catch_all_row": 8 }},
                {{ "category": "OTHERS", "header_row": 9, "catch_all_row": 10 }}
            ],
            "rows": [
                {{ "row": 2, "category": "AGAINST LAWFUL AUTHORITY", "label": "Other authority" }},
                {{ "row": 4, "category": "AGAINST PUBLIC MORALITY", "label": "Other morality" }},
                {{ "row": 6, "category": "AGAINST THE PERSON", "label": "Other person" }},
                {{ "row": 8, "category": "AGAINST PROPERTY", "label": "Theft" }},
                {{ "row": 10, "category": "OTHERS", "label": "Other offences" }}
            ],
            "authority_override": {{
                "complainant_any": ["police"],
                "complainant_none": ["minor"],
                "default_row": 2
            }},
            "rules": {rules},
            "fallback_row": {fallback_row},
            "statutory": {{
                "rows": [{{ "row": 6, "label": "Other" }}],
                "rules": [],
                "fallback_row": 6
            }}
        }}"#
        )
    }

    #[test]
    fn test_parse_valid_taxonomy_uppercases_keywords() {
        let json = minimal(r#"[{ "id": "theft", "row": 8, "any": ["theft"] }]"#, 10);
        let tx = parse_taxonomy_str(&json).unwrap();
        assert_eq!(tx.rules[0].any, vec!["THEFT"]);
        assert_eq!(tx.authority_override.complainant_any, vec!["POLICE"]);
        assert_eq!(tx.authority_override.complainant_none, vec!["MINOR"]);
    }

    #[test]
    fn test_rule_with_unknown_row_rejected() {
        let json = minimal(r#"[{ "id": "theft", "row": 99, "any": ["THEFT"] }]"#, 10);
        assert!(parse_taxonomy_str(&json).is_err());
    }

    #[test]
    fn test_rule_without_keywords_rejected() {
        let json = minimal(r#"[{ "id": "theft", "row": 8, "none": ["X"] }]"#, 10);
        assert!(parse_taxonomy_str(&json).is_err());
    }

    #[test]
    fn test_fallback_outside_others_rejected() {
        let json = minimal(r#"[{ "id": "theft", "row": 8, "any": ["THEFT"] }]"#, 8);
        assert!(parse_taxonomy_str(&json).is_err());
    }

    #[test]
    fn test_duplicate_rule_id_rejected() {
        let json = minimal(
            r#"[{ "id": "theft", "row": 8, "any": ["THEFT"] },
                { "id": "theft", "row": 8, "any": ["STEAL"] }]"#,
            10,
        );
        assert!(parse_taxonomy_str(&json).is_err());
    }

    #[test]
    fn test_blank_keyword_rejected() {
        let json = minimal(r#"[{ "id": "theft", "row": 8, "any": ["  "] }]"#, 10);
        assert!(parse_taxonomy_str(&json).is_err());
    }
}
