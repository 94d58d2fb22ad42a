use crate::classify::outcome::{Classification, MatchSource, StatutoryClassification};
use crate::model::OffenseCategory;
use crate::taxonomy::schema::{KeywordRuleDef, TaxonomyDef};

/// Normalize free text for keyword matching.
///
/// Trims, collapses internal whitespace, uppercases, and pads with one space
/// on each side so that word-boundary keywords such as `" PC "` can match at
/// the start or end of the text.
pub fn normalize_text(raw: &str) -> String {
    let words: Vec<&str> = raw.split_whitespace().collect();
    if words.is_empty() {
        return String::new();
    }
    format!(" {} ", words.join(" ").to_uppercase())
}

/// Classify a charge into a category and report row.
///
/// Evaluation order, first match wins:
/// 1. police/government complainant (without "MINOR") -> lawful authority
/// 2. charge keyword rules in taxonomy order
/// 3. fallback row (OTHERS)
///
/// A blank charge always yields the fallback row.
pub fn classify(taxonomy: &TaxonomyDef, charge: &str, complainant: &str) -> Classification {
    let charge = normalize_text(charge);
    if charge.is_empty() {
        return fallback(taxonomy);
    }

    let complainant = normalize_text(complainant);
    if is_authority_complainant(taxonomy, &complainant) {
        return authority_override(taxonomy, &charge);
    }

    match first_match(&taxonomy.rules, &charge) {
        Some(rule) => resolve(taxonomy, rule.row, MatchSource::Rule {
            id: rule.id.clone(),
        }),
        None => fallback(taxonomy),
    }
}

/// Classify a charge into a statutory-offense row.
pub fn classify_statutory(taxonomy: &TaxonomyDef, charge: &str) -> StatutoryClassification {
    let charge = normalize_text(charge);
    let statutory = &taxonomy.statutory;

    let (row, rule) = if charge.is_empty() {
        (statutory.fallback_row, None)
    } else {
        match first_match(&statutory.rules, &charge) {
            Some(rule) => (rule.row, Some(rule.id.clone())),
            None => (statutory.fallback_row, None),
        }
    };

    let label = taxonomy
        .statutory_row(row)
        .map(|r| r.label.clone())
        .unwrap_or_default();

    StatutoryClassification { row, label, rule }
}

fn first_match<'a>(rules: &'a [KeywordRuleDef], text: &str) -> Option<&'a KeywordRuleDef> {
    rules.iter().find(|rule| rule.matches(text))
}

fn is_authority_complainant(taxonomy: &TaxonomyDef, complainant: &str) -> bool {
    if complainant.is_empty() {
        return false;
    }
    let ov = &taxonomy.authority_override;
    ov.complainant_any
        .iter()
        .any(|k| complainant.contains(k.as_str()))
        && !ov
            .complainant_none
            .iter()
            .any(|k| complainant.contains(k.as_str()))
}

fn authority_override(taxonomy: &TaxonomyDef, charge: &str) -> Classification {
    let ov = &taxonomy.authority_override;

    if let Some(rule) = first_match(&ov.subtypes, charge) {
        return resolve(taxonomy, rule.row, MatchSource::AuthorityOverride {
            rule: Some(rule.id.clone()),
        });
    }

    // A lawful-authority charge rule is still more specific than the default row.
    let authority_rule = taxonomy.rules.iter().find(|rule| {
        taxonomy
            .row(rule.row)
            .is_some_and(|r| r.category == OffenseCategory::LawfulAuthority)
            && rule.matches(charge)
    });
    match authority_rule {
        Some(rule) => resolve(taxonomy, rule.row, MatchSource::AuthorityOverride {
            rule: Some(rule.id.clone()),
        }),
        None => resolve(
            taxonomy,
            ov.default_row,
            MatchSource::AuthorityOverride { rule: None },
        ),
    }
}

fn fallback(taxonomy: &TaxonomyDef) -> Classification {
    resolve(taxonomy, taxonomy.fallback_row, MatchSource::Fallback)
}

fn resolve(taxonomy: &TaxonomyDef, row: u32, matched_by: MatchSource) -> Classification {
    // Validation guarantees every referenced row exists.
    let (category, label) = taxonomy
        .row(row)
        .map(|r| (r.category, r.label.clone()))
        .unwrap_or((OffenseCategory::Others, String::new()));

    Classification {
        category,
        row,
        label,
        matched_by,
    }
}
