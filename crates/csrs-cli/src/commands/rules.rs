use csrs_core::report::{self, LAYOUT_PRESETS};
use csrs_core::taxonomy::builtin;
use csrs_core::taxonomy::schema::KeywordRuleDef;
use std::path::Path;

use crate::error::CliError;

pub fn list() -> Result<(), CliError> {
    println!("Available taxonomies:\n");
    for name in builtin::PRESETS {
        let tx = builtin::load_preset(name)?;
        println!("  {:<16} {} (v{})", name, tx.name, tx.version);
        if let Some(ref desc) = tx.description {
            println!("                   {}", desc);
        }
        println!(
            "                   {} offense rows, {} rules, {} statutory rows",
            tx.rows.len(),
            tx.rules.len(),
            tx.statutory.rows.len()
        );
        println!();
    }

    println!("Available report layouts:\n");
    for name in LAYOUT_PRESETS {
        let layout = report::load_layout_preset(name)?;
        println!("  {:<16} {} (v{})", name, layout.name, layout.version);
        println!("                   sheets: {}", layout.sheet_names().join(", "));
        println!();
    }
    Ok(())
}

pub fn explain(preset: &str) -> Result<(), CliError> {
    let tx = builtin::load_preset(preset)?;

    println!("{} (version {})\n", tx.name, tx.version);
    if let Some(ref desc) = tx.description {
        println!("{}\n", desc);
    }

    println!("Rules are checked top to bottom; the first match decides the row.\n");

    let ov = &tx.authority_override;
    println!("1. Police/government complainant");
    println!("   complainant contains any of: {}", quoted(&ov.complainant_any));
    if !ov.complainant_none.is_empty() {
        println!("   and none of: {}", quoted(&ov.complainant_none));
    }
    for rule in &ov.subtypes {
        println!("   {}", describe(rule, row_label(&tx, rule.row)));
    }
    println!(
        "   otherwise -> row {} {}\n",
        ov.default_row,
        row_label(&tx, ov.default_row)
    );

    println!("2. Charge rules");
    let width = tx.rules.iter().map(|r| r.id.len()).max().unwrap_or(10);
    for rule in &tx.rules {
        println!(
            "   {:<width$}  {}",
            rule.id,
            describe(rule, row_label(&tx, rule.row)),
            width = width
        );
    }
    println!();

    println!(
        "3. No match -> row {} {}\n",
        tx.fallback_row,
        row_label(&tx, tx.fallback_row)
    );

    println!("Rows:");
    for category in &tx.categories {
        println!("  {:>3}  {}", category.header_row, category.category);
        for row in tx.rows_of(category.category) {
            println!("  {:>3}    {}", row.row, row.label);
        }
    }
    println!();

    println!("Statutory section (convictions only):");
    for rule in &tx.statutory.rules {
        let label = tx
            .statutory_row(rule.row)
            .map(|r| r.label.as_str())
            .unwrap_or("?");
        println!("   {}", describe(rule, label));
    }
    let fallback = tx
        .statutory_row(tx.statutory.fallback_row)
        .map(|r| r.label.as_str())
        .unwrap_or("?");
    println!("   otherwise -> row {} {}", tx.statutory.fallback_row, fallback);
    println!();

    Ok(())
}

fn row_label(tx: &csrs_core::taxonomy::schema::TaxonomyDef, row: u32) -> &str {
    tx.row(row).map(|r| r.label.as_str()).unwrap_or("?")
}

fn quoted(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|k| format!("\"{}\"", k))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe(rule: &KeywordRuleDef, label: &str) -> String {
    let mut parts = Vec::new();
    if !rule.all.is_empty() {
        parts.push(format!("all of {}", quoted(&rule.all)));
    }
    if !rule.any.is_empty() {
        parts.push(format!("any of {}", quoted(&rule.any)));
    }
    if !rule.none.is_empty() {
        parts.push(format!("none of {}", quoted(&rule.none)));
    }
    format!("{} -> row {} {}", parts.join(", "), rule.row, label)
}

pub fn schema() -> Result<(), CliError> {
    print!(
        r#"JSON Taxonomy Schema
====================

A taxonomy file defines the offense rows of the return and the ordered
keyword rules that map a charge onto them. Keywords are matched as
substrings of the upper-cased charge/complainant text, padded with one
space on each side, so " PC " only matches the whole word PC.

Top-level fields:
  name          (string, required)  Human-readable name
  description   (string, optional)  What this taxonomy is for
  version       (string, required)  Version identifier (e.g., "2025.1")
  categories    (array, required)   One entry per category:
                                      category       "AGAINST LAWFUL AUTHORITY",
                                                     "AGAINST PUBLIC MORALITY",
                                                     "AGAINST THE PERSON",
                                                     "AGAINST PROPERTY" or "OTHERS"
                                      header_row     row of the category heading
                                      catch_all_row  row for unnamed offenses
  rows          (array, required)   Offense rows: row, category, label
  authority_override
                (object, required)  complainant_any  keywords of police or
                                                     government complainants
                                    complainant_none keywords cancelling it
                                    subtypes         rules refining the row
                                    default_row      lawful-authority row
  rules         (array, required)   Charge rules, checked in order
  fallback_row  (number, required)  OTHERS row used when nothing matches
  statutory     (object, required)  rows, rules and fallback_row of the
                                    statutory section

Each rule:
  id            (string, required)  Unique name, shown by `csrs classify`
  row           (number, required)  Row the rule files a charge under
  all           (array, optional)   Every keyword must be present
  any           (array, optional)   At least one keyword must be present
  none          (array, optional)   No keyword may be present
  A rule needs at least one "all" or "any" keyword.

Example:
{{
  "name": "My return",
  "version": "1.0",
  "categories": [
    {{ "category": "AGAINST LAWFUL AUTHORITY", "header_row": 8, "catch_all_row": 9 }},
    {{ "category": "AGAINST PUBLIC MORALITY", "header_row": 10, "catch_all_row": 11 }},
    {{ "category": "AGAINST THE PERSON", "header_row": 12, "catch_all_row": 14 }},
    {{ "category": "AGAINST PROPERTY", "header_row": 15, "catch_all_row": 17 }},
    {{ "category": "OTHERS", "header_row": 18, "catch_all_row": 19 }}
  ],
  "rows": [
    {{ "row": 9, "category": "AGAINST LAWFUL AUTHORITY", "label": "Against lawful authority" }},
    {{ "row": 11, "category": "AGAINST PUBLIC MORALITY", "label": "Against public morality" }},
    {{ "row": 13, "category": "AGAINST THE PERSON", "label": "Murder" }},
    {{ "row": 14, "category": "AGAINST THE PERSON", "label": "Other offences against the person" }},
    {{ "row": 16, "category": "AGAINST PROPERTY", "label": "Theft" }},
    {{ "row": 17, "category": "AGAINST PROPERTY", "label": "Other offences against property" }},
    {{ "row": 19, "category": "OTHERS", "label": "Other offences" }}
  ],
  "authority_override": {{
    "complainant_any": ["POLICE", " PC "],
    "complainant_none": ["MINOR"],
    "default_row": 9
  }},
  "rules": [
    {{ "id": "murder", "row": 13, "any": ["MURDER"], "none": ["ATTEMPT"] }},
    {{ "id": "theft", "row": 16, "any": ["THEFT", "STEAL"] }}
  ],
  "fallback_row": 19,
  "statutory": {{
    "rows": [{{ "row": 6, "label": "Other" }}],
    "rules": [],
    "fallback_row": 6
  }}
}}

Report layouts (sheet names and columns) are separate documents; see
`csrs rules list` for the built-in one.
"#
    );
    Ok(())
}

pub fn validate(file: &Path, layout: bool) -> Result<(), CliError> {
    if layout {
        let layout = report::load_layout(file)?;
        println!("Layout '{}' (v{}) is valid.", layout.name, layout.version);
        println!("  Sheets: {}", layout.sheet_names().join(", "));
        return Ok(());
    }

    let tx = csrs_core::taxonomy::load_taxonomy(file)?;
    println!("Taxonomy '{}' (v{}) is valid.", tx.name, tx.version);
    println!("  Rows: {}", tx.rows.len());
    println!("  Rules: {}", tx.rules.len());

    // Potential issues (warnings, not errors)
    let mut warnings = Vec::new();
    for row in &tx.rows {
        let targeted = tx.rules.iter().any(|r| r.row == row.row)
            || tx.authority_override.subtypes.iter().any(|r| r.row == row.row)
            || tx.authority_override.default_row == row.row
            || tx.fallback_row == row.row;
        if !targeted {
            warnings.push(format!("row {} '{}' is not targeted by any rule", row.row, row.label));
        }
    }
    for (i, rule) in tx.rules.iter().enumerate() {
        if let Some(earlier) = tx.rules[..i].iter().find(|earlier| shadows(earlier, rule)) {
            warnings.push(format!(
                "rule '{}' can never match: every keyword is caught by earlier rule '{}'",
                rule.id, earlier.id
            ));
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}

/// An unconditional `any` rule shadows a later `any`-only rule when each of the
/// later rule's keywords contains one of its own.
fn shadows(earlier: &KeywordRuleDef, later: &KeywordRuleDef) -> bool {
    earlier.all.is_empty()
        && earlier.none.is_empty()
        && later.all.is_empty()
        && !later.any.is_empty()
        && later
            .any
            .iter()
            .all(|k| earlier.any.iter().any(|e| k.contains(e.as_str())))
}
