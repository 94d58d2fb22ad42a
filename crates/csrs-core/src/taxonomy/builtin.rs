use super::parse_taxonomy_str;
use super::schema::TaxonomyDef;
use crate::error::CsrsError;

const MONTHLY_RETURN_JSON: &str = include_str!("../../../../rules/offense-taxonomy.json");

/// Available predefined taxonomies.
pub const PRESETS: &[&str] = &["monthly-return"];

/// Preset used when neither a preset nor a taxonomy file is given.
pub const DEFAULT_PRESET: &str = "monthly-return";

/// Load a predefined taxonomy by name.
pub fn load_preset(name: &str) -> Result<TaxonomyDef, CsrsError> {
    match name {
        "monthly-return" => parse_taxonomy_str(MONTHLY_RETURN_JSON),
        _ => Err(CsrsError::TaxonomyInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}
