use csrs_core::classify::{classify, classify_statutory};
use serde::Serialize;
use std::path::PathBuf;

use super::resolve_taxonomy;
use crate::config::CliConfig;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Decision {
    classification: csrs_core::classify::Classification,
    statutory: csrs_core::classify::StatutoryClassification,
}

pub fn run(
    charge: &str,
    complainant: &str,
    taxonomy: Option<PathBuf>,
    config: &CliConfig,
    output_format: &str,
) -> Result<(), CliError> {
    let taxonomy = resolve_taxonomy(taxonomy, config)?;
    let decision = Decision {
        classification: classify(&taxonomy, charge, complainant),
        statutory: classify_statutory(&taxonomy, charge),
    };

    match output_format {
        "json" => output::json::print(&decision)?,
        _ => output::table::print_classification(&decision.classification, &decision.statutory),
    }
    Ok(())
}
