pub mod classify;
pub mod fill;
pub mod preview;
pub mod rules;
pub mod summary;

use csrs_core::model::{CountMode, ReportPeriod};
use csrs_core::report::{self, ReportLayout};
use csrs_core::taxonomy::{self, builtin, schema::TaxonomyDef};
use std::path::PathBuf;
use tracing::debug;

use crate::config::CliConfig;
use crate::error::CliError;

/// Taxonomy from the flag, else from CSRS_TAXONOMY, else the built-in preset.
pub fn resolve_taxonomy(
    flag: Option<PathBuf>,
    config: &CliConfig,
) -> Result<TaxonomyDef, CliError> {
    match flag.or_else(|| config.taxonomy.clone()) {
        Some(path) => {
            debug!(path = %path.display(), "loading custom taxonomy");
            Ok(taxonomy::load_taxonomy(&path)?)
        }
        None => Ok(builtin::load_preset(builtin::DEFAULT_PRESET)?),
    }
}

/// Layout from the flag, else from CSRS_LAYOUT, else the built-in preset.
pub fn resolve_layout(flag: Option<PathBuf>, config: &CliConfig) -> Result<ReportLayout, CliError> {
    match flag.or_else(|| config.layout.clone()) {
        Some(path) => {
            debug!(path = %path.display(), "loading custom layout");
            Ok(report::load_layout(&path)?)
        }
        None => Ok(report::load_layout_preset(report::DEFAULT_LAYOUT)?),
    }
}

pub fn parse_mode(mode: &str) -> Result<CountMode, CliError> {
    CountMode::from_str_loose(mode).ok_or_else(|| {
        CliError::Usage(format!("unknown mode '{mode}'. Use 'new' or 'disposed'"))
    })
}

pub fn parse_period(year: i32, month: Option<u32>, full_year: bool) -> Result<ReportPeriod, CliError> {
    match (month, full_year) {
        (_, true) => Ok(ReportPeriod::year(year)),
        (Some(month), false) => Ok(ReportPeriod::month(year, month)?),
        (None, false) => Err(CliError::Usage(
            "give either --month or --full-year".into(),
        )),
    }
}
