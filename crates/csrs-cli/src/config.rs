use std::env;
use std::path::PathBuf;

/// Settings read from the environment (and an optional `.env` file).
///
/// Command-line flags take precedence over every value here.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub log_level: String,
    /// Custom taxonomy used instead of the built-in preset.
    pub taxonomy: Option<PathBuf>,
    /// Custom report layout used instead of the built-in preset.
    pub layout: Option<PathBuf>,
}

impl CliConfig {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let log_level = env::var("CSRS_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());

        Self {
            log_level,
            taxonomy: path_var("CSRS_TAXONOMY"),
            layout: path_var("CSRS_LAYOUT"),
        }
    }
}

fn path_var(name: &str) -> Option<PathBuf> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
