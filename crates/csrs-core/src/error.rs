use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CsrsError {
    #[error("{source_name}: required column '{column}' not found in header row")]
    MissingColumn { source_name: String, column: String },

    #[error("failed to read input table: {0}")]
    InputRead(String),

    #[error("failed to read report template: {0}")]
    TemplateRead(String),

    #[error("failed to load taxonomy from {path}: {reason}")]
    TaxonomyLoad { path: PathBuf, reason: String },

    #[error("invalid taxonomy: {0}")]
    TaxonomyInvalid(String),

    #[error("failed to load report layout from {path}: {reason}")]
    LayoutLoad { path: PathBuf, reason: String },

    #[error("invalid report layout: {0}")]
    LayoutInvalid(String),

    #[error("invalid reporting period: {0}")]
    InvalidPeriod(String),

    #[error("none of the {count} input file(s) could be loaded")]
    NoUsableInput { count: usize },

    #[error("failed to export workbook: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
