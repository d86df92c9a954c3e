//! Error types for the lineage-summary crate.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid abundance value '{value}' at {path}:{line}")]
    InvalidAbundance {
        path: PathBuf,
        line: usize,
        value: String,
    },

    #[error("Invalid depth value '{value}' at {path}:{line}")]
    InvalidDepth {
        path: PathBuf,
        line: usize,
        value: String,
    },

    #[error("Cannot derive a timepoint from file name '{0}': expected '<name>-<timepoint>.<ext>'")]
    TimepointFromName(String),

    #[error("Invalid value '{value}' for metadata column '{column}': {reason}")]
    InvalidMetadataValue {
        column: String,
        value: String,
        reason: String,
    },

    #[error("Missing column '{column}' in {path}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("Malformed stat file {path}: expected '<label>=<value>' on the first line")]
    MalformedStat { path: PathBuf },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, SummaryError>;
