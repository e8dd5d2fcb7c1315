//! Error types for loading and exporting consumption data.
//!
//! Malformed numeric fields and empty filter results are not errors; they are
//! handled by coercion and by empty views respectively.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Failed to load dataset at {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown field: '{0}'")]
    UnknownField(String),

    #[error("No data loaded")]
    NoData,
}

pub type Result<T> = std::result::Result<T, DashboardError>;
