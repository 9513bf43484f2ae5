use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a whole load. Problems with individual rows are
/// tallied in `LoadReport` instead.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read CSV headers: {0}")]
    Headers(#[source] csv::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ForecastError>;
