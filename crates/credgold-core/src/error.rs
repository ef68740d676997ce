//! Pipeline error types

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while computing or persisting a gold partition
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required silver partition does not exist
    #[error("Source partition not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// None of the optional feature sources exist for the date
    #[error("No feature sources available for {snapshot_date}")]
    NoFeatureSources { snapshot_date: String },

    /// The joined feature table has zero rows
    #[error("Empty dataset for {snapshot_date}")]
    EmptyDataset { snapshot_date: String },

    /// Snapshot date string is not `YYYY-MM-DD`
    #[error("Invalid snapshot date: {0}")]
    InvalidSnapshotDate(String),

    /// A column the computation needs is absent
    #[error("Missing column: {column}")]
    MissingColumn { column: String },

    /// Category mapping could not be loaded or applied
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataframe error: {0}")]
    Polars(#[from] PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_not_found_display() {
        let err = PipelineError::SourceNotFound {
            path: PathBuf::from("silver/loans/silver_loans_2023_07_01.parquet"),
        };

        assert_eq!(
            err.to_string(),
            "Source partition not found: silver/loans/silver_loans_2023_07_01.parquet"
        );
    }

    #[test]
    fn test_no_sources_and_empty_are_distinct() {
        let none = PipelineError::NoFeatureSources {
            snapshot_date: "2023-07-01".to_string(),
        };
        let empty = PipelineError::EmptyDataset {
            snapshot_date: "2023-07-01".to_string(),
        };

        assert_eq!(none.to_string(), "No feature sources available for 2023-07-01");
        assert_eq!(empty.to_string(), "Empty dataset for 2023-07-01");
    }

    #[test]
    fn test_io_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PipelineError = io_error.into();

        assert!(err.to_string().contains("I/O error"));
    }
}
