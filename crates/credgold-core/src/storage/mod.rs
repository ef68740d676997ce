//! Partition storage
//!
//! The pipelines only need to read one partition for a date and to replace
//! one partition for a date. `PartitionStore` is that contract; the parquet
//! backend is used in production and the in-memory backend in tests.

mod memory;
mod parquet;

pub use memory::InMemoryStore;
pub use parquet::ParquetStore;

use crate::error::{PipelineError, Result};
use crate::snapshot::SnapshotDate;
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};

pub const SILVER_LOANS: &str = "silver_loans";
pub const SILVER_FINANCIALS: &str = "silver_financials";
pub const SILVER_ATTRIBUTES: &str = "silver_attributes";
pub const SILVER_CLICKSTREAM: &str = "silver_clickstream";
pub const GOLD_LABEL_STORE: &str = "gold_label_store";
pub const GOLD_FEATURE_STORE: &str = "gold_feature_store";

/// A date-partitioned table: a directory plus a file name prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    dir: PathBuf,
    prefix: String,
}

impl Table {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn silver_loans(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, SILVER_LOANS)
    }

    pub fn gold_labels(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, GOLD_LABEL_STORE)
    }

    pub fn gold_features(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, GOLD_FEATURE_STORE)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `{dir}/{prefix}_{YYYY_MM_DD}.parquet`
    pub fn partition_path(&self, date: &SnapshotDate) -> PathBuf {
        self.dir
            .join(format!("{}_{}.parquet", self.prefix, date.partition_suffix()))
    }
}

/// Read/replace access to date partitions
pub trait PartitionStore: Send + Sync {
    /// Whether a partition exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Read a partition; `SourceNotFound` when it does not exist
    fn read(&self, path: &Path) -> Result<DataFrame>;

    /// Replace the partition at `path` with `df`
    fn write(&self, path: &Path, df: &mut DataFrame) -> Result<()>;

    /// Read a partition that may legitimately be absent
    fn try_read(&self, path: &Path) -> Result<Option<DataFrame>> {
        match self.read(path) {
            Ok(df) => Ok(Some(df)),
            Err(PipelineError::SourceNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
