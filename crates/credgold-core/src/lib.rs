//! credgold core - shared types for the gold-table pipelines
//!
//! Snapshot dates, partition addressing and storage, pipeline
//! configuration and the error type used by every crate in the workspace.

pub mod config;
pub mod error;
pub mod snapshot;
pub mod storage;

pub use config::{FeatureColumns, FeatureConfig, LabelConfig, OccupationEncoding, PipelineConfig};
pub use error::{PipelineError, Result};
pub use snapshot::{monthly_snapshots, months_between, months_on_book, SnapshotDate};
pub use storage::{InMemoryStore, ParquetStore, PartitionStore, Table};
