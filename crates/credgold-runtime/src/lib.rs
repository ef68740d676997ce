//! credgold runtime - gold label and feature pipelines
//!
//! Both pipelines take a snapshot date, read silver partitions through a
//! [`PartitionStore`](credgold_core::PartitionStore), replace the gold
//! partition for that date and return the computed frame.
//!
//! ```no_run
//! use credgold_core::{LabelConfig, ParquetStore};
//! use credgold_runtime::LabelPipeline;
//! use std::sync::Arc;
//!
//! let pipeline = LabelPipeline::new(Arc::new(ParquetStore::new()), LabelConfig::new(30, 6));
//! let labels = pipeline.run("2023-07-01", "datamart/silver/loans", "datamart/gold/labels")?;
//! println!("{} labels", labels.height());
//! # Ok::<(), credgold_core::PipelineError>(())
//! ```

pub mod feature;
pub mod frame;
pub mod label;

pub use feature::{compute_features, CategoryIndex, FeaturePipeline, FeatureSource, FeatureSources};
pub use label::{compute_labels, LabelPipeline};
