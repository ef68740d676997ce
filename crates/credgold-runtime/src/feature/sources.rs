//! Silver feature sources and the left-join chain
//!
//! Financials, attributes and clickstream are each optional for a date.
//! Present sources are joined in that order on the identity columns with
//! left joins, so customers from earlier sources are always kept.

use crate::frame::{as_date, has_column};
use credgold_core::config::SNAPSHOT_DATE;
use credgold_core::storage::{SILVER_ATTRIBUTES, SILVER_CLICKSTREAM, SILVER_FINANCIALS};
use credgold_core::{PartitionStore, PipelineError, Result, SnapshotDate, Table};
use polars::prelude::*;
use std::path::PathBuf;

/// One of the three silver feature sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSource {
    Financials,
    Attributes,
    Clickstream,
}

impl FeatureSource {
    /// Join order
    pub const ALL: [FeatureSource; 3] = [
        FeatureSource::Financials,
        FeatureSource::Attributes,
        FeatureSource::Clickstream,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FeatureSource::Financials => "financials",
            FeatureSource::Attributes => "attributes",
            FeatureSource::Clickstream => "clickstream",
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            FeatureSource::Financials => SILVER_FINANCIALS,
            FeatureSource::Attributes => SILVER_ATTRIBUTES,
            FeatureSource::Clickstream => SILVER_CLICKSTREAM,
        }
    }
}

/// Directories of the silver feature tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSources {
    pub financials: PathBuf,
    pub attributes: PathBuf,
    pub clickstream: PathBuf,
}

impl FeatureSources {
    pub fn new(
        financials: impl Into<PathBuf>,
        attributes: impl Into<PathBuf>,
        clickstream: impl Into<PathBuf>,
    ) -> Self {
        Self {
            financials: financials.into(),
            attributes: attributes.into(),
            clickstream: clickstream.into(),
        }
    }

    pub fn table(&self, source: FeatureSource) -> Table {
        let dir = match source {
            FeatureSource::Financials => &self.financials,
            FeatureSource::Attributes => &self.attributes,
            FeatureSource::Clickstream => &self.clickstream,
        };
        Table::new(dir.clone(), source.prefix())
    }
}

/// A source partition that exists for the date
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub source: FeatureSource,
    pub frame: DataFrame,
}

/// Read every present source for `date`, in join order. Absent sources are skipped.
pub fn load_sources(
    store: &dyn PartitionStore,
    sources: &FeatureSources,
    date: &SnapshotDate,
) -> Result<Vec<LoadedSource>> {
    let mut loaded = Vec::new();

    for source in FeatureSource::ALL {
        let path = sources.table(source).partition_path(date);
        match store.try_read(&path)? {
            Some(frame) => loaded.push(LoadedSource { source, frame }),
            None => tracing::info!(
                "{} source missing for {}, skipping: {}",
                source.name(),
                date,
                path.display()
            ),
        }
    }

    Ok(loaded)
}

fn prepare(loaded: LoadedSource, keys: &[String]) -> Result<LazyFrame> {
    if let Some(missing) = keys.iter().find(|k| !has_column(&loaded.frame, k)) {
        return Err(PipelineError::MissingColumn {
            column: format!("{} (in {} source)", missing, loaded.source.name()),
        });
    }

    let lf = loaded.frame.lazy();
    Ok(if keys.iter().any(|k| k == SNAPSHOT_DATE) {
        lf.with_column(as_date(SNAPSHOT_DATE))
    } else {
        lf
    })
}

/// Left-join the loaded sources on `keys` in order.
///
/// A non-key column already present from an earlier source keeps its name;
/// the later copy is suffixed with `_{source}`.
pub fn join_sources(loaded: Vec<LoadedSource>, keys: &[String]) -> Result<DataFrame> {
    let mut iter = loaded.into_iter();
    let first = iter.next().ok_or_else(|| {
        PipelineError::Config("join requires at least one loaded source".to_string())
    })?;

    let on: Vec<Expr> = keys.iter().map(|k| col(k.as_str())).collect();
    let mut joined = prepare(first, keys)?;

    for next in iter {
        let suffix = format!("_{}", next.source.name());
        let right = prepare(next, keys)?;
        joined = joined.join(
            right,
            on.clone(),
            on.clone(),
            JoinArgs::new(JoinType::Left).with_suffix(Some(suffix.into())),
        );
    }

    Ok(joined.collect()?)
}
