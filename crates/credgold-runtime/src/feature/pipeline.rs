//! Feature pipeline
//!
//! One pass per snapshot date: load the present silver sources, left-join
//! them, encode categoricals, strip leaking columns, pass numeric nulls
//! through, derive ratios and keep the essential feature set.

use super::derived::{derived_features, DERIVED_INPUTS};
use super::encoding::{credit_mix_expr, encode_occupation, CREDIT_MIX};
use super::guard::LeakageGuard;
use super::sources::{join_sources, load_sources, FeatureSources};
use crate::frame::{column_names, has_column, null_f64};
use credgold_core::{FeatureConfig, PartitionStore, PipelineError, Result, SnapshotDate, Table};
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Computes and persists the gold feature partition for a snapshot date
pub struct FeaturePipeline {
    store: Arc<dyn PartitionStore>,
    config: FeatureConfig,
}

impl FeaturePipeline {
    pub fn new(store: Arc<dyn PartitionStore>, config: FeatureConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Build features from whichever silver sources exist for the date and
    /// replace `{gold_feature_dir}/gold_feature_store_{date}.parquet`.
    ///
    /// Fails without writing when no source exists or the join is empty.
    pub fn run(
        &self,
        snapshot_date: &str,
        sources: &FeatureSources,
        gold_feature_dir: impl AsRef<Path>,
    ) -> Result<DataFrame> {
        let date = SnapshotDate::parse(snapshot_date)?;
        self.config.columns.validate()?;

        let loaded = load_sources(self.store.as_ref(), sources, &date)?;
        if loaded.is_empty() {
            return Err(PipelineError::NoFeatureSources {
                snapshot_date: date.to_string(),
            });
        }
        let names: Vec<&str> = loaded.iter().map(|l| l.source.name()).collect();
        tracing::debug!("joining feature sources for {}: {:?}", date, names);

        let joined = join_sources(loaded, &self.config.columns.identity)?;
        if joined.height() == 0 {
            return Err(PipelineError::EmptyDataset {
                snapshot_date: date.to_string(),
            });
        }

        let mut features = compute_features(joined, &self.config)?;

        let target = Table::gold_features(gold_feature_dir.as_ref()).partition_path(&date);
        self.store.write(&target, &mut features)?;

        Ok(features)
    }
}

/// Turn a joined silver frame into the gold feature frame without touching storage
pub fn compute_features(joined: DataFrame, config: &FeatureConfig) -> Result<DataFrame> {
    let columns = &config.columns;
    let guard = LeakageGuard::new(columns);

    let encoded = encode_occupation(joined, &config.occupation)?;
    let df = guard.drop_denied(encoded)?;

    // Numeric columns become Float64; absent ones are added as nulls so the
    // derived features and the output schema do not depend on which sources exist.
    let mut numeric: Vec<&str> = columns.numeric.iter().map(String::as_str).collect();
    for input in DERIVED_INPUTS {
        if !numeric.contains(&input) {
            numeric.push(input);
        }
    }
    let numeric_exprs: Vec<Expr> = numeric
        .iter()
        .map(|name| {
            if has_column(&df, name) {
                col(*name).cast(DataType::Float64).alias(*name)
            } else {
                null_f64(name)
            }
        })
        .collect();

    let credit_mix_present = has_column(&df, CREDIT_MIX);
    let derived = df
        .lazy()
        .with_columns(numeric_exprs)
        .with_column(credit_mix_expr(credit_mix_present))
        .with_columns(derived_features())
        .collect()?;

    let mut selection = columns.identity.clone();
    selection.extend(columns.essential.iter().cloned());
    let selection = guard.filter_selection(&selection);

    let present = column_names(&derived);
    let projection: Vec<Expr> = selection
        .iter()
        .map(|name| {
            if present.contains(name) {
                col(name.as_str())
            } else {
                tracing::debug!("essential column {} absent, emitting nulls", name);
                null_f64(name)
            }
        })
        .collect();

    let features = derived
        .lazy()
        .select(projection)
        .sort(
            columns.identity.clone(),
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?;

    Ok(features)
}
