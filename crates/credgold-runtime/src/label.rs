//! Label pipeline
//!
//! Reads one silver loan partition and labels every loan that sits at the
//! configured months-on-book on the snapshot date. A loan is labelled 1 when
//! its days past due reach the configured threshold.
//!
//! DPD uses fixed 30-day installments: `days_since_start - installment_num * 30`
//! when anything is overdue, 0 otherwise.

use crate::frame::{as_date, require_columns};
use credgold_core::config::{
    CUSTOMER_ID, INSTALLMENT_NUM, LOAN_ID, LOAN_START_DATE, OVERDUE_AMT, SNAPSHOT_DATE,
};
use credgold_core::{months_on_book, LabelConfig, PartitionStore, Result, SnapshotDate, Table};
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;

pub const MOB: &str = "mob";
pub const DPD: &str = "dpd";
pub const LABEL: &str = "label";
pub const LABEL_DEF: &str = "label_def";

const DAYS_PER_INSTALLMENT: i32 = 30;

/// Columns of a gold label partition, in order
pub const LABEL_COLUMNS: [&str; 5] = [LOAN_ID, CUSTOMER_ID, LABEL, LABEL_DEF, SNAPSHOT_DATE];

/// Computes and persists the gold label partition for a snapshot date
pub struct LabelPipeline {
    store: Arc<dyn PartitionStore>,
    config: LabelConfig,
}

impl LabelPipeline {
    pub fn new(store: Arc<dyn PartitionStore>, config: LabelConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// Label the loans in `{silver_loan_dir}/silver_loans_{date}.parquet` and
    /// replace `{gold_label_dir}/gold_label_store_{date}.parquet`.
    ///
    /// A missing silver partition is fatal and nothing is written.
    pub fn run(
        &self,
        snapshot_date: &str,
        silver_loan_dir: impl AsRef<Path>,
        gold_label_dir: impl AsRef<Path>,
    ) -> Result<DataFrame> {
        let date = SnapshotDate::parse(snapshot_date)?;
        self.config.validate()?;

        let source = Table::silver_loans(silver_loan_dir.as_ref()).partition_path(&date);
        let loans = self.store.read(&source)?;

        let mut labels = compute_labels(loans, &self.config)?;
        if labels.height() == 0 {
            tracing::warn!(
                "no loans at mob {} on {}, writing empty label partition",
                self.config.mob,
                date
            );
        }

        let target = Table::gold_labels(gold_label_dir.as_ref()).partition_path(&date);
        self.store.write(&target, &mut labels)?;

        Ok(labels)
    }
}

/// Whole months on book for every row, null where either date is null
fn months_on_book_series(df: &DataFrame) -> Result<Series> {
    let starts = df
        .column(LOAN_START_DATE)?
        .as_materialized_series()
        .date()?
        .clone();
    let snapshots = df
        .column(SNAPSHOT_DATE)?
        .as_materialized_series()
        .date()?
        .clone();

    let values: Vec<Option<i32>> = starts
        .as_date_iter()
        .zip(snapshots.as_date_iter())
        .map(|(start, snapshot)| match (start, snapshot) {
            (Some(start), Some(snapshot)) => Some(months_on_book(start, snapshot)),
            _ => None,
        })
        .collect();

    Ok(Series::new(MOB.into(), values))
}

fn dpd_expr() -> Expr {
    let days_on_book =
        col(SNAPSHOT_DATE).cast(DataType::Int32) - col(LOAN_START_DATE).cast(DataType::Int32);
    let scheduled_days = col(INSTALLMENT_NUM).cast(DataType::Int32) * lit(DAYS_PER_INSTALLMENT);

    when(col(OVERDUE_AMT).gt(lit(0)))
        .then(days_on_book - scheduled_days)
        .otherwise(lit(0))
        .cast(DataType::Int32)
        .alias(DPD)
}

/// Label a silver loan frame without touching storage.
///
/// Keeps rows whose months on book equal `config.mob` and projects them to
/// `loan_id, Customer_ID, label, label_def, snapshot_date`, sorted by loan.
pub fn compute_labels(loans: DataFrame, config: &LabelConfig) -> Result<DataFrame> {
    require_columns(
        &loans,
        &[
            LOAN_ID,
            CUSTOMER_ID,
            SNAPSHOT_DATE,
            LOAN_START_DATE,
            INSTALLMENT_NUM,
            OVERDUE_AMT,
        ],
    )?;

    let mut df = loans
        .lazy()
        .with_columns([as_date(SNAPSHOT_DATE), as_date(LOAN_START_DATE)])
        .collect()?;

    let mob = months_on_book_series(&df)?;
    df.with_column(mob)?;

    let labels = df
        .lazy()
        .filter(col(MOB).eq(lit(config.mob)))
        .with_column(dpd_expr())
        .with_columns([
            when(col(DPD).gt_eq(lit(config.dpd)))
                .then(lit(1))
                .otherwise(lit(0))
                .cast(DataType::Int32)
                .alias(LABEL),
            lit(config.label_def()).alias(LABEL_DEF),
        ])
        .select(LABEL_COLUMNS.iter().map(|c| col(*c)).collect::<Vec<_>>())
        .sort(
            [LOAN_ID, CUSTOMER_ID],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?;

    let distinct_loans = labels.column(LOAN_ID)?.as_materialized_series().n_unique()?;
    if distinct_loans != labels.height() {
        tracing::warn!(
            "{} label rows for {} distinct loans; silver partition has duplicate loans",
            labels.height(),
            distinct_loans
        );
    }

    Ok(labels)
}
