//! Integration tests for the feature pipeline against parquet partitions on disk

use credgold_core::{FeatureConfig, ParquetStore, PartitionStore, PipelineError, SnapshotDate};
use credgold_runtime::{FeaturePipeline, FeatureSource, FeatureSources};
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

const DATE: &str = "2023-07-01";

struct Fixture {
    _dir: TempDir,
    sources: FeatureSources,
    gold: PathBuf,
    store: Arc<ParquetStore>,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_path_buf();
    Fixture {
        sources: FeatureSources::new(
            root.join("silver/financials"),
            root.join("silver/attributes"),
            root.join("silver/clickstream"),
        ),
        gold: root.join("gold/feature_store"),
        store: Arc::new(ParquetStore::new()),
        _dir: dir,
    }
}

fn financials() -> DataFrame {
    df! {
        "Customer_ID" => &["C1", "C2", "C3"],
        "snapshot_date" => &[DATE, DATE, DATE],
        "Annual_Income" => &[Some(48_000.0), Some(0.0), None],
        "Monthly_Inhand_Salary" => &[Some(3_500.0), Some(2_000.0), Some(0.0)],
        "Outstanding_Debt" => &[12_000.0, 800.0, 5_000.0],
        "Credit_Utilization_Ratio" => &[0.31, 0.12, 0.66],
        "Total_EMI_per_month" => &[700.0, 100.0, 50.0],
        "Num_of_Delayed_Payment" => &[Some(4), Some(0), None],
        "Delay_from_due_date" => &[12, 0, 30],
        "Credit_Mix" => &[Some("Good"), Some("Excellent"), None],
        "Changed_Credit_Limit" => &[1.5, 2.0, 0.0],
        "target" => &[1, 0, 0],
    }
    .unwrap()
}

fn attributes() -> DataFrame {
    df! {
        "Customer_ID" => &["C1", "C2", "C4"],
        "snapshot_date" => &[DATE, DATE, DATE],
        "Name" => &["Ann", "Bo", "Cy"],
        "SSN" => &["111", "222", "333"],
        "Occupation" => &["Teacher", "Lawyer", "Teacher"],
        "Age" => &[31, 45, 28],
    }
    .unwrap()
}

fn clickstream() -> DataFrame {
    df! {
        "Customer_ID" => &["C1", "C3"],
        "snapshot_date" => &[DATE, DATE],
        "fe_1" => &[3, 9],
        "fe_2" => &[0, 1],
        "Label_leak" => &[1, 0],
    }
    .unwrap()
}

fn seed(fx: &Fixture, source: FeatureSource, mut df: DataFrame) {
    let path = fx
        .sources
        .table(source)
        .partition_path(&SnapshotDate::parse(DATE).unwrap());
    fx.store.write(&path, &mut df).unwrap();
}

fn seed_all(fx: &Fixture) {
    seed(fx, FeatureSource::Financials, financials());
    seed(fx, FeatureSource::Attributes, attributes());
    seed(fx, FeatureSource::Clickstream, clickstream());
}

fn names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|n| n.to_string()).collect()
}

fn f64_values(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
    let s = df.column(column).unwrap().as_materialized_series();
    s.f64().unwrap().into_iter().collect()
}

fn pipeline(fx: &Fixture) -> FeaturePipeline {
    FeaturePipeline::new(fx.store.clone(), FeatureConfig::default())
}

#[test]
fn test_full_join_output() {
    let fx = fixture();
    seed_all(&fx);

    let features = pipeline(&fx).run(DATE, &fx.sources, &fx.gold).unwrap();

    assert_eq!(
        names(&features),
        vec![
            "Customer_ID",
            "snapshot_date",
            "Annual_Income",
            "Outstanding_Debt",
            "Credit_Utilization_Ratio",
            "Total_EMI_per_month",
            "Num_of_Delayed_Payment",
            "Debt_to_Income_Ratio",
            "EMI_Burden_Ratio",
            "Credit_Mix_encoded",
        ]
    );
    // Left join from financials: C4 (attributes only) is not added
    assert_eq!(features.height(), 3);
    assert_eq!(features.column("snapshot_date").unwrap().dtype(), &DataType::Date);
}

#[test]
fn test_debt_to_income_guard() {
    let fx = fixture();
    seed_all(&fx);

    let features = pipeline(&fx).run(DATE, &fx.sources, &fx.gold).unwrap();

    // C1: 12000 / 48000; C2: income 0; C3: income null
    assert_eq!(
        f64_values(&features, "Debt_to_Income_Ratio"),
        vec![Some(0.25), None, None]
    );
    // C3 salary 0 -> null burden
    assert_eq!(f64_values(&features, "EMI_Burden_Ratio")[2], None);
}

#[test]
fn test_unmapped_credit_mix_encodes_zero() {
    let fx = fixture();
    seed_all(&fx);

    let features = pipeline(&fx).run(DATE, &fx.sources, &fx.gold).unwrap();
    let mix = features.column("Credit_Mix_encoded").unwrap().as_materialized_series();
    let mix: Vec<Option<i32>> = mix.i32().unwrap().into_iter().collect();

    assert_eq!(mix, vec![Some(2), Some(0), Some(0)]);
}

#[test]
fn test_no_leakage_for_any_source_combination() {
    let all = [
        FeatureSource::Financials,
        FeatureSource::Attributes,
        FeatureSource::Clickstream,
    ];

    for mask in 1u8..8 {
        let fx = fixture();
        for (bit, source) in all.iter().enumerate() {
            if mask & (1 << bit) == 0 {
                continue;
            }
            let frame = match source {
                FeatureSource::Financials => financials(),
                FeatureSource::Attributes => attributes(),
                FeatureSource::Clickstream => clickstream(),
            };
            seed(&fx, *source, frame);
        }

        let features = pipeline(&fx).run(DATE, &fx.sources, &fx.gold).unwrap();
        for name in names(&features) {
            let lower = name.to_lowercase();
            assert!(
                !lower.starts_with("label") && !lower.starts_with("target"),
                "mask {} leaked column {}",
                mask,
                name
            );
        }
    }
}

#[test]
fn test_only_attributes_present() {
    let fx = fixture();
    seed(&fx, FeatureSource::Attributes, attributes());

    let features = pipeline(&fx).run(DATE, &fx.sources, &fx.gold).unwrap();

    assert_eq!(features.height(), 3);
    assert!(f64_values(&features, "Annual_Income").iter().all(Option::is_none));
    assert!(f64_values(&features, "Debt_to_Income_Ratio")
        .iter()
        .all(Option::is_none));
    assert!(fx.gold.join("gold_feature_store_2023_07_01.parquet").exists());
}

#[test]
fn test_no_sources_is_fatal() {
    let fx = fixture();

    let err = pipeline(&fx).run(DATE, &fx.sources, &fx.gold).unwrap_err();

    assert!(matches!(err, PipelineError::NoFeatureSources { .. }));
    assert!(!fx.gold.exists());
}

#[test]
fn test_empty_join_is_fatal() {
    let fx = fixture();
    let empty = financials().head(Some(0));
    seed(&fx, FeatureSource::Financials, empty);
    seed(&fx, FeatureSource::Attributes, attributes());

    let err = pipeline(&fx).run(DATE, &fx.sources, &fx.gold).unwrap_err();

    assert!(matches!(err, PipelineError::EmptyDataset { .. }));
    assert!(!fx.gold.exists());
}

#[test]
fn test_rerun_is_byte_identical() {
    let fx = fixture();
    seed_all(&fx);
    let pipeline = pipeline(&fx);
    let path = fx.gold.join("gold_feature_store_2023_07_01.parquet");

    pipeline.run(DATE, &fx.sources, &fx.gold).unwrap();
    let first = std::fs::read(&path).unwrap();
    pipeline.run(DATE, &fx.sources, &fx.gold).unwrap();
    let second = std::fs::read(&path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_returned_frame_matches_partition() {
    let fx = fixture();
    seed_all(&fx);

    let features = pipeline(&fx).run(DATE, &fx.sources, &fx.gold).unwrap();
    let persisted = fx
        .store
        .read(&fx.gold.join("gold_feature_store_2023_07_01.parquet"))
        .unwrap();

    assert!(persisted.equals_missing(&features));
}
