//! Leakage guard
//!
//! Keeps label/target, PII and retired feature columns out of the gold
//! feature table regardless of what the silver sources contain. Identity
//! columns are never removed.

use crate::frame::column_names;
use credgold_core::{FeatureColumns, Result};
use polars::prelude::DataFrame;

pub struct LeakageGuard<'a> {
    columns: &'a FeatureColumns,
}

impl<'a> LeakageGuard<'a> {
    pub fn new(columns: &'a FeatureColumns) -> Self {
        Self { columns }
    }

    fn is_identity(&self, name: &str) -> bool {
        self.columns.identity.iter().any(|c| c == name)
    }

    /// Whether `name` may appear in a gold feature partition
    pub fn permits(&self, name: &str) -> bool {
        self.is_identity(name) || !(self.columns.is_denied(name) || self.columns.is_leakage(name))
    }

    /// Drop deny-listed columns
    pub fn drop_denied(&self, df: DataFrame) -> Result<DataFrame> {
        let (kept, dropped): (Vec<String>, Vec<String>) = column_names(&df)
            .into_iter()
            .partition(|name| self.is_identity(name) || !self.columns.is_denied(name));

        if dropped.is_empty() {
            return Ok(df);
        }
        tracing::debug!("dropping deny-listed columns: {:?}", dropped);
        Ok(df.select(kept)?)
    }

    /// Keep only the permitted names of `selection`, preserving order
    pub fn filter_selection(&self, selection: &[String]) -> Vec<String> {
        selection
            .iter()
            .filter(|name| {
                let permitted = self.permits(name);
                if !permitted {
                    tracing::warn!("column {} blocked from the feature table", name);
                }
                permitted
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_drop_denied_removes_pii_and_labels() {
        let columns = FeatureColumns::default();
        let guard = LeakageGuard::new(&columns);
        let df = df! {
            "Customer_ID" => &["C1"],
            "snapshot_date" => &["2023-07-01"],
            "Name" => &["Ann"],
            "SSN" => &["000-00-0000"],
            "label" => &[1],
            "fe_7" => &[0.5],
            "Annual_Income" => &[1000.0],
        }
        .unwrap();

        let out = guard.drop_denied(df).unwrap();

        assert_eq!(
            column_names(&out),
            vec!["Customer_ID", "snapshot_date", "Annual_Income"]
        );
    }

    #[test]
    fn test_filter_selection_blocks_prefixed_columns() {
        let columns = FeatureColumns::default();
        let guard = LeakageGuard::new(&columns);
        let selection: Vec<String> = ["Customer_ID", "Label_90d", "Annual_Income", "TARGET"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(
            guard.filter_selection(&selection),
            vec!["Customer_ID", "Annual_Income"]
        );
    }

    #[test]
    fn test_identity_is_always_permitted() {
        let mut columns = FeatureColumns::default();
        columns.identity = vec!["target_customer".to_string()];
        let guard = LeakageGuard::new(&columns);

        assert!(guard.permits("target_customer"));
    }
}
