//! Small dataframe helpers shared by both pipelines

use credgold_core::{PipelineError, Result};
use polars::prelude::*;

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|n| n.to_string()).collect()
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|n| n.as_str() == name)
}

/// Fail with `MissingColumn` for the first absent column
pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<()> {
    match columns.iter().find(|c| !has_column(df, c)) {
        Some(missing) => Err(PipelineError::MissingColumn {
            column: missing.to_string(),
        }),
        None => Ok(()),
    }
}

/// Cast a `Date`, `Datetime` or `YYYY-MM-DD` string column to `Date`
pub fn as_date(column: &str) -> Expr {
    col(column).cast(DataType::Date).alias(column)
}

/// Float64 column of nulls
pub fn null_f64(name: &str) -> Expr {
    lit(NULL).cast(DataType::Float64).alias(name)
}
