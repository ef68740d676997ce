//! Categorical encoders
//!
//! `Credit_Mix` has a fixed ordinal mapping. `Occupation` codes are built
//! from the categories in the data: per run (codes may change between
//! dates) or from a persisted lookup table that only ever grows (codes are
//! stable across dates).
//!
//! Updates to a persisted table are serialized per path within the process,
//! and each save replaces the file by renaming a staged copy over it.

use crate::frame::has_column;
use credgold_core::{OccupationEncoding, PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

pub const OCCUPATION: &str = "Occupation";
pub const OCCUPATION_ENCODED: &str = "Occupation_encoded";
pub const CREDIT_MIX: &str = "Credit_Mix";
pub const CREDIT_MIX_ENCODED: &str = "Credit_Mix_encoded";

/// Dense category -> code lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryIndex {
    codes: BTreeMap<String, u32>,
}

impl CategoryIndex {
    /// Codes `0..n` assigned in sorted category order
    pub fn from_categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::default();
        let sorted: BTreeSet<String> = categories.into_iter().map(Into::into).collect();
        index.extend(sorted);
        index
    }

    /// Load a persisted index; a missing file is an empty index
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let index: Self = serde_json::from_str(&content)?;
        index.check_dense()?;
        Ok(index)
    }

    /// Write the index to a staging sibling and rename it over `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        let staging = path.with_file_name(name);

        let content = serde_json::to_string_pretty(self)?;
        if let Err(e) = fs::write(&staging, content) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        fs::rename(&staging, path)?;
        Ok(())
    }

    /// Assign the next free codes to unseen categories, in iteration order.
    /// Returns how many were added.
    pub fn extend<I, S>(&mut self, categories: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for category in categories {
            let category = category.into();
            if !self.codes.contains_key(&category) {
                let code = self.codes.len() as u32;
                self.codes.insert(category, code);
                added += 1;
            }
        }
        added
    }

    pub fn code(&self, category: &str) -> Option<u32> {
        self.codes.get(category).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    fn check_dense(&self) -> Result<()> {
        let codes: BTreeSet<u32> = self.codes.values().copied().collect();
        let dense = codes.len() == self.codes.len()
            && codes.iter().enumerate().all(|(i, code)| i as u32 == *code);
        if dense {
            Ok(())
        } else {
            Err(PipelineError::Mapping(
                "category codes must be unique and dense from 0".to_string(),
            ))
        }
    }
}

static MAPPING_LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

/// Lock guarding the load, extend and save of one persisted table
fn mapping_lock(path: &Path) -> Arc<Mutex<()>> {
    let locks = MAPPING_LOCKS.get_or_init(Default::default);
    let mut locks = locks.lock().unwrap_or_else(PoisonError::into_inner);
    locks.entry(path.to_path_buf()).or_default().clone()
}

fn distinct_categories(df: &DataFrame, column: &str) -> Result<BTreeSet<String>> {
    let values = df.column(column)?.cast(&DataType::String)?;
    let values = values.as_materialized_series().str()?;
    Ok(values.into_iter().flatten().map(str::to_string).collect())
}

fn encode_with(df: &DataFrame, column: &str, index: &CategoryIndex) -> Result<Series> {
    let values = df.column(column)?.cast(&DataType::String)?;
    let values = values.as_materialized_series().str()?;
    let codes: Vec<Option<u32>> = values
        .into_iter()
        .map(|v| v.and_then(|v| index.code(v)))
        .collect();
    Ok(Series::new(OCCUPATION_ENCODED.into(), codes))
}

/// Add `Occupation_encoded` when an `Occupation` column is present
pub fn encode_occupation(mut df: DataFrame, encoding: &OccupationEncoding) -> Result<DataFrame> {
    if !has_column(&df, OCCUPATION) {
        return Ok(df);
    }

    let categories = distinct_categories(&df, OCCUPATION)?;
    let index = match encoding {
        OccupationEncoding::Dynamic => CategoryIndex::from_categories(categories),
        OccupationEncoding::Persisted { path } => {
            let lock = mapping_lock(path);
            // The file is replaced atomically, so a poisoned lock still guards a whole table
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            let mut index = CategoryIndex::load(path)?;
            let added = index.extend(categories);
            if added > 0 {
                tracing::info!(
                    "added {} occupation categories to {}",
                    added,
                    path.display()
                );
                index.save(path)?;
            }
            index
        }
    };

    let encoded = encode_with(&df, OCCUPATION, &index)?;
    df.with_column(encoded)?;
    Ok(df)
}

/// `Credit_Mix_encoded`: Good = 2, Standard = 1, anything else = 0
pub fn credit_mix_expr(credit_mix_present: bool) -> Expr {
    let encoded = if credit_mix_present {
        when(col(CREDIT_MIX).cast(DataType::String).eq(lit("Good")))
            .then(lit(2))
            .when(col(CREDIT_MIX).cast(DataType::String).eq(lit("Standard")))
            .then(lit(1))
            .otherwise(lit(0))
    } else {
        lit(0)
    };
    encoded.cast(DataType::Int32).alias(CREDIT_MIX_ENCODED)
}
