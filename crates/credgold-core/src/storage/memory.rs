//! In-memory partitions for testing

use super::PartitionStore;
use crate::error::{PipelineError, Result};
use polars::prelude::DataFrame;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Partitions held in a map keyed by path
#[derive(Default)]
pub struct InMemoryStore {
    partitions: RwLock<HashMap<PathBuf, DataFrame>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a partition
    pub fn insert(&self, path: impl Into<PathBuf>, df: DataFrame) -> Result<()> {
        let mut partitions = self.partitions.write().map_err(poisoned)?;
        partitions.insert(path.into(), df);
        Ok(())
    }

    /// Snapshot of a stored partition
    pub fn get(&self, path: &Path) -> Option<DataFrame> {
        self.partitions
            .read()
            .ok()
            .and_then(|partitions| partitions.get(path).cloned())
    }

    pub fn len(&self) -> usize {
        self.partitions.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartitionStore for InMemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.partitions
            .read()
            .map(|p| p.contains_key(path))
            .unwrap_or(false)
    }

    fn read(&self, path: &Path) -> Result<DataFrame> {
        self.get(path).ok_or_else(|| PipelineError::SourceNotFound {
            path: path.to_path_buf(),
        })
    }

    fn write(&self, path: &Path, df: &mut DataFrame) -> Result<()> {
        self.insert(path, df.clone())
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> PipelineError {
    PipelineError::Io(std::io::Error::other(e.to_string()))
}
