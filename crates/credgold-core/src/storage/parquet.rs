//! Parquet files on the local file system

use super::PartitionStore;
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// One parquet file per partition.
///
/// Writes land in a temporary sibling file that is renamed over the target,
/// so readers never observe a partially written partition.
#[derive(Debug, Clone)]
pub struct ParquetStore {
    compression: ParquetCompression,
}

impl Default for ParquetStore {
    fn default() -> Self {
        Self {
            compression: ParquetCompression::Snappy,
        }
    }
}

impl ParquetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compression(mut self, compression: ParquetCompression) -> Self {
        self.compression = compression;
        self
    }

    fn staging_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

impl PartitionStore for ParquetStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> Result<DataFrame> {
        if !self.exists(path) {
            return Err(PipelineError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)?;
        let df = ParquetReader::new(file).finish()?;
        tracing::info!("loaded from: {} row count: {}", path.display(), df.height());
        Ok(df)
    }

    fn write(&self, path: &Path, df: &mut DataFrame) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let staging = Self::staging_path(path);
        let written = (|| -> Result<()> {
            let mut file = File::create(&staging)?;
            ParquetWriter::new(&mut file)
                .with_compression(self.compression)
                .finish(df)?;
            file.sync_all()?;
            Ok(())
        })();

        if let Err(e) = written {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }

        fs::rename(&staging, path)?;
        tracing::info!("saved to: {} row count: {}", path.display(), df.height());
        Ok(())
    }
}
