//! Application configuration

use anyhow::Context;
use credgold_core::PipelineConfig;
use credgold_runtime::FeatureSources;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the silver inputs and gold outputs live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryLayout {
    pub silver_loans: PathBuf,
    pub silver_financials: PathBuf,
    pub silver_attributes: PathBuf,
    pub silver_clickstream: PathBuf,
    pub gold_labels: PathBuf,
    pub gold_features: PathBuf,
}

impl Default for DirectoryLayout {
    fn default() -> Self {
        let root = PathBuf::from("datamart");
        Self {
            silver_loans: root.join("silver/loans"),
            silver_financials: root.join("silver/financials"),
            silver_attributes: root.join("silver/attributes"),
            silver_clickstream: root.join("silver/clickstream"),
            gold_labels: root.join("gold/label_store"),
            gold_features: root.join("gold/feature_store"),
        }
    }
}

impl DirectoryLayout {
    pub fn feature_sources(&self) -> FeatureSources {
        FeatureSources::new(
            &self.silver_financials,
            &self.silver_attributes,
            &self.silver_clickstream,
        )
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackfillSettings {
    /// Snapshot dates processed at the same time
    pub max_concurrent_dates: usize,
}

impl Default for BackfillSettings {
    fn default() -> Self {
        Self {
            max_concurrent_dates: 4,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub layout: DirectoryLayout,
    pub pipeline: PipelineConfig,
    pub backfill: BackfillSettings,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from `config/credgold.*`, an optional explicit file
    /// and `CREDGOLD__*` environment variables, in increasing precedence.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/credgold").required(false));

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(
                config::Environment::with_prefix("CREDGOLD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config
            .pipeline
            .validate()
            .context("Invalid pipeline configuration")?;
        Ok(config)
    }
}
