//! Per-date job runner and monthly backfill
//!
//! Each date is independent and writes its own partitions, so a backfill
//! runs dates on blocking threads with a bounded number in flight.
//! A failed date is reported and does not stop the others.

use crate::config::{AppConfig, DirectoryLayout};
use credgold_core::{PartitionStore, SnapshotDate};
use credgold_runtime::{FeaturePipeline, LabelPipeline};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum Job {
    Labels,
    Features,
}

impl Job {
    pub const ALL: [Job; 2] = [Job::Labels, Job::Features];
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::Labels => write!(f, "labels"),
            Job::Features => write!(f, "features"),
        }
    }
}

/// Runs the label and feature pipelines against a directory layout
pub struct Runner {
    labels: LabelPipeline,
    features: FeaturePipeline,
    layout: DirectoryLayout,
}

impl Runner {
    pub fn new(store: Arc<dyn PartitionStore>, config: &AppConfig) -> Self {
        Self {
            labels: LabelPipeline::new(store.clone(), config.pipeline.label),
            features: FeaturePipeline::new(store, config.pipeline.features.clone()),
            layout: config.layout.clone(),
        }
    }

    /// Run one job for one date, returning the number of rows written
    pub fn run_one(&self, job: Job, date: &SnapshotDate) -> credgold_core::Result<usize> {
        let date = date.to_string();
        let frame = match job {
            Job::Labels => {
                self.labels
                    .run(&date, &self.layout.silver_loans, &self.layout.gold_labels)?
            }
            Job::Features => self.features.run(
                &date,
                &self.layout.feature_sources(),
                &self.layout.gold_features,
            )?,
        };
        Ok(frame.height())
    }

    /// Run `jobs` for every date with at most `max_concurrent` dates in flight.
    /// The jobs of one date run in order under a single permit.
    pub async fn backfill(
        self: Arc<Self>,
        dates: Vec<SnapshotDate>,
        jobs: &[Job],
        max_concurrent: usize,
    ) -> BackfillReport {
        let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
        let mut tasks = JoinSet::new();

        for date in dates {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let runner = self.clone();
            let jobs = jobs.to_vec();
            tasks.spawn_blocking(move || {
                let _permit = permit;
                jobs.into_iter()
                    .map(|job| {
                        let outcome = runner.run_one(job, &date).map_err(|e| e.to_string());
                        (date, job, outcome)
                    })
                    .collect::<Vec<_>>()
            });
        }

        let mut report = BackfillReport::default();
        while let Some(joined) = tasks.join_next().await {
            let outcomes = match joined {
                Ok(outcomes) => outcomes,
                Err(e) => {
                    tracing::error!("backfill task panicked: {}", e);
                    report.panicked += 1;
                    continue;
                }
            };
            for (date, job, outcome) in outcomes {
                match outcome {
                    Ok(rows) => {
                        tracing::info!("{} {} done: {} rows", date, job, rows);
                        report.succeeded.push(JobOutcome { date, job, detail: rows.to_string() });
                    }
                    Err(error) => {
                        tracing::warn!("{} {} failed: {}", date, job, error);
                        report.failed.push(JobOutcome { date, job, detail: error });
                    }
                }
            }
        }

        report.sort();
        report
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub date: SnapshotDate,
    pub job: Job,
    /// Row count on success, error message on failure
    pub detail: String,
}

#[derive(Debug, Clone, Default)]
pub struct BackfillReport {
    pub succeeded: Vec<JobOutcome>,
    pub failed: Vec<JobOutcome>,
    pub panicked: usize,
}

impl BackfillReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.panicked == 0
    }

    fn sort(&mut self) {
        self.succeeded.sort_by_key(|o| (o.date, o.job));
        self.failed.sort_by_key(|o| (o.date, o.job));
    }
}
