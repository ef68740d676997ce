//! credgold - gold label and feature tables for credit risk

use anyhow::{bail, Context, Result};
use clap::Parser;
use credgold_cli::logging::init_tracing;
use credgold_cli::{AppConfig, Cli, Command, Job, Runner};
use credgold_core::{monthly_snapshots, LabelConfig, ParquetStore, SnapshotDate};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    init_tracing(config.log_format)?;
    info!("Loaded configuration: {:?}", config);

    let store = Arc::new(ParquetStore::new());

    match cli.command {
        Command::Labels { date, dpd, mob } => {
            let current = config.pipeline.label;
            config.pipeline.label = LabelConfig::new(
                dpd.unwrap_or(current.dpd),
                mob.unwrap_or(current.mob),
            );
            let date = SnapshotDate::parse(&date)?;
            let rows = Runner::new(store, &config)
                .run_one(Job::Labels, &date)
                .with_context(|| format!("label pipeline failed for {}", date))?;
            info!("{} labels written for {}", rows, date);
        }
        Command::Features { date } => {
            let date = SnapshotDate::parse(&date)?;
            let rows = Runner::new(store, &config)
                .run_one(Job::Features, &date)
                .with_context(|| format!("feature pipeline failed for {}", date))?;
            info!("{} feature rows written for {}", rows, date);
        }
        Command::Backfill {
            start,
            end,
            only,
            max_concurrent,
        } => {
            let dates = monthly_snapshots(SnapshotDate::parse(&start)?, SnapshotDate::parse(&end)?);
            let jobs: Vec<Job> = match only {
                Some(job) => vec![job],
                None => Job::ALL.to_vec(),
            };
            let max_concurrent = max_concurrent.unwrap_or(config.backfill.max_concurrent_dates);
            info!(
                "Backfilling {} snapshot dates ({} to {}), jobs {:?}, {} at a time",
                dates.len(),
                start,
                end,
                jobs,
                max_concurrent
            );

            let runner = Arc::new(Runner::new(store, &config));
            let report = runner.backfill(dates, &jobs, max_concurrent).await;

            info!(
                "Backfill finished: {} succeeded, {} failed",
                report.succeeded.len(),
                report.failed.len() + report.panicked
            );
            for failure in &report.failed {
                info!("  {} {}: {}", failure.date, failure.job, failure.detail);
            }
            if !report.is_success() {
                bail!("backfill had failed dates");
            }
        }
    }

    Ok(())
}
