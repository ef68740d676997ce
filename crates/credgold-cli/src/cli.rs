//! Command line arguments

use crate::backfill::Job;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "credgold",
    version,
    about = "Build gold label and feature partitions from silver snapshots"
)]
pub struct Cli {
    /// Configuration file layered over config/credgold.*
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the gold label partition for one snapshot date
    Labels {
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: String,
        /// Days-past-due threshold (overrides configuration)
        #[arg(long)]
        dpd: Option<i32>,
        /// Months on book (overrides configuration)
        #[arg(long)]
        mob: Option<i32>,
    },
    /// Compute the gold feature partition for one snapshot date
    Features {
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: String,
    },
    /// Run pipelines for every first-of-month date in a range
    Backfill {
        #[arg(long, value_name = "YYYY-MM-DD", help = "First month to include")]
        start: String,
        #[arg(long, value_name = "YYYY-MM-DD", help = "Last date to include")]
        end: String,
        /// Run only one pipeline
        #[arg(long, value_enum)]
        only: Option<Job>,
        /// Dates processed concurrently (overrides configuration)
        #[arg(long, value_name = "N")]
        max_concurrent: Option<usize>,
    },
}
