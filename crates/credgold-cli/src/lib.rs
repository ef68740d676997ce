//! credgold command line driver
//!
//! Loads the layered configuration, sets up tracing and runs the label and
//! feature pipelines for a single date or a monthly backfill.

pub mod backfill;
pub mod cli;
pub mod config;
pub mod logging;

pub use backfill::{BackfillReport, Job, Runner};
pub use cli::{Cli, Command};
pub use config::{AppConfig, DirectoryLayout, LogFormat};
