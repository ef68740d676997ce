//! Snapshot dates and calendar arithmetic
//!
//! Every silver and gold table is partitioned by an as-of snapshot date.
//! This module owns the `YYYY-MM-DD` parsing, the `YYYY_MM_DD` partition
//! suffix, the month distance used for months-on-book, and the monthly
//! date sequence used by backfills.

use crate::error::{PipelineError, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Days per month assumed by the fractional part of `months_between`
const DAYS_PER_MONTH_FRACTION: f64 = 31.0;

/// As-of date of a partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SnapshotDate(NaiveDate);

impl SnapshotDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse a `YYYY-MM-DD` string
    pub fn parse(value: &str) -> Result<Self> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|e| PipelineError::InvalidSnapshotDate(format!("{}: {}", value, e)))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Suffix used in partition file names, e.g. `2023_07_01`
    pub fn partition_suffix(&self) -> String {
        self.0.format("%Y_%m_%d").to_string()
    }

    /// First day of the month containing this date
    pub fn first_of_month(&self) -> Self {
        // Day 1 always exists for a valid year/month.
        Self(self.0.with_day(1).unwrap_or(self.0))
    }
}

impl fmt::Display for SnapshotDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for SnapshotDate {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SnapshotDate {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SnapshotDate> for String {
    fn from(value: SnapshotDate) -> Self {
        value.to_string()
    }
}

fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.month() != date.month())
}

/// Fractional number of months from `start` to `end`.
///
/// Whole months when both dates fall on the same day of month or both are
/// the last day of their month; otherwise the day difference contributes
/// `(end.day - start.day) / 31`.
pub fn months_between(end: NaiveDate, start: NaiveDate) -> f64 {
    let whole = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;

    if end.day() == start.day() || (is_last_day_of_month(end) && is_last_day_of_month(start)) {
        return whole as f64;
    }

    let day_delta = end.day() as f64 - start.day() as f64;
    whole as f64 + day_delta / DAYS_PER_MONTH_FRACTION
}

/// Whole months on book, truncated toward zero
pub fn months_on_book(loan_start: NaiveDate, snapshot: NaiveDate) -> i32 {
    months_between(snapshot, loan_start).trunc() as i32
}

/// First-of-month snapshot dates from the month of `start` through `end`, inclusive
pub fn monthly_snapshots(start: SnapshotDate, end: SnapshotDate) -> Vec<SnapshotDate> {
    let mut dates = Vec::new();
    let mut current = start.first_of_month().date();

    while current <= end.date() {
        dates.push(SnapshotDate(current));
        match current.checked_add_months(Months::new(1)) {
            Some(next) => current = next,
            None => break,
        }
    }

    dates
}
