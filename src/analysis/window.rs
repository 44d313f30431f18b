//! Partition a ledger into ordered per-test windows.
//!
//! Two grouping modes:
//!
//! - **days**: keep records newer than `latest - window_size * window_count`
//!   days, then bucket them into `window_size`-day spans anchored at midnight
//!   (UTC) of the earliest kept record. The bucket count follows from the
//!   selected date range alone; `window_count` only bounds the selection.
//! - **runs**: walk each test's runs newest first in groups of `window_size`,
//!   keep the `window_count` most recent groups and label them so the newest
//!   group is `window_count` and older groups count down from it.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{Error, ResultRecord, Result, Status};

/// How runs are grouped into windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    /// Calendar buckets of `window_size` days.
    Days,
    /// Buckets of `window_size` consecutive runs.
    #[default]
    Runs,
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days => f.write_str("days"),
            Self::Runs => f.write_str("runs"),
        }
    }
}

/// Grouping mode plus its sizing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowSpec {
    pub grouping: Grouping,
    pub window_size: u32,
    pub window_count: u32,
}

impl WindowSpec {
    pub fn new(grouping: Grouping, window_size: u32, window_count: u32) -> Self {
        Self {
            grouping,
            window_size,
            window_count,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::InvalidArgument(
                "window size must be at least 1".to_string(),
            ));
        }
        if self.window_count == 0 {
            return Err(Error::InvalidArgument(
                "window count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Ordered partition key. A single partition only ever holds one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum WindowKey {
    /// Start of a calendar bucket.
    Calendar(DateTime<Utc>),
    /// Run-count window label; higher is more recent.
    Run(u32),
}

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Calendar(start) => write!(f, "{}", start.format("%Y-%m-%d")),
            Self::Run(label) => write!(f, "{label}"),
        }
    }
}

/// Runs of one test inside one window, in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRuns {
    pub key: WindowKey,
    pub statuses: Vec<Status>,
}

/// All windows of one test, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct TestWindows {
    pub test_identifier: String,
    pub windows: Vec<WindowRuns>,
}

/// Partition time-ordered records into per-test windows.
///
/// Tests come back ordered by identifier; windows ascend within each test.
pub fn partition(records: &[ResultRecord], spec: &WindowSpec) -> Result<Vec<TestWindows>> {
    spec.validate()?;
    let windows = match spec.grouping {
        Grouping::Days => partition_by_days(records, spec.window_size, spec.window_count),
        Grouping::Runs => partition_by_runs(records, spec.window_size, spec.window_count),
    };
    Ok(windows)
}

fn partition_by_days(records: &[ResultRecord], days: u32, count: u32) -> Vec<TestWindows> {
    let Some(latest) = records.last().map(|r| r.timestamp) else {
        return Vec::new();
    };

    // An unrepresentable history span selects everything.
    let cutoff = i64::from(days)
        .checked_mul(i64::from(count))
        .and_then(TimeDelta::try_days)
        .and_then(|span| latest.checked_sub_signed(span));
    let start = cutoff.map_or(0, |cutoff| records.partition_point(|r| r.timestamp < cutoff));
    let selected = &records[start..];

    let Some(origin) = selected.first().map(|r| start_of_day(r.timestamp)) else {
        return Vec::new();
    };
    let bucket_seconds = i64::from(days) * 86_400;

    let mut by_test: BTreeMap<&str, BTreeMap<DateTime<Utc>, Vec<Status>>> = BTreeMap::new();
    for record in selected {
        let offset = (record.timestamp - origin).num_seconds();
        let bucket = offset.div_euclid(bucket_seconds);
        let key = origin + TimeDelta::seconds(bucket * bucket_seconds);
        by_test
            .entry(record.test_identifier.as_str())
            .or_default()
            .entry(key)
            .or_default()
            .push(record.status);
    }

    by_test
        .into_iter()
        .map(|(id, buckets)| TestWindows {
            test_identifier: id.to_string(),
            windows: buckets
                .into_iter()
                .map(|(start, statuses)| WindowRuns {
                    key: WindowKey::Calendar(start),
                    statuses,
                })
                .collect(),
        })
        .collect()
}

fn start_of_day(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn partition_by_runs(records: &[ResultRecord], size: u32, count: u32) -> Vec<TestWindows> {
    let mut by_test: BTreeMap<&str, Vec<Status>> = BTreeMap::new();
    for record in records {
        by_test
            .entry(record.test_identifier.as_str())
            .or_default()
            .push(record.status);
    }

    // Tests are independent; each test's windows are still built in order.
    let tests: Vec<(&str, Vec<Status>)> = by_test.into_iter().collect();
    tests
        .par_iter()
        .map(|(id, statuses)| TestWindows {
            test_identifier: (*id).to_string(),
            windows: run_windows(statuses, size, count),
        })
        .collect()
}

/// Group one test's chronological runs into the most recent `count` windows.
fn run_windows(statuses: &[Status], size: u32, count: u32) -> Vec<WindowRuns> {
    let mut windows: Vec<WindowRuns> = statuses
        .rchunks(size as usize)
        .take(count as usize)
        .zip((1..=count).rev())
        .map(|(chunk, label)| WindowRuns {
            key: WindowKey::Run(label),
            statuses: chunk.to_vec(),
        })
        .collect();
    windows.reverse();
    windows
}
