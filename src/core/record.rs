//! Test-result records and the time-ordered ledger built from them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Error, Result};

/// Outcome of a single test run. Skipped runs never reach the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
    Error,
}

impl Status {
    /// Parse a raw status string, returning `None` for skipped runs.
    pub fn parse_outcome(s: &str) -> std::result::Result<Option<Self>, String> {
        match s.trim().to_lowercase().as_str() {
            "skipped" | "skip" => Ok(None),
            other => other.parse().map(Some),
        }
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pass" | "passed" | "success" => Ok(Self::Pass),
            "fail" | "failed" | "failure" => Ok(Self::Fail),
            "error" => Ok(Self::Error),
            _ => Err(format!("Unknown test status: {s}")),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// One timestamped test outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub timestamp: DateTime<Utc>,
    pub test_identifier: String,
    pub status: Status,
}

impl ResultRecord {
    pub fn new(timestamp: DateTime<Utc>, test_identifier: impl Into<String>, status: Status) -> Self {
        Self {
            timestamp,
            test_identifier: test_identifier.into(),
            status,
        }
    }
}

/// Records sorted ascending by timestamp. Never empty.
#[derive(Debug, Clone)]
pub struct Ledger {
    records: Vec<ResultRecord>,
}

impl Ledger {
    /// Build a ledger, sorting records by timestamp.
    ///
    /// The sort is stable: runs sharing a timestamp keep their ingestion order.
    pub fn new(mut records: Vec<ResultRecord>, source: impl Into<String>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::no_data(source));
        }
        records.sort_by_key(|r| r.timestamp);
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Timestamp of the most recent record.
    pub fn latest(&self) -> Option<DateTime<Utc>> {
        self.records.last().map(|r| r.timestamp)
    }

    /// Number of distinct test identifiers.
    pub fn test_count(&self) -> usize {
        let mut ids: Vec<&str> = self
            .records
            .iter()
            .map(|r| r.test_identifier.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a result timestamp.
///
/// Accepts RFC 3339, or naive ISO-8601 date-times and bare dates, which are
/// taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
