//! Test-result ingestion.
//!
//! Turns a JUnit XML directory or a precomputed test-history CSV into a
//! time-ordered [`Ledger`]. Skipped runs are dropped here; nothing downstream
//! ever sees them.

pub mod history;
pub mod junit;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::{Ledger, Result};

/// Where test results are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Directory holding JUnit `*.xml` report files.
    JunitDir(PathBuf),
    /// CSV with `timestamp,test_identifier,test_status` columns.
    HistoryCsv(PathBuf),
}

impl Source {
    pub fn path(&self) -> &Path {
        match self {
            Self::JunitDir(path) | Self::HistoryCsv(path) => path,
        }
    }

    /// Read every record from the source into a sorted ledger.
    pub fn load(&self) -> Result<Ledger> {
        let records = match self {
            Self::JunitDir(dir) => junit::read_dir(dir)?,
            Self::HistoryCsv(path) => history::read_file(path)?,
        };
        tracing::debug!("Loaded {} test results from {}", records.len(), self);
        Ledger::new(records, self.to_string())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}
