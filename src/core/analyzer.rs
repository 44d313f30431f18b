//! Analyzer trait and common types.

use std::time::Duration;

use serde::Serialize;

use super::{Ledger, Result};
use crate::config::Config;

/// Trait implemented by ledger analyzers.
pub trait Analyzer: Send + Sync {
    /// The result type produced by this analyzer.
    type Output: Serialize + Send;

    /// Unique identifier for this analyzer.
    fn name(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// Run analysis and return results.
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Self::Output>;

    /// Configure the analyzer from config.
    fn configure(&mut self, _config: &Config) -> Result<()> {
        Ok(())
    }
}

/// Context shared by analyzers during analysis.
pub struct AnalysisContext<'a> {
    /// Time-ordered test results.
    pub ledger: &'a Ledger,
    /// Configuration.
    pub config: &'a Config,
}

impl<'a> AnalysisContext<'a> {
    /// Create a new analysis context.
    pub fn new(ledger: &'a Ledger, config: &'a Config) -> Self {
        Self { ledger, config }
    }
}

/// Quick summary statistics for display.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    /// Number of records analyzed.
    pub records_analyzed: usize,
    /// Number of distinct tests seen.
    pub tests_analyzed: usize,
    /// Number of (test, window) pairs evaluated, zero-flip ones included.
    pub windows_evaluated: usize,
    /// Number of tests with a nonzero flip rate in some window.
    pub flaky_tests: usize,
    /// Analysis duration.
    #[serde(skip)]
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_default() {
        let summary = Summary::default();
        assert_eq!(summary.records_analyzed, 0);
        assert_eq!(summary.flaky_tests, 0);
    }

    #[test]
    fn test_summary_serialization_skips_duration() {
        let summary = Summary {
            records_analyzed: 10,
            tests_analyzed: 2,
            windows_evaluated: 4,
            flaky_tests: 1,
            duration: Duration::from_millis(20),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["records_analyzed"], 10);
        assert!(json.get("duration").is_none());
    }
}
