//! Flip-rate analyzer - windowed test outcome volatility.
//!
//! A flip is a change of outcome between two adjacent runs of the same test.
//! Each test's history is split into windows (calendar days or run counts),
//! every window gets a flip rate `flips / (runs - 1)`, and the per-test
//! series is smoothed with an exponentially weighted moving average
//! (alpha = 0.1). Tests are ranked by the smoothed value of their most recent
//! window that saw at least one flip.
//!
//! # Pipeline
//!
//! ```text
//! ledger -> window::partition -> counter::flip_rate -> smoothing::Ewma
//!        -> FlipRateTable (zero-flip rows dropped)
//!        -> ranking::top_fliprates / matrix::HeatmapMatrix
//! ```

pub mod counter;
pub mod matrix;
pub mod ranking;
pub mod smoothing;
pub mod window;

use std::time::Instant;

use serde::Serialize;

use crate::config::{AnalysisConfig, Config};
use crate::core::{AnalysisContext, Analyzer as AnalyzerTrait, Result, Summary};

pub use counter::{flip_rate, FlipCounter};
pub use matrix::HeatmapMatrix;
pub use ranking::{round_score, top_fliprates, RankedScore};
pub use smoothing::{smooth, Ewma, EWM_ALPHA};
pub use window::{partition, Grouping, TestWindows, WindowKey, WindowRuns, WindowSpec};

/// Raw and smoothed flip rate of one test in one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlipRateEntry {
    pub test_identifier: String,
    pub window: WindowKey,
    pub flip_rate: f64,
    pub flip_rate_ewm: f64,
}

/// Flip-rate rows with nonzero raw flip rate.
///
/// Rows are ordered by test identifier, then window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FlipRateTable {
    entries: Vec<FlipRateEntry>,
}

impl FlipRateTable {
    /// Compute the table from partitioned windows.
    ///
    /// Zero-flip windows still advance the smoothing before being dropped.
    pub fn compute(tests: &[TestWindows], alpha: f64) -> Self {
        let mut entries = Vec::new();
        for test in tests {
            let mut ewma = Ewma::new(alpha);
            for window in &test.windows {
                let rate = flip_rate(&window.statuses);
                let smoothed = ewma.update(rate);
                if rate != 0.0 {
                    entries.push(FlipRateEntry {
                        test_identifier: test.test_identifier.clone(),
                        window: window.key,
                        flip_rate: rate,
                        flip_rate_ewm: smoothed,
                    });
                }
            }
        }
        Self { entries }
    }

    /// Wrap already-computed rows.
    pub fn from_entries(entries: Vec<FlipRateEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[FlipRateEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct tests with at least one row.
    pub fn test_count(&self) -> usize {
        let mut ids: Vec<&str> = self
            .entries
            .iter()
            .map(|e| e.test_identifier.as_str())
            .collect();
        ids.dedup();
        ids.len()
    }
}

/// Flip-rate analyzer.
#[derive(Debug, Clone)]
pub struct Analyzer {
    spec: WindowSpec,
    top_n: usize,
    precision: u32,
    alpha: f64,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            spec: WindowSpec::new(config.grouping, config.window_size, config.window_count),
            top_n: config.top_n,
            precision: config.precision,
            alpha: EWM_ALPHA,
        }
    }

    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.spec.grouping = grouping;
        self
    }

    pub fn with_window_size(mut self, window_size: u32) -> Self {
        self.spec.window_size = window_size;
        self
    }

    pub fn with_window_count(mut self, window_count: u32) -> Self {
        self.spec.window_count = window_count;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn spec(&self) -> &WindowSpec {
        &self.spec
    }
}

impl AnalyzerTrait for Analyzer {
    type Output = Analysis;

    fn name(&self) -> &'static str {
        "fliprate"
    }

    fn description(&self) -> &'static str {
        "Rank tests by smoothed flip rate of their pass/fail history"
    }

    fn configure(&mut self, config: &Config) -> Result<()> {
        *self = Self::from_config(&config.analysis);
        Ok(())
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Self::Output> {
        let start = Instant::now();
        let records = ctx.ledger.records();

        let tests = partition(records, &self.spec)?;
        let windows_evaluated = tests.iter().map(|t| t.windows.len()).sum();
        let table = FlipRateTable::compute(&tests, self.alpha);
        let top = top_fliprates(&table, self.top_n, self.precision)?;

        let summary = Summary {
            records_analyzed: records.len(),
            tests_analyzed: ctx.ledger.test_count(),
            windows_evaluated,
            flaky_tests: table.test_count(),
            duration: start.elapsed(),
        };

        tracing::info!(
            "Flip rate analysis completed in {:?}: {} windows, {} flaky tests",
            summary.duration,
            windows_evaluated,
            summary.flaky_tests
        );

        Ok(Analysis {
            grouping: self.spec.grouping,
            window_size: self.spec.window_size,
            window_count: self.spec.window_count,
            alpha: self.alpha,
            top_n: self.top_n,
            table,
            top,
            summary,
        })
    }
}

/// Full flip-rate analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub grouping: Grouping,
    pub window_size: u32,
    pub window_count: u32,
    pub alpha: f64,
    pub top_n: usize,
    pub table: FlipRateTable,
    pub top: Vec<RankedScore>,
    pub summary: Summary,
}

impl Analysis {
    /// At least one test flipped in a selected window and made the ranking.
    pub fn has_flaky_tests(&self) -> bool {
        !self.top.is_empty()
    }

    /// Matrix of the ranked tests for heatmap rendering.
    pub fn matrix(&self) -> HeatmapMatrix {
        HeatmapMatrix::build(
            &self.table,
            self.top.iter().map(|r| r.test_identifier.as_str()),
        )
    }

    /// Heading for the ranking printout.
    pub fn ranking_title(&self) -> String {
        format!(
            "Top {} flaky tests based on latest window exponential weighted moving average fliprate score",
            self.top_n
        )
    }

    /// Heading for the heatmap.
    pub fn heatmap_title(&self) -> String {
        let history = self.window_size.saturating_mul(self.window_count);
        match self.grouping {
            Grouping::Days => format!(
                "Top {} of tests with highest latest window exponentially weighted moving average \
                 fliprate score - alpha (smoothing factor) = {} - last {} days of data",
                self.top_n, self.alpha, history
            ),
            Grouping::Runs => format!(
                "Top {} of tests with highest latest window exponentially weighted moving average \
                 fliprate score - alpha (smoothing factor) = {} - {} last runs fliprate and {} last \
                 runs data",
                self.top_n, self.alpha, self.window_size, history
            ),
        }
    }

    /// File name for the heatmap, without extension.
    pub fn heatmap_stem(&self) -> String {
        let unit = match self.grouping {
            Grouping::Days => "day",
            Grouping::Runs => "runs",
        };
        format!(
            "{}{}_flip_rate_ewm_top{}",
            self.window_size, unit, self.top_n
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Ledger, ResultRecord, Status};
    use chrono::{DateTime, TimeZone, Utc};
    use Status::{Fail, Pass};

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, minute, 0).unwrap()
    }

    fn ledger(runs: &[(&str, Status)]) -> Ledger {
        let records = runs
            .iter()
            .enumerate()
            .map(|(i, (id, status))| ResultRecord::new(at(i as u32), *id, *status))
            .collect();
        Ledger::new(records, "test").unwrap()
    }

    fn windows(id: &str, series: &[&[Status]]) -> TestWindows {
        TestWindows {
            test_identifier: id.to_string(),
            windows: series
                .iter()
                .enumerate()
                .map(|(i, statuses)| WindowRuns {
                    key: WindowKey::Run(i as u32 + 1),
                    statuses: statuses.to_vec(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_analyzer_creation() {
        let analyzer = Analyzer::new();
        assert_eq!(analyzer.name(), "fliprate");
        assert_eq!(analyzer.spec().grouping, Grouping::Runs);
    }

    #[test]
    fn test_analyzer_builders() {
        let analyzer = Analyzer::new()
            .with_grouping(Grouping::Days)
            .with_window_size(7)
            .with_window_count(4)
            .with_top_n(3)
            .with_precision(2);
        assert_eq!(analyzer.spec(), &WindowSpec::new(Grouping::Days, 7, 4));
        assert_eq!(analyzer.top_n, 3);
        assert_eq!(analyzer.precision, 2);
    }

    #[test]
    fn test_compute_drops_zero_rows_but_smooths_through_them() {
        let tests = vec![windows(
            "a",
            &[&[Pass, Fail, Fail, Pass, Pass], &[Pass, Pass], &[Pass, Fail, Fail, Pass, Pass]],
        )];
        let table = FlipRateTable::compute(&tests, EWM_ALPHA);

        assert_eq!(table.len(), 2);
        assert!(table.entries().iter().all(|e| e.flip_rate != 0.0));
        assert_eq!(table.entries()[1].window, WindowKey::Run(3));
        assert!((table.entries()[1].flip_rate_ewm - 0.455).abs() < 1e-12);
    }

    #[test]
    fn test_zero_window_changes_following_ewm() {
        let with_zero = FlipRateTable::compute(
            &[windows("a", &[&[Pass, Fail], &[Pass, Pass], &[Pass, Fail]])],
            EWM_ALPHA,
        );
        let without_zero = FlipRateTable::compute(
            &[windows("a", &[&[Pass, Fail], &[Pass, Fail]])],
            EWM_ALPHA,
        );
        let last_with = with_zero.entries().last().unwrap().flip_rate_ewm;
        let last_without = without_zero.entries().last().unwrap().flip_rate_ewm;
        assert!((last_with - 0.91).abs() < 1e-12);
        assert!((last_without - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_record_test_never_ranks() {
        let ledger = ledger(&[("once", Pass), ("flaky", Pass), ("flaky", Fail)]);
        let config = Config::default();
        let ctx = AnalysisContext::new(&ledger, &config);
        let analysis = Analyzer::new().analyze(&ctx).unwrap();

        assert!(analysis
            .table
            .entries()
            .iter()
            .all(|e| e.test_identifier != "once"));
        assert_eq!(analysis.top.len(), 1);
        assert_eq!(analysis.top[0].test_identifier, "flaky");
        assert_eq!(analysis.summary.tests_analyzed, 2);
    }

    #[test]
    fn test_no_flaky_tests() {
        let ledger = ledger(&[("a", Pass), ("a", Pass), ("b", Fail), ("b", Fail)]);
        let config = Config::default();
        let ctx = AnalysisContext::new(&ledger, &config);
        let analysis = Analyzer::new().analyze(&ctx).unwrap();

        assert!(!analysis.has_flaky_tests());
        assert!(analysis.table.is_empty());
        assert!(analysis.matrix().is_empty());
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let ledger = ledger(&[
            ("b", Pass),
            ("a", Fail),
            ("b", Fail),
            ("a", Pass),
            ("c", Pass),
            ("c", Fail),
            ("b", Pass),
        ]);
        let config = Config::default();
        let ctx = AnalysisContext::new(&ledger, &config);
        let analyzer = Analyzer::new().with_window_size(2);

        let first = serde_json::to_string(&analyzer.analyze(&ctx).unwrap()).unwrap();
        let second = serde_json::to_string(&analyzer.analyze(&ctx).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_heatmap_naming() {
        let ledger = ledger(&[("a", Pass), ("a", Fail)]);
        let config = Config::default();
        let ctx = AnalysisContext::new(&ledger, &config);
        let analysis = Analyzer::new()
            .with_window_size(5)
            .with_top_n(10)
            .analyze(&ctx)
            .unwrap();
        assert_eq!(analysis.heatmap_stem(), "5runs_flip_rate_ewm_top10");
        assert!(analysis.heatmap_title().contains("15 last runs data"));
    }
}
