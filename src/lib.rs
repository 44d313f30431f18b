//! fliprate - rank flaky tests by how often their outcome flips.
//!
//! A test history (JUnit XML reports or a CSV of timestamped results) is
//! split into windows, either calendar days or fixed run counts. Each window
//! gets a flip rate, the share of adjacent runs whose status differs, and each
//! test's series is smoothed with an exponentially weighted moving average.
//! Tests are ranked by the smoothed value of their latest flipping window.
//!
//! # Example
//!
//! ```no_run
//! use fliprate::analysis::{Analyzer, Grouping};
//! use fliprate::config::Config;
//! use fliprate::core::{AnalysisContext, Analyzer as _};
//! use fliprate::ingest::Source;
//!
//! let config = Config::default();
//! let ledger = Source::JunitDir("test-results".into()).load().unwrap();
//! let ctx = AnalysisContext::new(&ledger, &config);
//! let analysis = Analyzer::new()
//!     .with_grouping(Grouping::Runs)
//!     .with_window_size(5)
//!     .with_window_count(3)
//!     .analyze(&ctx)
//!     .unwrap();
//! for ranked in &analysis.top {
//!     println!("{} --- score: {}", ranked.test_identifier, ranked.score);
//! }
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod core;
pub mod ingest;
pub mod output;
pub mod report;

pub use crate::core::{AnalysisContext, Analyzer, Error, Result};
