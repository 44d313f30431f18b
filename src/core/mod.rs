//! Core types and traits for flip-rate analysis.

mod analyzer;
mod error;
mod record;

pub use analyzer::{AnalysisContext, Analyzer, Summary};
pub use error::{Error, Result};
pub use record::{parse_timestamp, Ledger, ResultRecord, Status};
