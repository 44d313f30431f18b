//! CLI implementation using clap.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};

use crate::analysis::Grouping;
use crate::config::{self, Config};
use crate::ingest::Source;

/// fliprate - Find the tests whose results flip between pass and fail most often.
#[derive(Parser, Debug)]
#[command(name = "fliprate")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["junit_files", "test_history_csv"])))]
pub struct Cli {
    /// Path for a folder with JUnit xml test history files
    #[arg(long)]
    pub junit_files: Option<PathBuf>,

    /// Path for precomputed test history csv
    #[arg(long)]
    pub test_history_csv: Option<PathBuf>,

    /// Flip rate calculation method - days or runs
    #[arg(long, value_enum)]
    pub grouping_option: Option<GroupingOption>,

    /// Flip rate calculation window size
    #[arg(long)]
    pub window_size: Option<u32>,

    /// Flip rate calculation window count (history size)
    #[arg(long)]
    pub window_count: Option<u32>,

    /// Amount of unique tests and scores to print out
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Precision of the flip rate score (significant digits)
    #[arg(short, long)]
    pub precision: Option<u32>,

    /// Write an HTML heatmap of the top tests
    #[arg(long)]
    pub heatmap: bool,

    /// Directory for the heatmap file
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The input selected on the command line.
    pub fn source(&self) -> Option<Source> {
        match (&self.junit_files, &self.test_history_csv) {
            (Some(dir), _) => Some(Source::JunitDir(dir.clone())),
            (None, Some(csv)) => Some(Source::HistoryCsv(csv.clone())),
            (None, None) => None,
        }
    }

    /// Overlay command-line flags on loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        let analysis = &mut config.analysis;
        if let Some(grouping) = self.grouping_option {
            analysis.grouping = grouping.into();
        }
        if let Some(window_size) = self.window_size {
            analysis.window_size = window_size;
        }
        if let Some(window_count) = self.window_count {
            analysis.window_count = window_count;
        }
        if let Some(top_n) = self.top_n {
            analysis.top_n = top_n;
        }
        if let Some(precision) = self.precision {
            analysis.precision = precision;
        }
        if self.heatmap {
            config.heatmap.enabled = true;
        }
        if let Some(dir) = &self.output_dir {
            config.heatmap.output_dir = dir.clone();
        }
        if let Some(format) = self.format {
            config.output.format = format.into();
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GroupingOption {
    Days,
    Runs,
}

impl From<GroupingOption> for Grouping {
    fn from(option: GroupingOption) -> Self {
        match option {
            GroupingOption::Days => Grouping::Days,
            GroupingOption::Runs => Grouping::Runs,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Text,
}

impl From<OutputFormat> for config::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => config::OutputFormat::Json,
            OutputFormat::Markdown => config::OutputFormat::Markdown,
            OutputFormat::Text => config::OutputFormat::Text,
        }
    }
}
