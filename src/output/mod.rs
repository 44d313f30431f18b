//! Output formatters for the flaky-test ranking.

use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::analysis::Analysis;
use crate::core::{Result, Summary};

/// Output format enum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    Json,
    Markdown,
    #[default]
    Text,
}

/// Serializable view of the ranking.
#[derive(Debug, Serialize)]
pub struct RankingReport<'a> {
    pub title: String,
    pub flaky_tests: Vec<RankingRow<'a>>,
    pub summary: &'a Summary,
}

#[derive(Debug, Serialize)]
pub struct RankingRow<'a> {
    pub rank: usize,
    pub test_identifier: &'a str,
    pub score: Decimal,
}

impl<'a> RankingReport<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Self {
            title: analysis.ranking_title(),
            flaky_tests: analysis
                .top
                .iter()
                .map(|r| RankingRow {
                    rank: r.rank,
                    test_identifier: &r.test_identifier,
                    score: r.score,
                })
                .collect(),
            summary: &analysis.summary,
        }
    }
}

impl Format {
    /// Write the ranking, or "No flaky tests." in text mode when it is empty.
    pub fn write_ranking<W: Write>(&self, analysis: &Analysis, writer: &mut W) -> Result<()> {
        match self {
            Format::Json => format_json(&RankingReport::new(analysis), writer),
            Format::Markdown => format_markdown(&RankingReport::new(analysis), writer),
            Format::Text => format_text(analysis, writer),
        }
    }
}

fn format_text<W: Write>(analysis: &Analysis, writer: &mut W) -> Result<()> {
    if !analysis.has_flaky_tests() {
        writeln!(writer, "No flaky tests.")?;
        return Ok(());
    }
    writeln!(writer, "{}", analysis.ranking_title())?;
    for ranked in &analysis.top {
        writeln!(writer, "{} --- score: {}", ranked.test_identifier, ranked.score)?;
    }
    Ok(())
}

fn format_json<T: Serialize, W: Write>(data: &T, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, data)?;
    writeln!(writer)?;
    Ok(())
}

fn format_markdown<W: Write>(report: &RankingReport<'_>, writer: &mut W) -> Result<()> {
    writeln!(writer, "# {}\n", report.title)?;

    if report.flaky_tests.is_empty() {
        writeln!(writer, "_No flaky tests_\n")?;
    } else {
        writeln!(writer, "| Rank | Test Identifier | Score |")?;
        writeln!(writer, "| ---: | --- | ---: |")?;
        for row in &report.flaky_tests {
            writeln!(
                writer,
                "| {} | {} | {} |",
                row.rank,
                row.test_identifier.replace('|', "\\|"),
                row.score
            )?;
        }
        writeln!(writer)?;
    }

    let summary = report.summary;
    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- Records analyzed: {}", summary.records_analyzed)?;
    writeln!(writer, "- Tests analyzed: {}", summary.tests_analyzed)?;
    writeln!(writer, "- Windows evaluated: {}", summary.windows_evaluated)?;
    writeln!(writer, "- Flaky tests: {}", summary.flaky_tests)?;
    Ok(())
}
