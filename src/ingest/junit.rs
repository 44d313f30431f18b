//! JUnit XML report reader.
//!
//! A report is either a `<testsuites>` container or a bare `<testsuite>`.
//! Every `<testcase>` becomes one record stamped with its suite's
//! `timestamp`; the first `<failure>`, `<error>` or `<skipped>` child decides
//! the outcome, no child means pass.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use walkdir::WalkDir;

use crate::core::{parse_timestamp, Error, ResultRecord, Result, Status};

/// Parsed report, by root element.
#[derive(Debug, Clone, PartialEq)]
pub enum JunitDocument {
    /// `<testsuites>` root.
    Suites(Vec<TestSuite>),
    /// `<testsuite>` root.
    Suite(TestSuite),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestSuite {
    pub name: Option<String>,
    pub timestamp: Option<String>,
    pub cases: Vec<TestCase>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub classname: String,
    pub name: String,
    pub outcome: Option<Outcome>,
}

/// Non-passing result element of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Failure,
    Error,
    Skipped,
}

impl TestCase {
    pub fn identifier(&self) -> String {
        format!("{}::{}", self.classname, self.name)
    }

    /// Ledger status, `None` when skipped.
    pub fn status(&self) -> Option<Status> {
        match self.outcome {
            None => Some(Status::Pass),
            Some(Outcome::Failure) => Some(Status::Fail),
            Some(Outcome::Error) => Some(Status::Error),
            Some(Outcome::Skipped) => None,
        }
    }
}

impl JunitDocument {
    /// Parse report content. `path` names the report in errors.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);
        let mut parser = Parser::new(path);

        loop {
            let event = reader
                .read_event()
                .map_err(|e| Error::unsupported_format(path, e.to_string()))?;
            match event {
                Event::Start(e) => parser.open(&e, false)?,
                Event::Empty(e) => parser.open(&e, true)?,
                Event::End(e) => parser.close(e.local_name().as_ref()),
                Event::Eof => break,
                _ => {}
            }
        }

        parser.finish()
    }

    pub fn suites(&self) -> &[TestSuite] {
        match self {
            Self::Suites(suites) => suites,
            Self::Suite(suite) => std::slice::from_ref(suite),
        }
    }

    /// Flatten to records, dropping skipped cases.
    pub fn into_records(self, path: &Path) -> Result<Vec<ResultRecord>> {
        let mut records = Vec::new();
        for suite in self.suites() {
            let mut cases = suite
                .cases
                .iter()
                .filter_map(|case| case.status().map(|status| (case, status)))
                .peekable();
            if cases.peek().is_none() {
                continue;
            }

            let raw = suite.timestamp.as_deref().ok_or_else(|| {
                Error::unsupported_format(path, format!("{} has no timestamp", suite_label(suite)))
            })?;
            let timestamp = parse_timestamp(raw).ok_or_else(|| {
                Error::unsupported_format(
                    path,
                    format!("{} has invalid timestamp '{raw}'", suite_label(suite)),
                )
            })?;

            records.extend(
                cases.map(|(case, status)| ResultRecord::new(timestamp, case.identifier(), status)),
            );
        }
        Ok(records)
    }
}

fn suite_label(suite: &TestSuite) -> String {
    match &suite.name {
        Some(name) => format!("test suite '{name}'"),
        None => "test suite".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    Suites,
    Suite,
}

struct Parser<'p> {
    path: &'p Path,
    root: Option<Root>,
    open_suites: Vec<TestSuite>,
    finished: Vec<TestSuite>,
    case: Option<TestCase>,
}

impl<'p> Parser<'p> {
    fn new(path: &'p Path) -> Self {
        Self {
            path,
            root: None,
            open_suites: Vec::new(),
            finished: Vec::new(),
            case: None,
        }
    }

    fn open(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<()> {
        let name = e.local_name();
        let name = name.as_ref();

        if self.root.is_none() {
            self.root = Some(match name {
                b"testsuites" => Root::Suites,
                b"testsuite" => Root::Suite,
                other => {
                    return Err(Error::unsupported_format(
                        self.path,
                        format!(
                            "unknown root element <{}>",
                            String::from_utf8_lossy(other)
                        ),
                    ))
                }
            });
        }

        match name {
            b"testsuite" => {
                let suite = TestSuite {
                    name: self.attr(e, "name")?,
                    timestamp: self.attr(e, "timestamp")?,
                    cases: Vec::new(),
                };
                self.open_suites.push(suite);
                if empty {
                    self.close(b"testsuite");
                }
            }
            b"testcase" => {
                if self.open_suites.is_empty() {
                    return Err(Error::unsupported_format(
                        self.path,
                        "<testcase> outside of a <testsuite>",
                    ));
                }
                self.case = Some(TestCase {
                    classname: self.attr(e, "classname")?.unwrap_or_default(),
                    name: self.attr(e, "name")?.unwrap_or_default(),
                    outcome: None,
                });
                if empty {
                    self.close(b"testcase");
                }
            }
            b"failure" | b"error" | b"skipped" => {
                let outcome = match name {
                    b"failure" => Outcome::Failure,
                    b"error" => Outcome::Error,
                    _ => Outcome::Skipped,
                };
                if let Some(case) = self.case.as_mut() {
                    case.outcome.get_or_insert(outcome);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"testcase" => {
                if let (Some(case), Some(suite)) = (self.case.take(), self.open_suites.last_mut()) {
                    suite.cases.push(case);
                }
            }
            b"testsuite" => {
                if let Some(suite) = self.open_suites.pop() {
                    self.finished.push(suite);
                }
            }
            _ => {}
        }
    }

    fn attr(&self, e: &BytesStart<'_>, key: &str) -> Result<Option<String>> {
        let attribute = e
            .try_get_attribute(key)
            .map_err(|err| Error::unsupported_format(self.path, err.to_string()))?;
        attribute
            .map(|a| {
                a.unescape_value()
                    .map(|v| v.into_owned())
                    .map_err(|err| Error::unsupported_format(self.path, err.to_string()))
            })
            .transpose()
    }

    fn finish(mut self) -> Result<JunitDocument> {
        match self.root {
            None => Err(Error::unsupported_format(self.path, "document has no root element")),
            Some(Root::Suite) if self.finished.len() == 1 => {
                Ok(JunitDocument::Suite(self.finished.remove(0)))
            }
            // A single suite nesting further suites reads like a container.
            Some(_) => Ok(JunitDocument::Suites(self.finished)),
        }
    }
}

/// Read every `*.xml` report directly inside `dir`, in file-name order.
pub fn read_dir(dir: &Path) -> Result<Vec<ResultRecord>> {
    let mut records = Vec::new();
    let mut files = 0usize;

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("xml")
        {
            continue;
        }

        let content = String::from_utf8(std::fs::read(path)?)
            .map_err(|e| Error::unsupported_format(path, format!("report is not UTF-8: {e}")))?;
        let document = JunitDocument::parse(&content, path)?;
        let before = records.len();
        records.extend(document.into_records(path)?);
        files += 1;
        tracing::debug!(
            "Read {} test results from {}",
            records.len() - before,
            path.display()
        );
    }

    tracing::info!("Read {} JUnit reports from {}", files, dir.display());
    Ok(records)
}
