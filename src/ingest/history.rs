//! Precomputed test-history CSV reader.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::core::{parse_timestamp, Error, ResultRecord, Result, Status};

#[derive(Debug, Deserialize)]
struct Row {
    timestamp: String,
    test_identifier: String,
    test_status: String,
}

/// Read a history CSV file.
pub fn read_file(path: &Path) -> Result<Vec<ResultRecord>> {
    let file = std::fs::File::open(path)?;
    read_records(file, path)
}

/// Read history rows, dropping skipped runs.
///
/// `origin` names the input in errors.
pub fn read_records<R: Read>(reader: R, origin: &Path) -> Result<Vec<ResultRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (line, row) in rdr.deserialize::<Row>().enumerate() {
        let row = row
            .map_err(|e| Error::unsupported_format(origin, format!("row {}: {e}", line + 1)))?;
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| {
            Error::unsupported_format(
                origin,
                format!("row {}: invalid timestamp '{}'", line + 1, row.timestamp),
            )
        })?;
        let status = Status::parse_outcome(&row.test_status)
            .map_err(|e| Error::unsupported_format(origin, format!("row {}: {e}", line + 1)))?;

        match status {
            Some(status) => records.push(ResultRecord::new(timestamp, row.test_identifier, status)),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!("Dropped {} skipped runs from {}", skipped, origin.display());
    }
    Ok(records)
}
