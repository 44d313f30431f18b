//! Top-N selection over each test's latest surviving window.

use std::collections::BTreeMap;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::{FlipRateEntry, FlipRateTable, WindowKey};
use crate::core::{Error, Result};

/// Upper bound on significant digits a score can be rounded to.
pub const MAX_PRECISION: u32 = 28;

/// One ranked test and its display score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedScore {
    pub rank: usize,
    pub test_identifier: String,
    /// Window the score was taken from.
    pub window: WindowKey,
    /// Unrounded smoothed flip rate.
    pub flip_rate_ewm: f64,
    /// Rounded for display only.
    pub score: Decimal,
}

/// The most recent surviving row of each test, ordered by identifier.
///
/// A test whose newest window had no flips falls back to its next most
/// recent row in the table.
pub fn latest_entries(table: &FlipRateTable) -> Vec<&FlipRateEntry> {
    let mut latest: BTreeMap<&str, &FlipRateEntry> = BTreeMap::new();
    for entry in table.entries() {
        latest
            .entry(entry.test_identifier.as_str())
            .and_modify(|current| {
                if entry.window > current.window {
                    *current = entry;
                }
            })
            .or_insert(entry);
    }
    latest.into_values().collect()
}

/// Select the `top_n` tests with the highest latest smoothed flip rate.
///
/// Ties keep identifier order. Fewer than `top_n` surviving tests yields all
/// of them; an empty table yields an empty ranking.
pub fn top_fliprates(
    table: &FlipRateTable,
    top_n: usize,
    precision: u32,
) -> Result<Vec<RankedScore>> {
    let mut latest = latest_entries(table);
    latest.sort_by(|a, b| b.flip_rate_ewm.total_cmp(&a.flip_rate_ewm));

    latest
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, entry)| {
            Ok(RankedScore {
                rank: i + 1,
                test_identifier: entry.test_identifier.clone(),
                window: entry.window,
                flip_rate_ewm: entry.flip_rate_ewm,
                score: round_score(entry.flip_rate_ewm, precision)?,
            })
        })
        .collect()
}

/// Round to `precision` significant digits, ties away from zero.
pub fn round_score(value: f64, precision: u32) -> Result<Decimal> {
    if precision == 0 || precision > MAX_PRECISION {
        return Err(Error::InvalidArgument(format!(
            "precision must be between 1 and {MAX_PRECISION}, got {precision}"
        )));
    }
    let decimal = Decimal::from_f64(value).ok_or_else(|| {
        Error::InvalidArgument(format!("score {value} is not representable as a decimal"))
    })?;
    if decimal.is_zero() {
        return Ok(Decimal::ZERO);
    }
    decimal
        .round_sf_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
        .map(|d| d.normalize())
        .ok_or_else(|| Error::InvalidArgument(format!("cannot round {value} to {precision} digits")))
}
