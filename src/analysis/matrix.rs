//! Sparse (test x window) matrix of smoothed flip rates for rendering.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use super::{FlipRateTable, WindowKey};

/// Rows are the selected tests, columns every window in the table.
///
/// Cells without a surviving row stay `None` rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeatmapMatrix {
    pub tests: Vec<String>,
    pub windows: Vec<WindowKey>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl HeatmapMatrix {
    /// Pivot the table, keeping only rows for `selected` tests.
    pub fn build<'a>(table: &FlipRateTable, selected: impl IntoIterator<Item = &'a str>) -> Self {
        let selected: HashSet<&str> = selected.into_iter().collect();

        let windows: Vec<WindowKey> = table
            .entries()
            .iter()
            .map(|e| e.window)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let tests: Vec<String> = table
            .entries()
            .iter()
            .map(|e| e.test_identifier.as_str())
            .filter(|id| selected.contains(id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let cells: HashMap<(&str, WindowKey), f64> = table
            .entries()
            .iter()
            .map(|e| ((e.test_identifier.as_str(), e.window), e.flip_rate_ewm))
            .collect();

        let values = tests
            .iter()
            .map(|test| {
                windows
                    .iter()
                    .map(|w| cells.get(&(test.as_str(), *w)).copied())
                    .collect()
            })
            .collect();

        Self {
            tests,
            windows,
            values,
        }
    }

    /// Value at (test, window), `None` if no row exists.
    pub fn get(&self, test: &str, window: &WindowKey) -> Option<f64> {
        let row = self.tests.iter().position(|t| t == test)?;
        let col = self.windows.iter().position(|w| w == window)?;
        self.values[row][col]
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}
