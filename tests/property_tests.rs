use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use fliprate::analysis::ranking::round_score;
use fliprate::analysis::window::{partition, Grouping, WindowKey, WindowSpec};
use fliprate::analysis::{flip_rate, smooth, Analyzer, FlipRateTable, EWM_ALPHA};
use fliprate::config::Config;
use fliprate::core::{AnalysisContext, Analyzer as _, Ledger, ResultRecord, Status};

fn status() -> impl Strategy<Value = Status> {
    prop_oneof![Just(Status::Pass), Just(Status::Fail), Just(Status::Error)]
}

/// Records for a handful of tests, one run every seven hours.
fn history() -> impl Strategy<Value = Vec<ResultRecord>> {
    prop::collection::vec((0usize..4, status()), 1..120).prop_map(|runs| {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        runs.into_iter()
            .enumerate()
            .map(|(i, (test, status))| {
                ResultRecord::new(
                    start + Duration::hours(i as i64 * 7),
                    format!("suite::test_{test}"),
                    status,
                )
            })
            .collect()
    })
}

// ---------------------------------------------------------------------------
// Flip rate property tests
// ---------------------------------------------------------------------------

proptest! {
    /// A flip rate is always a fraction of the possible flips.
    #[test]
    fn flip_rate_is_bounded(statuses in prop::collection::vec(status(), 0..64)) {
        let rate = flip_rate(&statuses);
        prop_assert!((0.0..=1.0).contains(&rate), "rate out of range: {rate}");
    }

    /// Fewer than two runs cannot flip.
    #[test]
    fn single_run_never_flips(s in status()) {
        prop_assert_eq!(flip_rate(&[s]), 0.0);
    }

    /// Reversing the run order leaves the flip count unchanged.
    #[test]
    fn flip_rate_is_order_symmetric(statuses in prop::collection::vec(status(), 0..64)) {
        let mut reversed = statuses.clone();
        reversed.reverse();
        prop_assert_eq!(flip_rate(&statuses), flip_rate(&reversed));
    }

    /// Smoothing a bounded series stays within the series bounds.
    #[test]
    fn smoothing_stays_within_bounds(series in prop::collection::vec(0.0f64..=1.0, 1..32)) {
        let smoothed = smooth(&series, EWM_ALPHA);
        prop_assert_eq!(smoothed.len(), series.len());
        prop_assert_eq!(smoothed[0], series[0]);
        for value in smoothed {
            prop_assert!((0.0..=1.0 + 1e-12).contains(&value));
        }
    }
}

// ---------------------------------------------------------------------------
// Window partitioning property tests
// ---------------------------------------------------------------------------

proptest! {
    /// Run windows never exceed the window count, and the newest is labelled W.
    #[test]
    fn run_windows_are_bounded(
        records in history(),
        size in 1u32..8,
        count in 1u32..6,
    ) {
        let ledger = Ledger::new(records, "prop").unwrap();
        let spec = WindowSpec::new(Grouping::Runs, size, count);
        let tests = partition(ledger.records(), &spec).unwrap();

        for test in &tests {
            prop_assert!(!test.windows.is_empty());
            prop_assert!(test.windows.len() <= count as usize);
            prop_assert_eq!(&test.windows.last().unwrap().key, &WindowKey::Run(count));
            for window in &test.windows {
                prop_assert!(!window.statuses.is_empty());
                prop_assert!(window.statuses.len() <= size as usize);
            }
            let keys: Vec<_> = test.windows.iter().map(|w| w.key).collect();
            let mut sorted = keys.clone();
            sorted.sort();
            prop_assert_eq!(keys, sorted);
        }
    }

    /// Calendar windows only hold records inside the look-back period.
    #[test]
    fn day_windows_respect_lookback(
        records in history(),
        size in 1u32..4,
        count in 1u32..4,
    ) {
        let ledger = Ledger::new(records, "prop").unwrap();
        let latest = ledger.latest().unwrap();
        let cutoff = latest - Duration::days(i64::from(size * count));
        let expected = ledger.records().iter().filter(|r| r.timestamp >= cutoff).count();

        let spec = WindowSpec::new(Grouping::Days, size, count);
        let tests = partition(ledger.records(), &spec).unwrap();
        let assigned: usize = tests
            .iter()
            .flat_map(|t| &t.windows)
            .map(|w| w.statuses.len())
            .sum();
        prop_assert_eq!(assigned, expected);
    }

    /// Only windows with a nonzero flip rate survive into the table.
    #[test]
    fn table_has_no_zero_rows(records in history(), size in 1u32..6, count in 1u32..5) {
        let ledger = Ledger::new(records, "prop").unwrap();
        let spec = WindowSpec::new(Grouping::Runs, size, count);
        let tests = partition(ledger.records(), &spec).unwrap();
        let table = FlipRateTable::compute(&tests, EWM_ALPHA);
        for entry in table.entries() {
            prop_assert!(entry.flip_rate > 0.0);
            prop_assert!(entry.flip_rate_ewm > 0.0);
        }
    }
}

// ---------------------------------------------------------------------------
// Ranking property tests
// ---------------------------------------------------------------------------

proptest! {
    /// Analysis of the same ledger is repeatable and ranked descending.
    #[test]
    fn analysis_is_deterministic_and_sorted(records in history(), top_n in 1usize..6) {
        let ledger = Ledger::new(records, "prop").unwrap();
        let config = Config::default();
        let ctx = AnalysisContext::new(&ledger, &config);
        let analyzer = Analyzer::new().with_window_size(3).with_window_count(4).with_top_n(top_n);

        let first = analyzer.analyze(&ctx).unwrap();
        let second = analyzer.analyze(&ctx).unwrap();

        prop_assert!(first.top.len() <= top_n);
        prop_assert_eq!(
            serde_json::to_string(&first.top).unwrap(),
            serde_json::to_string(&second.top).unwrap()
        );
        for pair in first.top.windows(2) {
            prop_assert!(pair[0].flip_rate_ewm >= pair[1].flip_rate_ewm);
        }
    }

    /// Rounding never changes the sign and stays close to the input.
    #[test]
    fn rounding_stays_close(value in 0.0f64..=1.0, precision in 1u32..10) {
        let rounded = round_score(value, precision).unwrap();
        let back: f64 = rounded.to_string().parse().unwrap();
        prop_assert!(back >= 0.0);
        prop_assert!((back - value).abs() <= 10f64.powi(1 - precision as i32));
    }
}
