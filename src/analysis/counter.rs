//! Status-transition counting for a single window.

use crate::core::Status;

/// Accumulates runs of one test within one window, one status at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlipCounter {
    previous: Option<Status>,
    runs: usize,
    flips: usize,
}

impl FlipCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter by one run.
    pub fn push(&mut self, status: Status) {
        if self.previous.is_some_and(|prev| prev != status) {
            self.flips += 1;
        }
        self.previous = Some(status);
        self.runs += 1;
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn flips(&self) -> usize {
        self.flips
    }

    /// Maximum number of transitions the observed runs allow.
    pub fn possible_flips(&self) -> usize {
        self.runs.saturating_sub(1)
    }

    /// Flips over possible flips, 0.0 below two runs.
    pub fn rate(&self) -> f64 {
        if self.runs < 2 {
            return 0.0;
        }
        self.flips as f64 / self.possible_flips() as f64
    }
}

impl Extend<Status> for FlipCounter {
    fn extend<I: IntoIterator<Item = Status>>(&mut self, iter: I) {
        for status in iter {
            self.push(status);
        }
    }
}

impl FromIterator<Status> for FlipCounter {
    fn from_iter<I: IntoIterator<Item = Status>>(iter: I) -> Self {
        let mut counter = Self::new();
        counter.extend(iter);
        counter
    }
}

/// Flip rate of an ordered status sequence.
pub fn flip_rate(statuses: &[Status]) -> f64 {
    statuses.iter().copied().collect::<FlipCounter>().rate()
}
