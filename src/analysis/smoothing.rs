//! Exponentially weighted moving average over a test's window series.

/// Smoothing factor applied to every test's series.
pub const EWM_ALPHA: f64 = 0.1;

/// Recursive EWMA: the first value passes through, later values blend
/// `alpha * x + (1 - alpha) * previous`.
#[derive(Debug, Clone, Copy)]
pub struct Ewma {
    alpha: f64,
    value: Option<f64>,
}

impl Default for Ewma {
    fn default() -> Self {
        Self::new(EWM_ALPHA)
    }
}

impl Ewma {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, value: None }
    }

    /// Feed the next observation and return the smoothed value.
    pub fn update(&mut self, x: f64) -> f64 {
        let next = match self.value {
            None => x,
            Some(prev) => self.alpha * x + (1.0 - self.alpha) * prev,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}

/// Smooth a full series in order.
pub fn smooth(series: &[f64], alpha: f64) -> Vec<f64> {
    let mut ewma = Ewma::new(alpha);
    series.iter().map(|&x| ewma.update(x)).collect()
}
