use super::{Sample, SmoothingFilter};

/// Double exponential smoothing (Holt's linear trend).
///
/// Tracks a smoothed level and a trend; the trend extrapolates motion and
/// removes most of the lag single exponential smoothing introduces.
pub struct DoubleExponentialFilter<T: Sample> {
    alpha: f64,
    beta: f64,
    level: T,
    trend: T,
    initialized: bool,
}

impl<T: Sample> DoubleExponentialFilter<T> {
    /// Create a new double exponential filter
    ///
    /// # Panics
    ///
    /// Panics if alpha or beta is not in the range [0, 1]
    #[must_use]
    pub fn new(alpha: f64, beta: f64) -> Self {
        assert!((0.0..=1.0).contains(&alpha), "Alpha must be in [0, 1]");
        assert!((0.0..=1.0).contains(&beta), "Beta must be in [0, 1]");
        Self {
            alpha,
            beta,
            level: T::zero(),
            trend: T::zero(),
            initialized: false,
        }
    }

    /// Current trend (per-sample velocity estimate)
    #[must_use]
    pub const fn trend(&self) -> T {
        self.trend
    }

    /// Current smoothed level
    #[must_use]
    pub const fn level(&self) -> T {
        self.level
    }
}

impl<T: Sample> SmoothingFilter<T> for DoubleExponentialFilter<T> {
    fn apply(&mut self, raw: T) -> T {
        if !self.initialized {
            self.level = raw;
            self.trend = T::zero();
            self.initialized = true;
            return raw;
        }

        let level = raw * self.alpha + (self.level + self.trend) * (1.0 - self.alpha);
        let trend = (level - self.level) * self.beta + self.trend * (1.0 - self.beta);

        self.level = level;
        self.trend = trend;

        level
    }

    fn reset(&mut self) {
        self.level = T::zero();
        self.trend = T::zero();
        self.initialized = false;
    }

    fn name(&self) -> &str {
        "DoubleExponentialFilter"
    }
}
