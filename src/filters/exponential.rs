use super::low_pass::LowPass;
use super::{Sample, SmoothingFilter};

/// Single exponential smoothing filter
pub struct SingleExponentialFilter<T: Sample> {
    alpha: f64,
    stage: LowPass<T>,
}

impl<T: Sample> SingleExponentialFilter<T> {
    /// Create a new single exponential filter
    ///
    /// # Panics
    ///
    /// Panics if alpha is not in the range (0, 1]
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        assert!(alpha > 0.0 && alpha <= 1.0, "Alpha must be in (0, 1]");
        Self {
            alpha,
            stage: LowPass::new(),
        }
    }

    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl<T: Sample> SmoothingFilter<T> for SingleExponentialFilter<T> {
    fn apply(&mut self, raw: T) -> T {
        self.stage.filter(raw, self.alpha)
    }

    fn reset(&mut self) {
        self.stage.reset();
    }

    fn name(&self) -> &str {
        "SingleExponentialFilter"
    }
}
