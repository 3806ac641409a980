use super::Sample;

/// First-order low-pass stage with a per-call smoothing factor.
///
/// Keeps both the last raw input and the last smoothed output; the one-euro
/// filter needs the raw history for its derivative estimate.
#[derive(Debug, Clone, Copy)]
pub struct LowPass<T: Sample> {
    last_raw: Option<T>,
    last_smoothed: Option<T>,
}

impl<T: Sample> LowPass<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_raw: None,
            last_smoothed: None,
        }
    }

    /// Blend `value` into the running output with weight `alpha`.
    /// The first call seeds the state and returns `value` unchanged.
    pub fn filter(&mut self, value: T, alpha: f64) -> T {
        let smoothed = match self.last_smoothed {
            Some(last) => value * alpha + last * (1.0 - alpha),
            None => value,
        };

        self.last_raw = Some(value);
        self.last_smoothed = Some(smoothed);

        smoothed
    }

    /// Last raw input, if any
    #[must_use]
    pub const fn last_raw(&self) -> Option<T> {
        self.last_raw
    }

    /// Last smoothed output, if any
    #[must_use]
    pub const fn last_smoothed(&self) -> Option<T> {
        self.last_smoothed
    }

    pub fn reset(&mut self) {
        self.last_raw = None;
        self.last_smoothed = None;
    }
}

impl<T: Sample> Default for LowPass<T> {
    fn default() -> Self {
        Self::new()
    }
}
