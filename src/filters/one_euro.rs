//! One-euro filter (Casiez, Roussel & Vogel, CHI 2012).
//!
//! Smooth when slow (reduces jitter), responsive when fast (reduces lag).
//! The cutoff frequency grows linearly with the estimated speed of the
//! signal. For vector samples the speed is the magnitude of the smoothed
//! derivative, so all axes share one cutoff.

use std::f64::consts::PI;

use super::low_pass::LowPass;
use super::{Sample, SmoothingFilter};
use crate::constants::{DEFAULT_ONE_EURO_BETA, DEFAULT_ONE_EURO_D_CUTOFF, DEFAULT_ONE_EURO_MIN_CUTOFF};

/// Adaptive low-pass filter: smooth at rest, responsive during motion
pub struct OneEuroFilter<T: Sample> {
    /// Configured sampling frequency (Hz), restored on reset
    base_frequency: f64,
    /// Sampling frequency (Hz); `apply` assumes samples arrive at this rate
    frequency: f64,
    /// Minimum cutoff frequency (Hz) - lower = smoother at rest
    min_cutoff: f64,
    /// Speed coefficient - higher = less lag during fast motion
    beta: f64,
    /// Derivative cutoff frequency (Hz)
    d_cutoff: f64,

    x: LowPass<T>,
    dx: LowPass<T>,
    last_time: Option<f64>,
}

impl<T: Sample> OneEuroFilter<T> {
    /// Create a filter for a stream sampled at `frequency` Hz with default cutoffs
    ///
    /// # Panics
    ///
    /// Panics if frequency is not positive
    #[must_use]
    pub fn new(frequency: f64) -> Self {
        Self::with_parameters(
            frequency,
            DEFAULT_ONE_EURO_MIN_CUTOFF,
            DEFAULT_ONE_EURO_BETA,
            DEFAULT_ONE_EURO_D_CUTOFF,
        )
    }

    /// Create a filter with explicit cutoff parameters
    ///
    /// # Panics
    ///
    /// Panics if frequency, `min_cutoff` or `d_cutoff` is not positive, or
    /// if beta is negative
    #[must_use]
    pub fn with_parameters(frequency: f64, min_cutoff: f64, beta: f64, d_cutoff: f64) -> Self {
        assert!(frequency > 0.0, "Frequency must be positive");
        assert!(min_cutoff > 0.0, "Minimum cutoff must be positive");
        assert!(beta >= 0.0, "Beta must be non-negative");
        assert!(d_cutoff > 0.0, "Derivative cutoff must be positive");
        Self {
            base_frequency: frequency,
            frequency,
            min_cutoff,
            beta,
            d_cutoff,
            x: LowPass::new(),
            dx: LowPass::new(),
            last_time: None,
        }
    }

    /// Current sampling frequency estimate (Hz)
    #[must_use]
    pub const fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Smoothing factor for a first-order low-pass at `cutoff` Hz
    fn alpha(&self, cutoff: f64) -> f64 {
        let te = 1.0 / self.frequency;
        let tau = 1.0 / (2.0 * PI * cutoff);
        1.0 / (1.0 + tau / te)
    }

    /// Filter a sample taken at `timestamp` seconds.
    ///
    /// The sampling frequency is re-estimated from consecutive timestamps;
    /// a non-increasing timestamp keeps the previous frequency.
    pub fn apply_at(&mut self, value: T, timestamp: f64) -> T {
        if let Some(last) = self.last_time {
            let dt = timestamp - last;
            if dt > 0.0 && dt.is_finite() {
                self.frequency = 1.0 / dt;
            }
        }
        self.last_time = Some(timestamp);

        self.filter(value)
    }

    fn filter(&mut self, value: T) -> T {
        let derivative = match self.x.last_raw() {
            Some(previous) => (value - previous) * self.frequency,
            None => T::zero(),
        };

        let d_alpha = self.alpha(self.d_cutoff);
        let smoothed_derivative = self.dx.filter(derivative, d_alpha);

        let cutoff = self.beta.mul_add(smoothed_derivative.magnitude(), self.min_cutoff);
        let alpha = self.alpha(cutoff);

        self.x.filter(value, alpha)
    }
}

impl<T: Sample> SmoothingFilter<T> for OneEuroFilter<T> {
    fn apply(&mut self, raw: T) -> T {
        self.filter(raw)
    }

    fn reset(&mut self) {
        self.x.reset();
        self.dx.reset();
        self.last_time = None;
        self.frequency = self.base_frequency;
    }

    fn name(&self) -> &str {
        "OneEuroFilter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_first_value_passes_through() {
        let mut filter = OneEuroFilter::new(60.0);
        assert_eq!(filter.apply(3.5), 3.5);
    }

    #[test]
    fn test_smooths_jitter_at_rest() {
        let mut filter = OneEuroFilter::new(60.0);
        filter.apply(0.0);

        let mut max_output: f64 = 0.0;
        for i in 0..120 {
            let jitter = if i % 2 == 0 { 0.01 } else { -0.01 };
            max_output = max_output.max(filter.apply(jitter).abs());
        }

        // Output jitter is a fraction of the input jitter
        assert!(max_output < 0.005, "got {max_output}");
    }

    #[test]
    fn test_beta_reduces_lag() {
        let mut sluggish = OneEuroFilter::with_parameters(60.0, 1.0, 0.0, 1.0);
        let mut responsive = OneEuroFilter::with_parameters(60.0, 1.0, 1.0, 1.0);

        sluggish.apply(0.0);
        responsive.apply(0.0);

        let mut slow_out = 0.0;
        let mut fast_out = 0.0;
        for i in 1..=30 {
            let value = f64::from(i) * 0.1;
            slow_out = sluggish.apply(value);
            fast_out = responsive.apply(value);
        }

        assert!(fast_out > slow_out);
        assert!(fast_out <= 3.0);
    }

    #[test]
    fn test_converges_on_constant() {
        let mut filter = OneEuroFilter::new(60.0);
        filter.apply(Vector3::new(0.0, 0.0, 0.0));
        let mut out = Vector3::zeros();
        for _ in 0..600 {
            out = filter.apply(Vector3::new(1.0, -2.0, 0.5));
        }
        assert!((out - Vector3::new(1.0, -2.0, 0.5)).norm() < 1e-6);
    }

    #[test]
    fn test_timestamps_update_frequency() {
        let mut filter = OneEuroFilter::new(60.0);
        filter.apply_at(0.0, 0.0);
        filter.apply_at(1.0, 0.1);
        assert!((filter.frequency() - 10.0).abs() < 1e-9);

        // Repeated timestamp keeps the previous estimate
        filter.apply_at(1.0, 0.1);
        assert!((filter.frequency() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset() {
        let mut filter = OneEuroFilter::new(30.0);
        filter.apply(10.0);
        filter.apply(20.0);
        filter.reset();
        assert_eq!(filter.apply(-4.0), -4.0);
    }

    #[test]
    fn test_reset_restores_configured_frequency() {
        let mut filter = OneEuroFilter::new(60.0);
        filter.apply_at(0.0, 0.0);
        filter.apply_at(1.0, 0.5);
        assert!((filter.frequency() - 2.0).abs() < 1e-9);

        filter.reset();
        assert!((filter.frequency() - 60.0).abs() < f64::EPSILON);

        // Plain samples after reset match a fresh filter
        let mut fresh = OneEuroFilter::new(60.0);
        for value in [0.0, 0.4, 0.9, 1.0] {
            assert_eq!(filter.apply(value), fresh.apply(value));
        }
    }
}
