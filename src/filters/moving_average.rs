use std::collections::VecDeque;

use super::{Sample, SmoothingFilter};
use crate::constants::{MOVING_AVERAGE_WINDOW_MAX, MOVING_AVERAGE_WINDOW_MIN};

/// Moving average filter
pub struct MovingAverageFilter<T: Sample> {
    window_size: usize,
    buffer: VecDeque<T>,
}

impl<T: Sample> MovingAverageFilter<T> {
    /// Create a moving average over the last `window_size` samples
    ///
    /// # Panics
    ///
    /// Panics if `window_size` is 0
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        assert!(window_size > 0, "Window size must be greater than 0");
        Self {
            window_size,
            buffer: VecDeque::with_capacity(window_size),
        }
    }

    /// Current window size
    #[must_use]
    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of buffered samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Change the window size, clamped to `[1, 200]`. Shrinking drops the
    /// oldest samples.
    pub fn set_window(&mut self, window_size: usize) {
        self.window_size = window_size.clamp(MOVING_AVERAGE_WINDOW_MIN, MOVING_AVERAGE_WINDOW_MAX);
        while self.buffer.len() > self.window_size {
            self.buffer.pop_front();
        }
    }
}

impl<T: Sample> SmoothingFilter<T> for MovingAverageFilter<T> {
    fn apply(&mut self, raw: T) -> T {
        self.buffer.push_back(raw);
        if self.buffer.len() > self.window_size {
            self.buffer.pop_front();
        }

        let sum = self.buffer.iter().fold(T::zero(), |acc, &sample| acc + sample);
        #[allow(clippy::cast_precision_loss)]
        let count = self.buffer.len() as f64;

        sum / count
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn name(&self) -> &str {
        "MovingAverageFilter"
    }
}
