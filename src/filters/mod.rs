//! Temporal smoothing filters for tracked head positions.
//!
//! Every filter consumes one raw sample per frame, in chronological order,
//! and returns one smoothed sample. Filters are generic over the sample type
//! so the same implementation serves scalar channels and 3D positions.

/// Moving average over a bounded window of recent samples
pub mod moving_average;

/// Single exponential smoothing
pub mod exponential;

/// Double exponential (level + trend) smoothing
pub mod double_exponential;

/// First-order low-pass building block
pub mod low_pass;

/// Adaptive one-euro filter
pub mod one_euro;

/// A set of filters driven by the same raw stream
pub mod bank;

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

use nalgebra::Vector3;

use crate::constants::{
    DEFAULT_DE_ALPHA, DEFAULT_DE_BETA, DEFAULT_MOVING_AVERAGE_WINDOW, DEFAULT_ONE_EURO_BETA,
    DEFAULT_ONE_EURO_D_CUTOFF, DEFAULT_ONE_EURO_FREQUENCY, DEFAULT_ONE_EURO_MIN_CUTOFF, DEFAULT_SE_ALPHA,
    MOVING_AVERAGE_WINDOW_MAX, MOVING_AVERAGE_WINDOW_MIN,
};
use crate::{Error, Result};

pub use bank::FilterBank;
pub use double_exponential::DoubleExponentialFilter;
pub use exponential::SingleExponentialFilter;
pub use moving_average::MovingAverageFilter;
pub use one_euro::OneEuroFilter;

/// A tracked head position in meters
pub type Position = Vector3<f64>;

/// Values a filter can smooth: closed under addition, subtraction and
/// scaling by `f64`.
pub trait Sample:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f64, Output = Self> + Div<f64, Output = Self> + Send + Sync
{
    /// Additive identity
    fn zero() -> Self;

    /// Euclidean magnitude, used for speed estimates
    fn magnitude(&self) -> f64;
}

impl Sample for f64 {
    fn zero() -> Self {
        0.0
    }

    fn magnitude(&self) -> f64 {
        self.abs()
    }
}

impl Sample for Vector3<f64> {
    fn zero() -> Self {
        Self::zeros()
    }

    fn magnitude(&self) -> f64 {
        self.norm()
    }
}

/// Trait for all smoothing filters
pub trait SmoothingFilter<T: Sample>: Send + Sync {
    /// Feed the next raw sample and return the smoothed value
    fn apply(&mut self, raw: T) -> T;

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes through values unchanged
pub struct NoFilter;

impl<T: Sample> SmoothingFilter<T> for NoFilter {
    fn apply(&mut self, raw: T) -> T {
        raw
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "NoFilter"
    }
}

/// The available smoothing strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Pass-through
    None,
    /// Mean of the last `k` samples
    MovingAverage,
    /// Exponentially weighted average
    SingleExponential,
    /// Level + trend exponential smoothing
    DoubleExponential,
    /// Speed-adaptive low-pass
    OneEuro,
}

impl FilterKind {
    /// All kinds, in display order
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::MovingAverage,
        Self::SingleExponential,
        Self::DoubleExponential,
        Self::OneEuro,
    ];

    /// Canonical configuration name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::MovingAverage => "moving_average",
            Self::SingleExponential => "single_exponential",
            Self::DoubleExponential => "double_exponential",
            Self::OneEuro => "one_euro",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect();

        match normalized.as_str() {
            "none" | "nofilter" | "raw" => Ok(Self::None),
            "movingaverage" | "ma" => Ok(Self::MovingAverage),
            "singleexponential" | "exponential" | "se" => Ok(Self::SingleExponential),
            "doubleexponential" | "de" => Ok(Self::DoubleExponential),
            "oneeuro" | "1euro" | "1€" => Ok(Self::OneEuro),
            _ => Err(Error::FilterError(format!("Unknown filter type: {s}"))),
        }
    }
}

/// A validated filter kind together with its parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterSpec {
    /// Pass-through
    None,
    /// Moving average with window `samples`
    MovingAverage { samples: usize },
    /// Single exponential with smoothing factor `alpha`
    SingleExponential { alpha: f64 },
    /// Double exponential with level factor `alpha` and trend factor `beta`
    DoubleExponential { alpha: f64, beta: f64 },
    /// One-euro filter
    OneEuro {
        frequency: f64,
        min_cutoff: f64,
        beta: f64,
        d_cutoff: f64,
    },
}

impl FilterSpec {
    /// Default parameters for a kind
    #[must_use]
    pub const fn default_for(kind: FilterKind) -> Self {
        match kind {
            FilterKind::None => Self::None,
            FilterKind::MovingAverage => Self::MovingAverage {
                samples: DEFAULT_MOVING_AVERAGE_WINDOW,
            },
            FilterKind::SingleExponential => Self::SingleExponential { alpha: DEFAULT_SE_ALPHA },
            FilterKind::DoubleExponential => Self::DoubleExponential {
                alpha: DEFAULT_DE_ALPHA,
                beta: DEFAULT_DE_BETA,
            },
            FilterKind::OneEuro => Self::OneEuro {
                frequency: DEFAULT_ONE_EURO_FREQUENCY,
                min_cutoff: DEFAULT_ONE_EURO_MIN_CUTOFF,
                beta: DEFAULT_ONE_EURO_BETA,
                d_cutoff: DEFAULT_ONE_EURO_D_CUTOFF,
            },
        }
    }

    /// Kind of this specification
    #[must_use]
    pub const fn kind(&self) -> FilterKind {
        match self {
            Self::None => FilterKind::None,
            Self::MovingAverage { .. } => FilterKind::MovingAverage,
            Self::SingleExponential { .. } => FilterKind::SingleExponential,
            Self::DoubleExponential { .. } => FilterKind::DoubleExponential,
            Self::OneEuro { .. } => FilterKind::OneEuro,
        }
    }

    /// Check parameter ranges
    ///
    /// # Errors
    ///
    /// Returns `Error::FilterError` naming the first out-of-range parameter.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::None => Ok(()),
            Self::MovingAverage { samples } => {
                if samples < MOVING_AVERAGE_WINDOW_MIN {
                    return Err(Error::FilterError("Window size must be greater than 0".to_string()));
                }
                if samples > MOVING_AVERAGE_WINDOW_MAX {
                    return Err(Error::FilterError(format!(
                        "Window size must be at most {MOVING_AVERAGE_WINDOW_MAX}, got {samples}"
                    )));
                }
                Ok(())
            }
            Self::SingleExponential { alpha } => {
                if !(alpha > 0.0 && alpha <= 1.0) {
                    return Err(Error::FilterError(format!("Alpha must be in (0, 1], got {alpha}")));
                }
                Ok(())
            }
            Self::DoubleExponential { alpha, beta } => {
                if !(0.0..=1.0).contains(&alpha) {
                    return Err(Error::FilterError(format!("Alpha must be in [0, 1], got {alpha}")));
                }
                if !(0.0..=1.0).contains(&beta) {
                    return Err(Error::FilterError(format!("Beta must be in [0, 1], got {beta}")));
                }
                Ok(())
            }
            Self::OneEuro {
                frequency,
                min_cutoff,
                beta,
                d_cutoff,
            } => {
                if !(frequency.is_finite() && frequency > 0.0) {
                    return Err(Error::FilterError(format!("Frequency must be positive, got {frequency}")));
                }
                if !(min_cutoff.is_finite() && min_cutoff > 0.0) {
                    return Err(Error::FilterError(format!(
                        "Minimum cutoff must be positive, got {min_cutoff}"
                    )));
                }
                if !(beta.is_finite() && beta >= 0.0) {
                    return Err(Error::FilterError(format!("Beta must be non-negative, got {beta}")));
                }
                if !(d_cutoff.is_finite() && d_cutoff > 0.0) {
                    return Err(Error::FilterError(format!(
                        "Derivative cutoff must be positive, got {d_cutoff}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Build a filter for any sample type
    ///
    /// # Errors
    ///
    /// Returns `Error::FilterError` if the parameters are out of range.
    pub fn build<T: Sample + 'static>(&self) -> Result<Box<dyn SmoothingFilter<T>>> {
        self.validate()?;

        Ok(match *self {
            Self::None => Box::new(NoFilter),
            Self::MovingAverage { samples } => Box::new(MovingAverageFilter::new(samples)),
            Self::SingleExponential { alpha } => Box::new(SingleExponentialFilter::new(alpha)),
            Self::DoubleExponential { alpha, beta } => Box::new(DoubleExponentialFilter::new(alpha, beta)),
            Self::OneEuro {
                frequency,
                min_cutoff,
                beta,
                d_cutoff,
            } => Box::new(OneEuroFilter::with_parameters(frequency, min_cutoff, beta, d_cutoff)),
        })
    }
}

impl FromStr for FilterSpec {
    type Err = Error;

    /// Parse `kind[:p1[:p2...]]`, e.g. `moving_average:10` or `double_exponential:0.3:0.1`.
    /// Missing parameters take their defaults.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let kind: FilterKind = parts.next().unwrap_or_default().parse()?;
        let params = parts
            .map(|p| {
                p.trim()
                    .parse::<f64>()
                    .map_err(|_| Error::FilterError(format!("Invalid filter parameter '{p}' in '{s}'")))
            })
            .collect::<Result<Vec<f64>>>()?;

        let param = |index: usize, default: f64| params.get(index).copied().unwrap_or(default);

        let spec = match Self::default_for(kind) {
            Self::None => Self::None,
            Self::MovingAverage { samples } => {
                #[allow(clippy::cast_precision_loss)]
                let raw = param(0, samples as f64);
                if raw.fract() != 0.0 || raw < 0.0 || !raw.is_finite() {
                    return Err(Error::FilterError(format!(
                        "Window size must be a positive integer, got {raw}"
                    )));
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let samples = raw as usize;
                Self::MovingAverage { samples }
            }
            Self::SingleExponential { alpha } => Self::SingleExponential { alpha: param(0, alpha) },
            Self::DoubleExponential { alpha, beta } => Self::DoubleExponential {
                alpha: param(0, alpha),
                beta: param(1, beta),
            },
            Self::OneEuro {
                frequency,
                min_cutoff,
                beta,
                d_cutoff,
            } => Self::OneEuro {
                frequency: param(0, frequency),
                min_cutoff: param(1, min_cutoff),
                beta: param(2, beta),
                d_cutoff: param(3, d_cutoff),
            },
        };

        spec.validate()?;
        Ok(spec)
    }
}

/// Create a position filter from a `kind[:params]` string
///
/// # Errors
///
/// Returns `Error::FilterError` for unknown kinds or invalid parameters.
pub fn create_filter(filter_type: &str) -> Result<Box<dyn SmoothingFilter<Position>>> {
    filter_type.parse::<FilterSpec>()?.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter() {
        let mut filter = NoFilter;
        let out = SmoothingFilter::<Position>::apply(&mut filter, Position::new(1.0, 2.0, 3.0));
        assert_eq!(out, Position::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_create_filter() {
        assert!(create_filter("none").is_ok());
        assert!(create_filter("moving_average").is_ok());
        assert!(create_filter("single_exponential").is_ok());
        assert!(create_filter("double_exponential").is_ok());
        assert!(create_filter("one_euro").is_ok());
        assert!(create_filter("kalman").is_err());
    }

    #[test]
    fn test_kind_aliases() {
        assert_eq!("MovingAverage".parse::<FilterKind>().unwrap(), FilterKind::MovingAverage);
        assert_eq!("moving-average".parse::<FilterKind>().unwrap(), FilterKind::MovingAverage);
        assert_eq!("exponential".parse::<FilterKind>().unwrap(), FilterKind::SingleExponential);
        assert_eq!("de".parse::<FilterKind>().unwrap(), FilterKind::DoubleExponential);
        assert_eq!("1euro".parse::<FilterKind>().unwrap(), FilterKind::OneEuro);

        for kind in FilterKind::ALL {
            assert_eq!(kind.as_str().parse::<FilterKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_spec_parameters() {
        assert_eq!(
            "moving_average:10".parse::<FilterSpec>().unwrap(),
            FilterSpec::MovingAverage { samples: 10 }
        );
        assert_eq!(
            "double_exponential:0.3".parse::<FilterSpec>().unwrap(),
            FilterSpec::DoubleExponential {
                alpha: 0.3,
                beta: DEFAULT_DE_BETA
            }
        );
        assert!("moving_average:2.5".parse::<FilterSpec>().is_err());
        assert!("moving_average:201".parse::<FilterSpec>().is_err());
        assert!("one_euro:abc".parse::<FilterSpec>().is_err());
    }

    #[test]
    fn test_scalar_filters() {
        let mut filter = FilterSpec::SingleExponential { alpha: 0.5 }.build::<f64>().unwrap();
        assert_eq!(filter.apply(10.0), 10.0);
        assert_eq!(filter.apply(20.0), 15.0);
    }
}
