//! Skewed-quantile point estimate.

use crate::bounds::BirthRange;
use crate::error::{ConfigurationError, LineageError, Result};

/// Default quantile measured from the latest feasible year.
pub const DEFAULT_QUANTILE: f64 = 0.4;

/// Maps a finite birth-year range to one year.
///
/// `q` is the fraction of the range measured down from the latest year:
///
/// ```text
/// estimate = max - floor((max - min) * q)
/// ```
///
/// `q = 0.5` is the midpoint; the default `q = 0.4` leans toward the
/// later end, since parents more often had children in their thirties
/// than near the age limit.
///
/// # Examples
///
/// ```
/// use u_lineage::estimate::QuantileEstimator;
///
/// let estimator = QuantileEstimator::default();
/// assert_eq!(estimator.estimate_years(348, 442).unwrap(), 405);
///
/// let median = QuantileEstimator::new(0.5).unwrap();
/// assert_eq!(median.estimate_years(348, 442).unwrap(), 395);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuantileEstimator {
    quantile: f64,
}

impl Default for QuantileEstimator {
    fn default() -> Self {
        Self {
            quantile: DEFAULT_QUANTILE,
        }
    }
}

impl QuantileEstimator {
    /// Creates an estimator. `quantile` must be finite and in `[0, 1]`.
    pub fn new(quantile: f64) -> std::result::Result<Self, ConfigurationError> {
        if !(0.0..=1.0).contains(&quantile) {
            return Err(ConfigurationError::InvalidQuantile(quantile));
        }
        Ok(Self { quantile })
    }

    /// The configured quantile.
    pub fn quantile(&self) -> f64 {
        self.quantile
    }

    /// Point estimate for `[min, max]`.
    ///
    /// The result always lies in `[min, max]`. Fails with
    /// [`LineageError::Domain`] when `min > max` or the span does not
    /// fit in an `i64`.
    pub fn estimate_years(&self, min: i64, max: i64) -> Result<i64> {
        let span = max
            .checked_sub(min)
            .filter(|span| *span >= 0)
            .ok_or(LineageError::Domain { min, max })?;
        // f64 rounding can push a huge span past itself.
        let offset = ((span as f64 * self.quantile).floor() as i64).min(span);
        Ok(max - offset)
    }

    /// Point estimate for a solved range of individual `id`.
    ///
    /// Fails with [`LineageError::InsufficientConstraint`] when either
    /// side of the range is unbounded.
    pub fn estimate(&self, id: &str, range: &BirthRange) -> Result<i64> {
        let (min, max) = range
            .as_finite()
            .ok_or_else(|| LineageError::InsufficientConstraint {
                id: id.to_string(),
                range: *range,
            })?;
        self.estimate_years(min, max)
    }
}
