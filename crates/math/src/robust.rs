//! Robust location and scale statistics.

use serde::{Deserialize, Serialize};

use crate::{MathError, quantile_sorted, sorted_finite};

/// Median and interquartile range of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobustStats {
    /// Median (robust centre).
    pub median: f64,
    /// First quartile.
    pub q1: f64,
    /// Third quartile.
    pub q3: f64,
}

impl RobustStats {
    /// Compute statistics over the finite values of `data`.
    ///
    /// # Errors
    /// Returns `MathError::EmptyData` if there are no finite values.
    pub fn from_values(data: &[f64]) -> Result<Self, MathError> {
        let sorted = sorted_finite(data);
        Ok(Self {
            median: quantile_sorted(&sorted, 0.5)?,
            q1: quantile_sorted(&sorted, 0.25)?,
            q3: quantile_sorted(&sorted, 0.75)?,
        })
    }

    /// Interquartile range.
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Divisor for scaling: the IQR, or 1.0 when the IQR is degenerate.
    #[must_use]
    pub fn scale(&self) -> f64 {
        let iqr = self.iqr();
        if iqr.is_finite() && iqr.abs() > f64::EPSILON { iqr } else { 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn robust_stats_quartiles() {
        let stats = RobustStats::from_values(&[1.0, 2.0, 2.0, 4.0]).unwrap();
        assert_relative_eq!(stats.median, 2.0, epsilon = 1e-12);
        assert_relative_eq!(stats.q1, 1.75, epsilon = 1e-12);
        assert_relative_eq!(stats.q3, 2.5, epsilon = 1e-12);
        assert_relative_eq!(stats.scale(), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn zero_iqr_scale_is_one() {
        let stats = RobustStats::from_values(&[5.0, 5.0, 5.0]).unwrap();
        assert_eq!(stats.iqr(), 0.0);
        assert_eq!(stats.scale(), 1.0);
    }

    #[test]
    fn empty_errors() {
        assert!(matches!(RobustStats::from_values(&[f64::NAN]), Err(MathError::EmptyData)));
    }

    #[test]
    fn outlier_does_not_move_quartiles() {
        let stats = RobustStats::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_relative_eq!(stats.median, 3.0, epsilon = 1e-12);
        assert_relative_eq!(stats.scale(), 2.0, epsilon = 1e-12);
    }
}
