//! Classifier trait definitions.

use ndarray::{Array1, Array2};

/// Errors that can occur while scoring a feature matrix.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// Dimension mismatch in input data.
    #[error("dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
        /// Context description.
        context: String,
    },

    /// Numerical error (NaN, Inf).
    #[error("numerical error: {0}")]
    Numerical(String),
}

/// A trained binary classifier over prepared feature matrices.
pub trait Classifier: Send + Sync {
    /// Number of input features the classifier was trained on.
    fn n_features(&self) -> usize;

    /// Raw decision scores, one per row.
    ///
    /// # Errors
    /// Returns `ScoringError::DimensionMismatch` if the width is wrong.
    fn decision_function(&self, features: &Array2<f64>) -> Result<Array1<f64>, ScoringError>;

    /// Positive-class probabilities, if the classifier is calibrated.
    ///
    /// # Errors
    /// Returns `ScoringError` if scoring fails.
    fn predict_proba(&self, _features: &Array2<f64>) -> Result<Option<Array1<f64>>, ScoringError> {
        Ok(None)
    }

    /// Check that `features` has the trained width.
    ///
    /// # Errors
    /// Returns `ScoringError::DimensionMismatch` on a width mismatch.
    fn check_width(&self, features: &Array2<f64>) -> Result<(), ScoringError> {
        if features.ncols() == self.n_features() {
            Ok(())
        } else {
            Err(ScoringError::DimensionMismatch {
                expected: self.n_features(),
                actual: features.ncols(),
                context: "classifier features".to_string(),
            })
        }
    }
}
