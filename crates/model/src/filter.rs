//! Selection of the feature columns a classifier was trained on.

use churnkit_primitives::FeatureMatrix;
use ndarray::{Array2, s};
use polars::prelude::*;
use tracing::debug;

use crate::ModelError;

/// Restricts prepared features to an expected column list.
///
/// Named inputs keep the expected columns that are present, in expected
/// order; absent names are dropped. Positional inputs keep the first
/// `expected.len()` columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFilter {
    expected: Vec<String>,
}

impl ColumnFilter {
    /// Create a filter for the given column names.
    #[must_use]
    pub fn new<I, S>(expected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { expected: expected.into_iter().map(Into::into).collect() }
    }

    /// Expected column names.
    #[must_use]
    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    /// Keep the expected columns of a named feature matrix.
    #[must_use]
    pub fn filter_named(&self, features: &FeatureMatrix) -> FeatureMatrix {
        let out = features.select_present(&self.expected);
        if out.n_cols() < self.expected.len() {
            debug!(
                expected = self.expected.len(),
                present = out.n_cols(),
                "dropped expected columns absent from input"
            );
        }
        out
    }

    /// Keep the expected columns of a DataFrame.
    ///
    /// # Errors
    /// Returns `ModelError::Polars` if the selection fails.
    pub fn filter_frame(&self, df: &DataFrame) -> Result<DataFrame, ModelError> {
        let present = df.get_column_names();
        let kept = self
            .expected
            .iter()
            .filter(|name| present.iter().any(|p| p.as_str() == name.as_str()))
            .map(String::as_str);
        Ok(df.select(kept)?)
    }

    /// Keep the first `expected.len()` columns of an unnamed matrix.
    ///
    /// # Errors
    /// Returns `ModelError::InsufficientColumns` if the matrix is narrower
    /// than the expected list.
    pub fn filter_positional(&self, values: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        let requested = self.expected.len();
        if values.ncols() < requested {
            return Err(ModelError::InsufficientColumns { requested, available: values.ncols() });
        }
        Ok(values.slice(s![.., ..requested]).to_owned())
    }
}
