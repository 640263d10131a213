//! Fit/transform trait definitions.

use polars::prelude::*;

/// Errors that can occur while fitting or applying a transform.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Input lacks columns that fit-time state requires.
    #[error("schema mismatch in {stage}: missing column(s) {missing:?}")]
    SchemaMismatch {
        /// Component that detected the mismatch.
        stage: String,
        /// Every missing column name.
        missing: Vec<String>,
    },

    /// A column holds values of the wrong type for its branch.
    #[error("type mismatch in column {column}: {detail}")]
    TypeMismatch {
        /// Offending column.
        column: String,
        /// What was found.
        detail: String,
    },

    /// Transform called before fit.
    #[error("{0} used before fit")]
    Unfitted(String),

    /// Invalid parameter or fitted layout.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Matrix shape error.
    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl TransformError {
    /// Check that every column in `required` is present in `df`.
    ///
    /// # Errors
    /// Returns `TransformError::SchemaMismatch` listing all missing columns.
    pub fn check_columns(df: &DataFrame, required: &[String], stage: &str) -> Result<(), Self> {
        let present = df.get_column_names();
        let missing: Vec<String> = required
            .iter()
            .filter(|name| !present.iter().any(|p| p.as_str() == name.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Self::SchemaMismatch { stage: stage.to_string(), missing })
        }
    }

    /// Missing column names, for schema mismatches.
    #[must_use]
    pub fn missing_columns(&self) -> &[String] {
        match self {
            Self::SchemaMismatch { missing, .. } => missing,
            _ => &[],
        }
    }
}

/// A transform that learns parameters once and replays them.
///
/// `fit` derives state from a reference table; `transform` applies that
/// state to any structurally compatible table without re-learning.
pub trait FrameTransform: Send + Sync {
    /// Output of `transform`.
    type Output;

    /// Learn parameters from `df`, replacing any previous state.
    ///
    /// # Errors
    /// Returns `TransformError` if the data cannot be fitted.
    fn fit(&mut self, df: &DataFrame) -> Result<(), TransformError>;

    /// Apply the learned parameters to `df`.
    ///
    /// # Errors
    /// Returns `TransformError::Unfitted` before `fit`, or a schema/type error.
    fn transform(&self, df: &DataFrame) -> Result<Self::Output, TransformError>;

    /// Fit on `df`, then transform it.
    ///
    /// # Errors
    /// Returns any error from `fit` or `transform`.
    fn fit_transform(&mut self, df: &DataFrame) -> Result<Self::Output, TransformError> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Whether `fit` has run.
    fn is_fitted(&self) -> bool;

    /// Returns the name of this transform.
    fn name(&self) -> &str;
}
