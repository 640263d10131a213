//! Error types for preparation and scoring.

use churnkit_traits::{ScoringError, TransformError};

/// Errors that can occur while preparing features or scoring a bundle.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Transform error.
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    /// Scoring error.
    #[error("scoring error: {0}")]
    Scoring(#[from] ScoringError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Bundle (de)serialization error.
    #[error("bundle json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Positional input narrower than the expected feature list.
    #[error("insufficient columns: requested {requested}, available {available}")]
    InsufficientColumns {
        /// Number of columns requested.
        requested: usize,
        /// Number of columns in the input.
        available: usize,
    },

    /// Persisted bundle or preparer state is inconsistent.
    #[error("invalid bundle: {0}")]
    InvalidBundle(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ModelError {
    /// Returns whether the error comes from the shape of the input table
    /// rather than from the bundle itself.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Transform(
                TransformError::SchemaMismatch { .. } | TransformError::TypeMismatch { .. }
            ) | Self::InsufficientColumns { .. }
        )
    }
}
