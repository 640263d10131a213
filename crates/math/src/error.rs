//! Error types for statistical operations.

/// Errors that can occur during statistical operations.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    /// Invalid quantile value.
    #[error("invalid quantile: {0} (must be in [0, 1])")]
    InvalidQuantile(f64),

    /// No finite values to summarise.
    #[error("empty data provided")]
    EmptyData,
}
