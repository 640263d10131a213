//! Error types for data cleaning utilities.

/// Errors that can occur while cleaning a raw table.
#[derive(Debug, thiserror::Error)]
pub enum UtilsError {
    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Invalid parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Missing column.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// A numeric-only operation was requested on a non-numeric column.
    #[error("column {column} is not numeric (dtype {dtype})")]
    NotNumeric {
        /// Offending column.
        column: String,
        /// Its dtype.
        dtype: String,
    },
}

impl UtilsError {
    pub(crate) fn not_numeric(column: &polars::prelude::Column) -> Self {
        Self::NotNumeric { column: column.name().to_string(), dtype: column.dtype().to_string() }
    }
}
