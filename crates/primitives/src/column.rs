//! Column classification types.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// How a raw column is routed through preparation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Imputed and robust-scaled.
    #[display("numeric")]
    Numeric,
    /// One-hot encoded.
    #[display("categorical")]
    Categorical,
    /// Decomposed into year, month name and day name.
    #[display("date")]
    Date,
}

/// Name of an output feature column.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FeatureName(pub String);

impl FeatureName {
    /// Name of the indicator column for `level` of categorical `column`.
    #[must_use]
    pub fn one_hot(column: &str, level: &str) -> Self {
        Self(format!("{column}_{level}"))
    }

    /// Get the feature name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FeatureName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
