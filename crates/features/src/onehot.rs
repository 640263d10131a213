//! One-hot encoding of categorical columns.

use std::collections::BTreeSet;

use churnkit_primitives::{FeatureMatrix, FeatureName};
use churnkit_traits::{FrameTransform, TransformError};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::values::string_values;

const NAME: &str = "one-hot encoder";

/// Level name of the indicator for missing values.
pub const MISSING_LEVEL: &str = "nan";

/// Learned levels of one categorical column, sorted ascending.
///
/// A column that had nulls at fit time gets one more indicator,
/// `{column}_nan`, after its observed levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLevels {
    /// Column name.
    pub column: String,
    /// Distinct non-null levels.
    pub levels: Vec<String>,
    /// Whether nulls were seen at fit time.
    #[serde(default)]
    pub includes_missing: bool,
}

impl CategoryLevels {
    /// Number of indicator columns for this column.
    #[must_use]
    pub fn width(&self) -> usize {
        self.levels.len() + usize::from(self.includes_missing)
    }

    /// Indicator names in output order.
    #[must_use]
    pub fn output_columns(&self) -> Vec<String> {
        let missing = self.includes_missing.then_some(MISSING_LEVEL);
        self.levels
            .iter()
            .map(String::as_str)
            .chain(missing)
            .map(|level| FeatureName::one_hot(&self.column, level).to_string())
            .collect()
    }

    fn position(&self, value: Option<&String>) -> Option<usize> {
        match value {
            Some(v) => self.levels.binary_search(v).ok(),
            None => self.includes_missing.then_some(self.levels.len()),
        }
    }
}

/// Ordered vocabulary of all encoded columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    /// Per-column levels in fitted column order.
    pub columns: Vec<CategoryLevels>,
}

impl Vocabulary {
    /// Output names, `"{column}_{level}"` in vocabulary order.
    #[must_use]
    pub fn output_columns(&self) -> Vec<String> {
        self.columns.iter().flat_map(CategoryLevels::output_columns).collect()
    }

    /// Total number of indicator columns.
    #[must_use]
    pub fn n_outputs(&self) -> usize {
        self.columns.iter().map(CategoryLevels::width).sum()
    }

    /// Encoded input columns.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.column.clone()).collect()
    }
}

/// Expands each categorical column into one indicator per learned level.
///
/// Levels not seen during fit produce an all-zero group. Nulls get their
/// own indicator when the column had nulls at fit time, and zeros otherwise.
#[derive(Debug, Clone, Default)]
pub struct OneHotEncoder {
    vocabulary: Option<Vocabulary>,
}

impl OneHotEncoder {
    /// Create an unfitted encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self { vocabulary: None }
    }

    /// Rebuild a fitted encoder from a stored vocabulary.
    #[must_use]
    pub const fn from_vocabulary(vocabulary: Vocabulary) -> Self {
        Self { vocabulary: Some(vocabulary) }
    }

    /// Learned vocabulary, if fitted.
    #[must_use]
    pub const fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_ref()
    }
}

impl FrameTransform for OneHotEncoder {
    type Output = FeatureMatrix;

    fn fit(&mut self, df: &DataFrame) -> Result<(), TransformError> {
        let mut columns = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let values = string_values(column)?;
            let includes_missing = values.iter().any(Option::is_none);
            let levels: BTreeSet<String> = values.into_iter().flatten().collect();
            debug!(
                column = %column.name(),
                n_levels = levels.len(),
                includes_missing,
                "learned categorical levels"
            );
            columns.push(CategoryLevels {
                column: column.name().to_string(),
                levels: levels.into_iter().collect(),
                includes_missing,
            });
        }

        self.vocabulary = Some(Vocabulary { columns });
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<FeatureMatrix, TransformError> {
        let vocabulary =
            self.vocabulary.as_ref().ok_or_else(|| TransformError::Unfitted(NAME.to_string()))?;
        TransformError::check_columns(df, &vocabulary.column_names(), NAME)?;

        let mut out = Array2::zeros((df.height(), vocabulary.n_outputs()));
        let mut offset = 0;
        for group in &vocabulary.columns {
            let values = string_values(df.column(&group.column)?)?;
            for (i, value) in values.iter().enumerate() {
                if let Some(pos) = group.position(value.as_ref()) {
                    out[[i, offset + pos]] = 1.0;
                }
            }
            offset += group.width();
        }

        Ok(FeatureMatrix::new(vocabulary.output_columns(), out)?)
    }

    fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    fn name(&self) -> &str {
        NAME
    }
}
