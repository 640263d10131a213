//! Cleaning plans: imputations plus excluded columns.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ImputationDirective, UtilsError, apply_imputations};

/// Drop the listed columns, ignoring names that are not present.
///
/// # Errors
/// Returns `UtilsError::Polars` if the frame cannot be rebuilt.
pub fn drop_excluded(df: &DataFrame, excluded: &[String]) -> Result<DataFrame, UtilsError> {
    let present: Vec<PlSmallStr> = df
        .get_column_names()
        .into_iter()
        .filter(|name| excluded.iter().any(|e| e.as_str() == name.as_str()))
        .cloned()
        .collect();

    if present.is_empty() {
        return Ok(df.clone());
    }
    Ok(df.drop_many(present))
}

/// Ordered cleaning steps for a raw table.
///
/// At most one directive is kept per column; the latest wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningPlan {
    /// Imputations, applied in order.
    pub imputations: Vec<ImputationDirective>,
    /// Columns removed after imputation.
    pub excluded_columns: Vec<String>,
}

impl CleaningPlan {
    /// Create an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directive, replacing any earlier one for the same column.
    pub fn upsert(&mut self, directive: ImputationDirective) -> &mut Self {
        self.imputations.retain(|d| d.column != directive.column);
        self.imputations.push(directive);
        self
    }

    /// Mark a column for exclusion.
    pub fn exclude(&mut self, column: impl Into<String>) -> &mut Self {
        let column = column.into();
        if !self.excluded_columns.contains(&column) {
            self.excluded_columns.push(column);
        }
        self
    }

    /// Undo an exclusion.
    pub fn restore(&mut self, column: &str) -> &mut Self {
        self.excluded_columns.retain(|c| c != column);
        self
    }

    /// Apply imputations, then drop excluded columns.
    ///
    /// # Errors
    /// Returns any error from [`apply_imputations`].
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame, UtilsError> {
        let imputed = apply_imputations(df, &self.imputations)?;
        let out = drop_excluded(&imputed, &self.excluded_columns)?;
        info!(
            n_imputations = self.imputations.len(),
            n_excluded = self.excluded_columns.len(),
            rows = out.height(),
            columns = out.width(),
            "applied cleaning plan"
        );
        Ok(out)
    }
}
