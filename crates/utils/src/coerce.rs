//! Conversion of numeric-looking text columns.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::UtilsError;

/// Settings for text-to-number coercion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoercionConfig {
    /// Largest share of missing values a converted column may have.
    pub max_nan_ratio: f64,
}

impl Default for CoercionConfig {
    fn default() -> Self {
        Self { max_nan_ratio: 0.4 }
    }
}

impl CoercionConfig {
    /// Check the configuration.
    ///
    /// # Errors
    /// Returns `UtilsError::InvalidParameter` if the ratio is outside [0, 1].
    pub fn validate(&self) -> Result<(), UtilsError> {
        if (0.0..=1.0).contains(&self.max_nan_ratio) {
            Ok(())
        } else {
            Err(UtilsError::InvalidParameter(format!(
                "max_nan_ratio must be in [0, 1], got {}",
                self.max_nan_ratio
            )))
        }
    }
}

/// Outcome of assessing one text column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoercionDecision {
    /// Column name.
    pub column: String,
    /// Share of values missing after parsing, original nulls included.
    pub nan_ratio: f64,
    /// Threshold the ratio was compared against.
    pub threshold: f64,
    /// Whether the column was converted to Float64.
    pub converted: bool,
}

fn parse_numbers(column: &Column) -> Result<Vec<Option<f64>>, UtilsError> {
    Ok(column
        .str()?
        .into_iter()
        .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()).filter(|x| !x.is_nan()))
        .collect())
}

fn missing_ratio(values: &[Option<f64>]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|v| v.is_none()).count() as f64 / values.len() as f64
}

/// Decide whether a text column should become numeric.
///
/// The column converts when at most `max_nan_ratio` of its values are
/// missing after parsing.
///
/// # Errors
/// Returns `UtilsError::InvalidParameter` if `column` is not a text column.
pub fn assess_numeric_coercion(
    column: &Column,
    config: &CoercionConfig,
) -> Result<CoercionDecision, UtilsError> {
    if !matches!(column.dtype(), DataType::String) {
        return Err(UtilsError::InvalidParameter(format!(
            "column {} is not a text column",
            column.name()
        )));
    }

    let nan_ratio = missing_ratio(&parse_numbers(column)?);
    Ok(CoercionDecision {
        column: column.name().to_string(),
        nan_ratio,
        threshold: config.max_nan_ratio,
        converted: nan_ratio <= config.max_nan_ratio,
    })
}

/// Convert every text column that mostly holds numbers to Float64.
///
/// Returns the new frame and one decision per text column, in column order.
/// Non-text columns are left untouched.
///
/// # Errors
/// Returns `UtilsError` if the config is invalid or a column cannot be replaced.
pub fn coerce_numeric_columns(
    df: &DataFrame,
    config: &CoercionConfig,
) -> Result<(DataFrame, Vec<CoercionDecision>), UtilsError> {
    config.validate()?;

    let mut out = df.clone();
    let mut decisions = Vec::new();

    for column in df.get_columns() {
        if !matches!(column.dtype(), DataType::String) {
            continue;
        }

        let decision = assess_numeric_coercion(column, config)?;
        debug!(
            column = %decision.column,
            nan_ratio = decision.nan_ratio,
            threshold = decision.threshold,
            converted = decision.converted,
            "numeric coercion"
        );

        if decision.converted {
            let values = parse_numbers(column)?;
            out.with_column(Column::new(column.name().clone(), values))?;
        }
        decisions.push(decision);
    }

    let n_converted = decisions.iter().filter(|d| d.converted).count();
    info!(n_text = decisions.len(), n_converted, "coerced numeric text columns");

    Ok((out, decisions))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    fn raw() -> DataFrame {
        df! {
            "TotalCharges" => &[Some("29.85"), Some(" 1889.5"), Some(" "), None, Some("108.15")],
            "Contract" => &["Month-to-month", "One year", "Month-to-month", "Two year", "One year"],
            "tenure" => &[1i64, 34, 2, 45, 2],
        }
        .unwrap()
    }

    #[test]
    fn converts_mostly_numeric_text() {
        let (out, decisions) = coerce_numeric_columns(&raw(), &CoercionConfig::default()).unwrap();

        assert_eq!(out.column("TotalCharges").unwrap().dtype(), &DataType::Float64);
        assert_eq!(out.column("Contract").unwrap().dtype(), &DataType::String);
        assert_eq!(out.column("tenure").unwrap().dtype(), &DataType::Int64);

        let charges: Vec<Option<f64>> =
            out.column("TotalCharges").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(charges, vec![Some(29.85), Some(1889.5), None, None, Some(108.15)]);

        assert_eq!(decisions.len(), 2);
        assert!(decisions[0].converted);
        assert_relative_eq!(decisions[0].nan_ratio, 0.4, epsilon = 1e-12);
        assert!(!decisions[1].converted);
        assert_relative_eq!(decisions[1].nan_ratio, 1.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(0.2, false)]
    #[case(0.4, true)]
    #[case(0.5, true)]
    fn threshold_is_inclusive(#[case] max_nan_ratio: f64, #[case] converted: bool) {
        let df = raw();
        let config = CoercionConfig { max_nan_ratio };
        let decision =
            assess_numeric_coercion(df.column("TotalCharges").unwrap(), &config).unwrap();
        assert_eq!(decision.converted, converted);
        assert_eq!(decision.threshold, max_nan_ratio);
    }

    #[test]
    fn assess_rejects_non_text() {
        let df = raw();
        let err =
            assess_numeric_coercion(df.column("tenure").unwrap(), &CoercionConfig::default());
        assert!(matches!(err, Err(UtilsError::InvalidParameter(_))));
    }

    #[test]
    fn invalid_config() {
        let config = CoercionConfig { max_nan_ratio: 1.5 };
        assert!(coerce_numeric_columns(&raw(), &config).is_err());
    }
}
