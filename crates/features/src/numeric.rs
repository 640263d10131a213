//! Median imputation followed by robust scaling.

use churnkit_math::{RobustStats, median};
use churnkit_primitives::FeatureMatrix;
use churnkit_traits::{FrameTransform, TransformError};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::values::numeric_values;

const NAME: &str = "numeric imputer";

/// Learned parameters for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumnStats {
    /// Column name.
    pub column: String,
    /// Median of the observed values, used to fill missing entries.
    pub fill_value: f64,
    /// Robust centre of the imputed values.
    pub center: f64,
    /// Robust scale (IQR, or 1.0 when degenerate).
    pub scale: f64,
}

impl NumericColumnStats {
    fn fit(column: &str, values: &[Option<f64>]) -> Self {
        let observed: Vec<f64> = values.iter().flatten().copied().collect();

        let Some(fill_value) = median(&observed) else {
            warn!(column, "no observed values; imputing 0 with unit scale");
            return Self { column: column.to_string(), fill_value: 0.0, center: 0.0, scale: 1.0 };
        };

        let imputed: Vec<f64> = values.iter().map(|v| v.unwrap_or(fill_value)).collect();
        let (center, scale) = match RobustStats::from_values(&imputed) {
            Ok(stats) => (stats.median, stats.scale()),
            Err(_) => (fill_value, 1.0),
        };

        Self { column: column.to_string(), fill_value, center, scale }
    }
}

/// Per-column statistics learned by [`NumericImputerScaler`], in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumericParams {
    /// Statistics per column.
    pub columns: Vec<NumericColumnStats>,
}

impl NumericParams {
    /// Column names in fitted order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.column.clone()).collect()
    }

    /// Statistics for a column by name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&NumericColumnStats> {
        self.columns.iter().find(|c| c.column == column)
    }
}

/// Fills missing numeric values with the fitted median, then applies
/// `(x - median) / IQR`.
///
/// Every column of the fitted frame is treated as numeric; output columns
/// keep their input names and order.
#[derive(Debug, Clone, Default)]
pub struct NumericImputerScaler {
    params: Option<NumericParams>,
}

impl NumericImputerScaler {
    /// Create an unfitted imputer/scaler.
    #[must_use]
    pub const fn new() -> Self {
        Self { params: None }
    }

    /// Rebuild a fitted imputer/scaler from stored parameters.
    #[must_use]
    pub const fn from_params(params: NumericParams) -> Self {
        Self { params: Some(params) }
    }

    /// Fitted parameters, if any.
    #[must_use]
    pub const fn params(&self) -> Option<&NumericParams> {
        self.params.as_ref()
    }

    /// Fill missing values without scaling.
    ///
    /// # Errors
    /// Returns `TransformError` before fit, on missing columns, or on non-numeric values.
    pub fn impute(&self, df: &DataFrame) -> Result<FeatureMatrix, TransformError> {
        self.apply(df, false)
    }

    fn fitted(&self) -> Result<&NumericParams, TransformError> {
        self.params.as_ref().ok_or_else(|| TransformError::Unfitted(NAME.to_string()))
    }

    fn apply(&self, df: &DataFrame, scale: bool) -> Result<FeatureMatrix, TransformError> {
        let params = self.fitted()?;
        let names = params.column_names();
        TransformError::check_columns(df, &names, NAME)?;

        let mut out = Array2::zeros((df.height(), names.len()));
        for (j, stats) in params.columns.iter().enumerate() {
            let values = numeric_values(df.column(&stats.column)?)?;
            for (i, value) in values.into_iter().enumerate() {
                let filled = value.unwrap_or(stats.fill_value);
                out[[i, j]] = if scale { (filled - stats.center) / stats.scale } else { filled };
            }
        }

        Ok(FeatureMatrix::new(names, out)?)
    }
}

impl FrameTransform for NumericImputerScaler {
    type Output = FeatureMatrix;

    fn fit(&mut self, df: &DataFrame) -> Result<(), TransformError> {
        let mut columns = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let values = numeric_values(column)?;
            let stats = NumericColumnStats::fit(column.name().as_str(), &values);
            debug!(
                column = %stats.column,
                fill_value = stats.fill_value,
                center = stats.center,
                scale = stats.scale,
                "fitted numeric column"
            );
            columns.push(stats);
        }

        self.params = Some(NumericParams { columns });
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<FeatureMatrix, TransformError> {
        self.apply(df, true)
    }

    fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    fn name(&self) -> &str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn fitted(df: &DataFrame) -> NumericImputerScaler {
        let mut scaler = NumericImputerScaler::new();
        scaler.fit(df).unwrap();
        scaler
    }

    #[test]
    fn median_imputation_value() {
        let train = df! { "x" => &[Some(1.0), Some(2.0), None, Some(4.0)] }.unwrap();
        let scaler = fitted(&train);

        assert_eq!(scaler.params().unwrap().get("x").unwrap().fill_value, 2.0);

        let new = df! { "x" => &[None::<f64>] }.unwrap();
        let imputed = scaler.impute(&new).unwrap();
        assert_eq!(imputed.values()[[0, 0]], 2.0);
    }

    #[test]
    fn nan_counts_as_missing() {
        let train = df! { "x" => &[1.0, 2.0, f64::NAN, 4.0] }.unwrap();
        let scaler = fitted(&train);
        assert_eq!(scaler.params().unwrap().columns[0].fill_value, 2.0);
    }

    #[test]
    fn robust_scaling_on_imputed_values() {
        let train = df! { "x" => &[Some(1.0), Some(2.0), None, Some(4.0)] }.unwrap();
        let scaler = fitted(&train);
        let stats = &scaler.params().unwrap().columns[0];

        // imputed [1, 2, 2, 4]: median 2, q1 1.75, q3 2.5
        assert_relative_eq!(stats.center, 2.0, epsilon = 1e-12);
        assert_relative_eq!(stats.scale, 0.75, epsilon = 1e-12);

        let out = scaler.transform(&train).unwrap();
        let col: Vec<f64> = out.column("x").unwrap().to_vec();
        assert_relative_eq!(col[0], -1.0 / 0.75, epsilon = 1e-12);
        assert_relative_eq!(col[2], 0.0, epsilon = 1e-12);
        assert_relative_eq!(col[3], 2.0 / 0.75, epsilon = 1e-12);
    }

    #[test]
    fn constant_column_has_unit_scale() {
        let train = df! { "x" => &[3.0, 3.0, 3.0] }.unwrap();
        let scaler = fitted(&train);
        assert_eq!(scaler.params().unwrap().columns[0].scale, 1.0);

        let out = scaler.transform(&df! { "x" => &[5.0] }.unwrap()).unwrap();
        assert_eq!(out.values()[[0, 0]], 2.0);
    }

    #[test]
    fn all_missing_column_falls_back() {
        let train = df! { "x" => &[None::<f64>, None] }.unwrap();
        let scaler = fitted(&train);
        let stats = &scaler.params().unwrap().columns[0];
        assert_eq!((stats.fill_value, stats.center, stats.scale), (0.0, 0.0, 1.0));
    }

    #[test]
    fn keeps_names_and_order() {
        let train = df! {
            "b" => &[1.0, 2.0],
            "a" => &[3i64, 4],
        }
        .unwrap();
        let scaler = fitted(&train);

        let new = df! {
            "extra" => &["x", "y"],
            "a" => &[5i64, 6],
            "b" => &[7.0, 8.0],
        }
        .unwrap();
        let out = scaler.transform(&new).unwrap();
        assert_eq!(out.names(), &["b".to_string(), "a".to_string()]);
        assert_eq!(out.n_rows(), 2);
    }

    #[test]
    fn non_numeric_value_is_type_mismatch() {
        let scaler = fitted(&df! { "tenure" => &[1.0, 2.0] }.unwrap());
        let err = scaler.transform(&df! { "tenure" => &["ten"] }.unwrap()).unwrap_err();
        assert!(matches!(err, TransformError::TypeMismatch { ref column, .. } if column == "tenure"));
    }

    #[test]
    fn missing_column_is_schema_mismatch() {
        let scaler = fitted(&df! { "tenure" => &[1.0, 2.0] }.unwrap());
        let err = scaler.transform(&df! { "other" => &[1.0] }.unwrap()).unwrap_err();
        assert_eq!(err.missing_columns(), &["tenure".to_string()]);
    }

    #[test]
    fn transform_before_fit() {
        let scaler = NumericImputerScaler::new();
        let err = scaler.transform(&df! { "x" => &[1.0] }.unwrap()).unwrap_err();
        assert!(matches!(err, TransformError::Unfitted(_)));
    }

    #[test]
    fn zero_columns() {
        let empty = DataFrame::empty();
        let mut scaler = NumericImputerScaler::new();
        scaler.fit(&empty).unwrap();

        let out = scaler.transform(&df! { "x" => &[1.0, 2.0, 3.0] }.unwrap()).unwrap();
        assert_eq!(out.n_cols(), 0);
        assert_eq!(out.n_rows(), 3);
    }
}
