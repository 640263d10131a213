//! Conversion of prepared features back to a DataFrame.

use churnkit_primitives::FeatureMatrix;
use polars::prelude::*;

use crate::ModelError;

/// Build a Float64 DataFrame with one column per feature.
///
/// A zero-width matrix yields an empty frame, which has no rows.
///
/// # Errors
/// Returns `ModelError::Polars` if the frame cannot be built.
pub fn feature_frame(features: &FeatureMatrix) -> Result<DataFrame, ModelError> {
    let columns: Vec<Column> = features
        .names()
        .iter()
        .zip(features.values().columns())
        .map(|(name, values)| Column::new(name.as_str().into(), values.to_vec()))
        .collect();
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn one_column_per_feature() {
        let features = FeatureMatrix::new(
            vec!["tenure".to_string(), "plan_A".to_string()],
            array![[0.5, 1.0], [-0.25, 0.0]],
        )
        .unwrap();

        let df = feature_frame(&features).unwrap();
        assert_eq!(df.shape(), (2, 2));
        assert_eq!(df.column("plan_A").unwrap().f64().unwrap().get(0), Some(1.0));
        assert_eq!(df.column("tenure").unwrap().f64().unwrap().get(1), Some(-0.25));
    }
}
