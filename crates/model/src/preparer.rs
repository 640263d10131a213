//! Mixed-type table preparation.

use std::{borrow::Cow, collections::HashSet};

use churnkit_features::{
    DateExtractorConfig, DateFeatureExtractor, DateParams, NumericImputerScaler, NumericParams,
    OneHotEncoder, Vocabulary, classify_dtype,
};
use churnkit_primitives::{ColumnKind, FeatureMatrix};
use churnkit_traits::{FrameTransform, TransformError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ModelError;

const NAME: &str = "preparer";

/// Configuration for [`DataFramePreparer`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreparerConfig {
    /// Decompose date-like columns before partitioning; `None` disables it.
    pub date_extraction: Option<DateExtractorConfig>,
}

impl PreparerConfig {
    /// Configuration with date extraction enabled at its defaults.
    #[must_use]
    pub fn with_dates() -> Self {
        Self { date_extraction: Some(DateExtractorConfig::default()) }
    }
}

/// Persisted state of a fitted [`DataFramePreparer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparerState {
    /// Columns of the table seen at fit, in order.
    pub fit_columns: Vec<String>,
    /// Columns routed to the numeric branch.
    pub numeric_columns: Vec<String>,
    /// Columns routed to the encoder.
    pub categorical_columns: Vec<String>,
    /// Imputation and scaling statistics per numeric column.
    pub numeric_statistics: NumericParams,
    /// Learned levels per categorical column.
    pub encoder_vocabulary: Vocabulary,
    /// Frozen date candidates, when date extraction ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_candidate_columns: Option<Vec<String>>,
    /// Output columns: numeric names, then one-hot names.
    pub output_columns: Vec<String>,
}

impl PreparerState {
    /// Check that the state is internally consistent.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidBundle` describing the first inconsistency.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.numeric_statistics.column_names() != self.numeric_columns {
            return Err(ModelError::InvalidBundle(
                "numeric statistics do not match numeric columns".to_string(),
            ));
        }
        if self.encoder_vocabulary.column_names() != self.categorical_columns {
            return Err(ModelError::InvalidBundle(
                "encoder vocabulary does not match categorical columns".to_string(),
            ));
        }
        if self.encoder_vocabulary.columns.iter().any(|c| !c.levels.is_sorted()) {
            return Err(ModelError::InvalidBundle("encoder levels must be sorted".to_string()));
        }

        let expected = output_columns(&self.numeric_columns, &self.encoder_vocabulary);
        if expected != self.output_columns {
            return Err(ModelError::InvalidBundle(
                "output columns do not match numeric columns and vocabulary".to_string(),
            ));
        }
        check_unique(&self.output_columns)?;
        Ok(())
    }
}

fn output_columns(numeric_columns: &[String], vocabulary: &Vocabulary) -> Vec<String> {
    let mut columns = numeric_columns.to_vec();
    columns.extend(vocabulary.output_columns());
    columns
}

fn check_unique(columns: &[String]) -> Result<(), TransformError> {
    let mut seen = HashSet::with_capacity(columns.len());
    match columns.iter().find(|c| !seen.insert(c.as_str())) {
        Some(duplicate) => {
            Err(TransformError::InvalidParameter(format!("duplicate output column {duplicate}")))
        }
        None => Ok(()),
    }
}

fn subset(df: &DataFrame, columns: &[String]) -> PolarsResult<DataFrame> {
    df.select(columns.iter().map(String::as_str))
}

#[derive(Debug, Clone)]
struct Fitted {
    fit_columns: Vec<String>,
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    output_columns: Vec<String>,
    dates: Option<DateFeatureExtractor>,
    numeric: NumericImputerScaler,
    encoder: OneHotEncoder,
}

/// Turns a raw mixed-type table into a numeric feature matrix.
///
/// At fit, the table is split by dtype: text columns are one-hot encoded,
/// everything else is median-imputed and robust-scaled. The split, the
/// statistics and the output columns are frozen, so every later `transform`
/// yields exactly the same column names in the same order.
#[derive(Debug, Clone, Default)]
pub struct DataFramePreparer {
    config: PreparerConfig,
    fitted: Option<Fitted>,
}

impl DataFramePreparer {
    /// Create an unfitted preparer without date extraction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unfitted preparer with a custom configuration.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidConfig` if the date configuration is invalid.
    pub fn with_config(config: PreparerConfig) -> Result<Self, ModelError> {
        if let Some(dates) = &config.date_extraction {
            dates.validate().map_err(|e| ModelError::InvalidConfig(e.to_string()))?;
        }
        Ok(Self { config, fitted: None })
    }

    /// Rebuild a fitted preparer from persisted state.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidBundle` if the state is inconsistent.
    pub fn from_state(state: PreparerState) -> Result<Self, ModelError> {
        state.validate()?;

        let dates = state.date_candidate_columns.map(|candidate_columns| {
            DateFeatureExtractor::from_params(DateParams { candidate_columns })
        });
        let config = PreparerConfig {
            date_extraction: dates.as_ref().map(|d| d.config().clone()),
        };

        Ok(Self {
            config,
            fitted: Some(Fitted {
                fit_columns: state.fit_columns,
                numeric_columns: state.numeric_columns,
                categorical_columns: state.categorical_columns,
                output_columns: state.output_columns,
                dates,
                numeric: NumericImputerScaler::from_params(state.numeric_statistics),
                encoder: OneHotEncoder::from_vocabulary(state.encoder_vocabulary),
            }),
        })
    }

    /// Snapshot of the fitted state, for persistence.
    #[must_use]
    pub fn state(&self) -> Option<PreparerState> {
        let fitted = self.fitted.as_ref()?;
        Some(PreparerState {
            fit_columns: fitted.fit_columns.clone(),
            numeric_columns: fitted.numeric_columns.clone(),
            categorical_columns: fitted.categorical_columns.clone(),
            numeric_statistics: fitted.numeric.params().cloned().unwrap_or_default(),
            encoder_vocabulary: fitted.encoder.vocabulary().cloned().unwrap_or_default(),
            date_candidate_columns: fitted.dates.as_ref().map(|d| d.candidate_columns().to_vec()),
            output_columns: fitted.output_columns.clone(),
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PreparerConfig {
        &self.config
    }

    /// Frozen output column names; empty before fit.
    #[must_use]
    pub fn output_columns(&self) -> &[String] {
        self.fitted.as_ref().map_or(&[], |f| f.output_columns.as_slice())
    }

    /// Columns required at transform time; empty before fit.
    #[must_use]
    pub fn fit_columns(&self) -> &[String] {
        self.fitted.as_ref().map_or(&[], |f| f.fit_columns.as_slice())
    }

    /// Columns routed to the numeric branch; empty before fit.
    #[must_use]
    pub fn numeric_columns(&self) -> &[String] {
        self.fitted.as_ref().map_or(&[], |f| f.numeric_columns.as_slice())
    }

    /// Columns routed to the encoder; empty before fit.
    #[must_use]
    pub fn categorical_columns(&self) -> &[String] {
        self.fitted.as_ref().map_or(&[], |f| f.categorical_columns.as_slice())
    }
}

impl FrameTransform for DataFramePreparer {
    type Output = FeatureMatrix;

    fn fit(&mut self, df: &DataFrame) -> Result<(), TransformError> {
        let fit_columns: Vec<String> =
            df.get_column_names().iter().map(|name| name.to_string()).collect();

        let (dates, frame) = match &self.config.date_extraction {
            Some(config) => {
                let mut extractor = DateFeatureExtractor::with_config(config.clone())?;
                let frame = extractor.fit_transform(df)?;
                (Some(extractor), Cow::Owned(frame))
            }
            None => (None, Cow::Borrowed(df)),
        };

        let mut numeric_columns = Vec::new();
        let mut categorical_columns = Vec::new();
        for column in frame.get_columns() {
            let kind = classify_dtype(column.dtype());
            debug!(column = %column.name(), dtype = %column.dtype(), %kind, "partitioned column");
            match kind {
                ColumnKind::Categorical => categorical_columns.push(column.name().to_string()),
                ColumnKind::Numeric => numeric_columns.push(column.name().to_string()),
                // only the date extractor knows how to turn these into features
                ColumnKind::Date => {
                    return Err(TransformError::TypeMismatch {
                        column: column.name().to_string(),
                        detail: format!(
                            "dtype {} needs date extraction before preparation",
                            column.dtype()
                        ),
                    });
                }
            }
        }

        let mut numeric = NumericImputerScaler::new();
        numeric.fit(&subset(&frame, &numeric_columns)?)?;
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&subset(&frame, &categorical_columns)?)?;

        let vocabulary = encoder.vocabulary().cloned().unwrap_or_default();
        let output_columns = output_columns(&numeric_columns, &vocabulary);
        check_unique(&output_columns)?;

        info!(
            n_fit_columns = fit_columns.len(),
            n_numeric = numeric_columns.len(),
            n_categorical = categorical_columns.len(),
            n_date_candidates = dates.as_ref().map_or(0, |d| d.candidate_columns().len()),
            n_outputs = output_columns.len(),
            "fitted preparer"
        );

        self.fitted = Some(Fitted {
            fit_columns,
            numeric_columns,
            categorical_columns,
            output_columns,
            dates,
            numeric,
            encoder,
        });
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<FeatureMatrix, TransformError> {
        let fitted = self.fitted.as_ref().ok_or_else(|| TransformError::Unfitted(NAME.into()))?;
        TransformError::check_columns(df, &fitted.fit_columns, NAME)?;

        let frame = match &fitted.dates {
            Some(dates) => Cow::Owned(dates.transform(df)?),
            None => Cow::Borrowed(df),
        };

        let numeric = fitted.numeric.transform(&frame)?;
        let encoded = fitted.encoder.transform(&frame)?;
        let out = numeric.hstack(&encoded)?;

        debug!(rows = out.n_rows(), columns = out.n_cols(), "prepared features");
        Ok(out)
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn name(&self) -> &str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn customers() -> DataFrame {
        df! {
            "tenure" => &[Some(1i64), Some(24), None, Some(60)],
            "MonthlyCharges" => &[29.85, 56.95, 53.85, 42.30],
            "Contract" => &["Month-to-month", "One year", "Month-to-month", "Two year"],
            "PaymentMethod" => &[Some("Electronic check"), Some("Mailed check"), None, Some("Mailed check")],
        }
        .unwrap()
    }

    fn fitted() -> DataFramePreparer {
        let mut preparer = DataFramePreparer::new();
        preparer.fit(&customers()).unwrap();
        preparer
    }

    fn expected_columns() -> Vec<String> {
        [
            "tenure",
            "MonthlyCharges",
            "Contract_Month-to-month",
            "Contract_One year",
            "Contract_Two year",
            "PaymentMethod_Electronic check",
            "PaymentMethod_Mailed check",
            "PaymentMethod_nan",
        ]
        .map(String::from)
        .to_vec()
    }

    #[test]
    fn output_schema() {
        let preparer = fitted();
        assert_eq!(preparer.output_columns(), expected_columns().as_slice());
        assert_eq!(preparer.numeric_columns(), &["tenure".to_string(), "MonthlyCharges".to_string()]);

        let out = preparer.transform(&customers()).unwrap();
        assert_eq!(out.names(), expected_columns().as_slice());
        assert_eq!(out.n_rows(), 4);
        assert_eq!(out.column("PaymentMethod_nan").unwrap().to_vec(), vec![0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn missing_category_gets_its_own_indicator() {
        let mut preparer = DataFramePreparer::new();
        let df = df! { "pay" => &[Some("A"), None, Some("B")] }.unwrap();
        let out = preparer.fit_transform(&df).unwrap();
        assert_eq!(out.names(), &["pay_A".to_string(), "pay_B".to_string(), "pay_nan".to_string()]);
        assert_eq!(out.values().row(1).to_vec(), vec![0.0, 0.0, 1.0]);

        let unseen = df! { "pay" => &["C"] }.unwrap();
        let out = preparer.transform(&unseen).unwrap();
        assert_eq!(out.values().row(0).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_level_clashing_with_real_level_rejected() {
        let mut preparer = DataFramePreparer::new();
        let df = df! { "pay" => &[Some("nan"), None] }.unwrap();
        let err = preparer.fit(&df).unwrap_err();
        assert!(matches!(err, TransformError::InvalidParameter(ref m) if m.contains("pay_nan")));
    }

    #[test]
    fn undecomposed_date_column_rejected() {
        let signup = Column::new("signup".into(), &[19000i32, 19100]).cast(&DataType::Date).unwrap();
        let tenure = Column::new("tenure".into(), &[1.0, 2.0]);
        let df = DataFrame::new(vec![signup, tenure]).unwrap();

        let mut preparer = DataFramePreparer::new();
        match preparer.fit(&df).unwrap_err() {
            TransformError::TypeMismatch { column, .. } => assert_eq!(column, "signup"),
            other => panic!("unexpected error {other}"),
        }
        assert!(!preparer.is_fitted());
    }

    #[test]
    fn schema_is_stable_across_inputs() {
        let preparer = fitted();
        let single = df! {
            "PaymentMethod" => &["Bank transfer"],
            "Contract" => &["Two year"],
            "MonthlyCharges" => &[99.0],
            "tenure" => &[None::<i64>],
            "extra" => &[1.0],
        }
        .unwrap();

        let out = preparer.transform(&single).unwrap();
        assert_eq!(out.names(), expected_columns().as_slice());
        assert_eq!(out.n_rows(), 1);

        // unseen payment method encodes as zeros
        assert_eq!(out.column("PaymentMethod_Electronic check").unwrap()[0], 0.0);
        assert_eq!(out.column("PaymentMethod_Mailed check").unwrap()[0], 0.0);
        assert_eq!(out.column("PaymentMethod_nan").unwrap()[0], 0.0);
        assert_eq!(out.column("Contract_Two year").unwrap()[0], 1.0);
        // missing tenure imputes to the training median and scales to 0
        assert_relative_eq!(out.column("tenure").unwrap()[0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn missing_fit_columns_are_all_listed() {
        let preparer = fitted();
        let partial = df! { "tenure" => &[1i64] }.unwrap();
        let err = preparer.transform(&partial).unwrap_err();
        assert_eq!(
            err.missing_columns(),
            &["MonthlyCharges".to_string(), "Contract".to_string(), "PaymentMethod".to_string()]
        );
    }

    #[test]
    fn only_numeric_columns() {
        let mut preparer = DataFramePreparer::new();
        let df = df! { "a" => &[1.0, 2.0, 3.0], "b" => &[1i32, 2, 3] }.unwrap();
        let out = preparer.fit_transform(&df).unwrap();
        assert_eq!(out.n_cols(), 2);
        assert_eq!(out.n_rows(), 3);
        assert!(preparer.categorical_columns().is_empty());
    }

    #[test]
    fn only_categorical_columns() {
        let mut preparer = DataFramePreparer::new();
        let df = df! { "plan" => &["A", "B", "A"] }.unwrap();
        let out = preparer.fit_transform(&df).unwrap();
        assert_eq!(out.names(), &["plan_A".to_string(), "plan_B".to_string()]);
        assert_eq!(out.n_rows(), 3);
    }

    #[test]
    fn duplicate_output_names_rejected() {
        let mut preparer = DataFramePreparer::new();
        let df = df! { "plan_A" => &[1.0, 0.0], "plan" => &["A", "B"] }.unwrap();
        let err = preparer.fit(&df).unwrap_err();
        assert!(matches!(err, TransformError::InvalidParameter(ref m) if m.contains("plan_A")));
        assert!(!preparer.is_fitted());
    }

    #[test]
    fn transform_before_fit() {
        let err = DataFramePreparer::new().transform(&customers()).unwrap_err();
        assert!(matches!(err, TransformError::Unfitted(_)));
    }

    #[test]
    fn state_round_trip() {
        let preparer = fitted();
        let state = preparer.state().unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let restored =
            DataFramePreparer::from_state(serde_json::from_str(&json).unwrap()).unwrap();

        let a = preparer.transform(&customers()).unwrap();
        let b = restored.transform(&customers()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn inconsistent_state_rejected() {
        let mut state = fitted().state().unwrap();
        state.output_columns.pop();
        assert!(matches!(DataFramePreparer::from_state(state), Err(ModelError::InvalidBundle(_))));
    }

    #[test]
    fn date_columns_are_decomposed() {
        let mut preparer = DataFramePreparer::with_config(PreparerConfig::with_dates()).unwrap();
        let df = df! {
            "signup_date" => &["2024-01-15", "2023-06-30", "2022-11-02"],
            "tenure" => &[3.0, 10.0, 20.0],
        }
        .unwrap();
        preparer.fit(&df).unwrap();

        let state = preparer.state().unwrap();
        assert_eq!(state.date_candidate_columns, Some(vec!["signup_date".to_string()]));
        assert_eq!(preparer.numeric_columns(), &["signup_date_year".to_string(), "tenure".to_string()]);
        assert_eq!(
            preparer.categorical_columns(),
            &["signup_date_month".to_string(), "signup_date_day".to_string()]
        );

        // later batch with unparseable dates keeps the same schema
        let later = df! { "signup_date" => &["unknown"], "tenure" => &[5.0] }.unwrap();
        let out = preparer.transform(&later).unwrap();
        assert_eq!(out.names(), preparer.output_columns());
        assert_eq!(out.column("signup_date_month_January").unwrap()[0], 0.0);
    }

    #[test]
    fn invalid_date_config() {
        let config = PreparerConfig {
            date_extraction: Some(DateExtractorConfig { min_parse_ratio: 2.0, ..Default::default() }),
        };
        assert!(matches!(DataFramePreparer::with_config(config), Err(ModelError::InvalidConfig(_))));
    }
}
