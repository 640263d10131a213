//! Persisted model bundles and batch scoring.

use std::io::Read;

use churnkit_primitives::{ConfusionMatrix, Prediction, RiskLevel};
use churnkit_traits::{Classifier, FrameTransform};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{BundledClassifier, ColumnFilter, DataFramePreparer, ModelError, PreparerState};

const DEFAULT_TARGET: &str = "Churn";

fn default_target() -> String {
    DEFAULT_TARGET.to_string()
}

/// Scoring settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Probability at or above which a row is flagged as churn.
    pub threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

impl ScoringConfig {
    /// Check the configuration.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidConfig` if the threshold is outside [0, 1].
    pub fn validate(&self) -> Result<(), ModelError> {
        if (0.0..=1.0).contains(&self.threshold) {
            Ok(())
        } else {
            Err(ModelError::InvalidConfig(format!(
                "threshold must be in [0, 1], got {}",
                self.threshold
            )))
        }
    }
}

/// A feature and its importance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Feature name.
    pub feature: String,
    /// Importance reported at training time.
    pub importance: f64,
}

/// Counts of predictions per risk band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    /// Predictions below the medium band.
    pub low: usize,
    /// Predictions in the medium band.
    pub medium: usize,
    /// Predictions in the high band.
    pub high: usize,
    /// Predictions flagged as churn at the scoring threshold.
    pub churn: usize,
    /// Number of predictions.
    pub total: usize,
}

impl RiskSummary {
    /// Summarize a batch of predictions.
    #[must_use]
    pub fn from_predictions(predictions: &[Prediction]) -> Self {
        predictions.iter().fold(Self::default(), |mut acc, p| {
            match p.risk_level() {
                RiskLevel::Low => acc.low += 1,
                RiskLevel::Medium => acc.medium += 1,
                RiskLevel::High => acc.high += 1,
            }
            acc.churn += usize::from(p.churn);
            acc.total += 1;
            acc
        })
    }

    /// Share of predictions flagged as churn, or `None` for an empty batch.
    #[must_use]
    pub fn churn_rate(&self) -> Option<f64> {
        (self.total > 0).then(|| self.churn as f64 / self.total as f64)
    }
}

/// A fitted preparer together with the classifier trained on its output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    /// Fitted preparation state.
    pub pipeline: PreparerState,
    /// Trained classifier.
    pub classifier: BundledClassifier,
    /// Name of the label column, dropped before scoring.
    #[serde(default = "default_target")]
    pub target_name: String,
    /// Raw columns the model was trained on, target included.
    #[serde(default)]
    pub raw_features: Vec<String>,
    /// Prepared columns fed to the classifier, when a subset was selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_features: Option<Vec<String>>,
    /// Importance per classifier feature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
    /// Hold-out confusion matrix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confusion_matrix: Option<ConfusionMatrix>,
}

impl ModelBundle {
    /// Bundle a fitted preparer with a classifier.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidBundle` if the preparer is not fitted.
    pub fn new(
        preparer: &DataFramePreparer,
        classifier: BundledClassifier,
    ) -> Result<Self, ModelError> {
        let pipeline = preparer
            .state()
            .ok_or_else(|| ModelError::InvalidBundle("preparer is not fitted".to_string()))?;
        Ok(Self {
            raw_features: pipeline.fit_columns.clone(),
            pipeline,
            classifier,
            target_name: default_target(),
            selected_features: None,
            feature_importances: None,
            confusion_matrix: None,
        })
    }

    /// Parse a bundle from JSON.
    ///
    /// # Errors
    /// Returns `ModelError::Json` on malformed input.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a bundle from a JSON stream.
    ///
    /// # Errors
    /// Returns `ModelError::Json` on malformed input or read failure.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Serialize the bundle to JSON.
    ///
    /// # Errors
    /// Returns `ModelError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Rebuild the fitted preparer.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidBundle` if the pipeline state is inconsistent.
    pub fn preparer(&self) -> Result<DataFramePreparer, ModelError> {
        DataFramePreparer::from_state(self.pipeline.clone())
    }

    /// Names of the columns fed to the classifier.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        self.selected_features.as_deref().unwrap_or(self.pipeline.output_columns.as_slice())
    }

    /// Raw input columns expected from callers: `raw_features` without the
    /// target, or the fit columns when no raw list was stored.
    #[must_use]
    pub fn input_features(&self) -> Vec<String> {
        let raw = if self.raw_features.is_empty() {
            &self.pipeline.fit_columns
        } else {
            &self.raw_features
        };
        raw.iter().filter(|c| **c != self.target_name).cloned().collect()
    }

    /// Score a table with the default threshold.
    ///
    /// # Errors
    /// See [`ModelBundle::score_with`].
    pub fn score(&self, df: &DataFrame) -> Result<Vec<Prediction>, ModelError> {
        self.score_with(df, &ScoringConfig::default())
    }

    /// Score a table, one prediction per row.
    ///
    /// The target column is dropped if present. Classifiers without
    /// probabilities have their decision scores min-max normalized.
    ///
    /// # Errors
    /// Returns `ModelError` on schema mismatch, width mismatch or an
    /// invalid threshold.
    pub fn score_with(
        &self,
        df: &DataFrame,
        config: &ScoringConfig,
    ) -> Result<Vec<Prediction>, ModelError> {
        config.validate()?;

        let has_target = df.get_column_names().iter().any(|c| c.as_str() == self.target_name);
        let features = if has_target { df.drop(&self.target_name)? } else { df.clone() };

        let prepared = self.preparer()?.transform(&features)?;
        let selected = ColumnFilter::new(self.feature_names().iter().cloned()).filter_named(&prepared);
        self.classifier.check_width(selected.values())?;

        let probabilities = match self.classifier.predict_proba(selected.values())? {
            Some(p) => p,
            None => {
                debug!("classifier has no probabilities; normalizing decision scores");
                min_max(&self.classifier.decision_function(selected.values())?)
            }
        };

        let predictions: Vec<Prediction> = probabilities
            .iter()
            .map(|&p| Prediction::from_probability(p, config.threshold))
            .collect();

        info!(
            rows = predictions.len(),
            churn = predictions.iter().filter(|p| p.churn).count(),
            threshold = config.threshold,
            "scored table"
        );
        Ok(predictions)
    }

    /// Importances paired with feature names, highest first.
    ///
    /// Names come from `selected_features`, else the preparer output
    /// columns, else `F{i}` when neither matches the importance count.
    #[must_use]
    pub fn ranked_importances(&self, top_n: Option<usize>) -> Vec<FeatureImportance> {
        let Some(importances) = &self.feature_importances else {
            return Vec::new();
        };

        let names = self.feature_names();
        let mut ranked: Vec<FeatureImportance> = importances
            .iter()
            .enumerate()
            .map(|(i, &importance)| FeatureImportance {
                feature: if names.len() == importances.len() {
                    names[i].clone()
                } else {
                    format!("F{i}")
                },
                importance,
            })
            .collect();

        ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        if let Some(n) = top_n {
            ranked.truncate(n);
        }
        ranked
    }

    /// Check that the bundle is internally consistent.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidBundle` describing the first inconsistency.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.pipeline.validate()?;

        if let Some(selected) = &self.selected_features {
            if let Some(unknown) =
                selected.iter().find(|s| !self.pipeline.output_columns.contains(*s))
            {
                return Err(ModelError::InvalidBundle(format!(
                    "selected feature {unknown} is not produced by the pipeline"
                )));
            }
        }

        let n_features = self.feature_names().len();
        if self.classifier.n_features() != n_features {
            return Err(ModelError::InvalidBundle(format!(
                "classifier expects {} features, bundle scores {n_features}",
                self.classifier.n_features()
            )));
        }

        if let Some(importances) = &self.feature_importances {
            if importances.len() != n_features {
                return Err(ModelError::InvalidBundle(format!(
                    "{} importances for {n_features} features",
                    importances.len()
                )));
            }
        }

        if let Some(cm) = &self.confusion_matrix {
            if cm.n_classes().is_none() {
                return Err(ModelError::InvalidBundle("confusion matrix is not square".to_string()));
            }
        }

        Ok(())
    }
}

fn min_max(scores: &Array1<f64>) -> Array1<f64> {
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    scores.mapv(|s| (s - min) / (max - min + 1e-9))
}
