//! Linear classifiers stored in model bundles.

use churnkit_traits::{Classifier, ScoringError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

fn linear_scores(
    features: &Array2<f64>,
    coefficients: &[f64],
    intercept: f64,
) -> Result<Array1<f64>, ScoringError> {
    let weights = Array1::from(coefficients.to_vec());
    let scores = features.dot(&weights) + intercept;
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(ScoringError::Numerical("non-finite decision score".to_string()));
    }
    Ok(scores)
}

/// Logistic regression with calibrated churn probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticClassifier {
    /// One weight per input feature.
    pub coefficients: Vec<f64>,
    /// Bias term.
    pub intercept: f64,
    /// Class labels, negative class first.
    #[serde(default = "default_classes")]
    pub classes: Vec<String>,
}

fn default_classes() -> Vec<String> {
    vec!["No".to_string(), "Yes".to_string()]
}

impl LogisticClassifier {
    /// Create a new classifier with `["No", "Yes"]` labels.
    #[must_use]
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self { coefficients, intercept, classes: default_classes() }
    }
}

impl Classifier for LogisticClassifier {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn decision_function(&self, features: &Array2<f64>) -> Result<Array1<f64>, ScoringError> {
        self.check_width(features)?;
        linear_scores(features, &self.coefficients, self.intercept)
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Option<Array1<f64>>, ScoringError> {
        let scores = self.decision_function(features)?;
        Ok(Some(scores.mapv(|s| 1.0 / (1.0 + (-s).exp()))))
    }
}

/// Linear scorer without probability calibration, such as a linear SVM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearScorer {
    /// One weight per input feature.
    pub coefficients: Vec<f64>,
    /// Bias term.
    pub intercept: f64,
}

impl Classifier for LinearScorer {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn decision_function(&self, features: &Array2<f64>) -> Result<Array1<f64>, ScoringError> {
        self.check_width(features)?;
        linear_scores(features, &self.coefficients, self.intercept)
    }
}

/// Any classifier a bundle can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BundledClassifier {
    /// Calibrated logistic regression.
    Logistic(LogisticClassifier),
    /// Uncalibrated linear scorer.
    Linear(LinearScorer),
}

impl Classifier for BundledClassifier {
    fn n_features(&self) -> usize {
        match self {
            Self::Logistic(c) => c.n_features(),
            Self::Linear(c) => c.n_features(),
        }
    }

    fn decision_function(&self, features: &Array2<f64>) -> Result<Array1<f64>, ScoringError> {
        match self {
            Self::Logistic(c) => c.decision_function(features),
            Self::Linear(c) => c.decision_function(features),
        }
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Option<Array1<f64>>, ScoringError> {
        match self {
            Self::Logistic(c) => c.predict_proba(features),
            Self::Linear(c) => c.predict_proba(features),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn logistic_probabilities() {
        let clf = LogisticClassifier::new(vec![1.0, -1.0], 0.0);
        let x = array![[0.0, 0.0], [2.0, 0.0]];
        let proba = clf.predict_proba(&x).unwrap().unwrap();
        assert_relative_eq!(proba[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(proba[1], 1.0 / (1.0 + (-2.0f64).exp()), epsilon = 1e-12);
    }

    #[test]
    fn linear_scorer_has_no_probabilities() {
        let clf = LinearScorer { coefficients: vec![2.0], intercept: 1.0 };
        let x = array![[1.0], [3.0]];
        assert_eq!(clf.decision_function(&x).unwrap(), array![3.0, 7.0]);
        assert!(clf.predict_proba(&x).unwrap().is_none());
    }

    #[test]
    fn width_is_checked() {
        let clf = BundledClassifier::Logistic(LogisticClassifier::new(vec![1.0, 2.0, 3.0], 0.0));
        let err = clf.decision_function(&array![[1.0, 2.0]]).unwrap_err();
        assert!(matches!(err, ScoringError::DimensionMismatch { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn non_finite_scores() {
        let clf = LinearScorer { coefficients: vec![1.0], intercept: 0.0 };
        assert!(matches!(
            clf.decision_function(&array![[f64::NAN]]),
            Err(ScoringError::Numerical(_))
        ));
    }

    #[test]
    fn tagged_json() {
        let json = r#"{"kind":"logistic","coefficients":[0.5],"intercept":-1.0}"#;
        let clf: BundledClassifier = serde_json::from_str(json).unwrap();
        assert_eq!(clf.n_features(), 1);
        match clf {
            BundledClassifier::Logistic(c) => assert_eq!(c.classes, vec!["No", "Yes"]),
            BundledClassifier::Linear(_) => panic!("expected logistic"),
        }
    }
}
