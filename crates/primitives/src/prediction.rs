//! Scoring output and diagnostic types.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Retention risk band of a churn probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Below 0.4.
    #[display("low")]
    Low,
    /// From 0.4 up to 0.7.
    #[display("medium")]
    Medium,
    /// 0.7 and above.
    #[display("high")]
    High,
}

impl RiskLevel {
    /// Lower bound of the medium band.
    pub const MEDIUM_FROM: f64 = 0.4;
    /// Lower bound of the high band.
    pub const HIGH_FROM: f64 = 0.7;

    /// Band for a probability.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability >= Self::HIGH_FROM {
            Self::High
        } else if probability >= Self::MEDIUM_FROM {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Churn prediction for a single row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Probability of the positive (churn) class.
    pub probability: f64,
    /// Whether the probability reached the decision threshold.
    pub churn: bool,
}

impl Prediction {
    /// Create a prediction from a probability and a decision threshold.
    #[must_use]
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        Self { probability, churn: probability >= threshold }
    }

    /// Risk band of this prediction.
    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_probability(self.probability)
    }
}

/// Confusion matrix recorded at training time.
///
/// Rows are true classes, columns are predicted classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfusionMatrix(pub Vec<Vec<u64>>);

impl ConfusionMatrix {
    /// Number of classes, or `None` if the matrix is not square.
    #[must_use]
    pub fn n_classes(&self) -> Option<usize> {
        let n = self.0.len();
        self.0.iter().all(|row| row.len() == n).then_some(n)
    }

    /// Total number of observations.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.iter().flatten().sum()
    }

    /// Fraction of observations on the diagonal.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        let n = self.n_classes()?;
        let total = self.total();
        if total == 0 {
            return None;
        }
        let correct: u64 = (0..n).map(|i| self.0[i][i]).sum();
        Some(correct as f64 / total as f64)
    }
}
