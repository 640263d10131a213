#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/churnkit/churnkit/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod column;
pub use column::{ColumnKind, FeatureName};

mod matrix;
pub use matrix::FeatureMatrix;

mod prediction;
pub use prediction::{ConfusionMatrix, Prediction, RiskLevel};

/// Re-export common date type.
pub type Date = chrono::NaiveDate;
