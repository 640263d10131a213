#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/churnkit/churnkit/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod preparer;
pub use preparer::{DataFramePreparer, PreparerConfig, PreparerState};

mod filter;
pub use filter::ColumnFilter;

mod classifier;
pub use classifier::{BundledClassifier, LinearScorer, LogisticClassifier};

mod bundle;
pub use bundle::{FeatureImportance, ModelBundle, RiskSummary, ScoringConfig};

mod frame;
pub use frame::feature_frame;

mod error;
pub use error::ModelError;

/// Re-export commonly used types.
pub mod prelude {
    pub use churnkit_primitives::{FeatureMatrix, Prediction, RiskLevel};
    pub use churnkit_traits::{Classifier, FrameTransform};

    pub use super::{
        ColumnFilter, DataFramePreparer, ModelBundle, ModelError, PreparerConfig, ScoringConfig,
    };
}
