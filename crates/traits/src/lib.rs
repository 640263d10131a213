#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/churnkit/churnkit/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod transform;
pub use transform::{FrameTransform, TransformError};

mod classifier;
pub use classifier::{Classifier, ScoringError};
