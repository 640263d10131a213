#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/churnkit/churnkit/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod quantile;
pub use quantile::{mean, median, quantile, quantile_sorted, sorted_finite};

mod robust;
pub use robust::RobustStats;

mod error;
pub use error::MathError;
