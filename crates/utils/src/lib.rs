#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/churnkit/churnkit/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod coerce;
pub use coerce::{CoercionConfig, CoercionDecision, assess_numeric_coercion, coerce_numeric_columns};

mod impute;
pub use impute::{FillValue, ImputationDirective, ImputeStrategy, apply_imputations};

mod plan;
pub use plan::{CleaningPlan, drop_excluded};

mod error;
pub use error::UtilsError;
