//! # churnkit
//!
//! Feature preparation and scoring for customer churn models.
//!
//! This crate provides a unified interface to the churnkit crates.
//! Individual components can be enabled via feature flags.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Core type definitions
//! - `traits`: Fit/transform and classifier traits
//! - `math`: Robust statistics
//! - `features`: Numeric scaling, one-hot encoding and date decomposition
//! - `model`: Table preparation, column filtering and bundle scoring
//! - `utils`: Data cleaning
//!
//! ## Example
//!
//! ```rust,ignore
//! use churnkit::model::prelude::*;
//! use churnkit::traits::FrameTransform;
//!
//! let mut preparer = DataFramePreparer::new();
//! let features = preparer.fit_transform(&customers)?;
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use churnkit_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use churnkit_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use churnkit_math as math;
#[cfg(feature = "features")]
#[doc(inline)]
pub use churnkit_features as features;
#[cfg(feature = "model")]
#[doc(inline)]
pub use churnkit_model as model;
#[cfg(feature = "utils")]
#[doc(inline)]
pub use churnkit_utils as utils;
