#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/churnkit/churnkit/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod values;
pub use values::classify_dtype;

mod numeric;
pub use numeric::{NumericColumnStats, NumericImputerScaler, NumericParams};

mod onehot;
pub use onehot::{CategoryLevels, MISSING_LEVEL, OneHotEncoder, Vocabulary};

mod dates;
pub use dates::{DateExtractorConfig, DateFeatureExtractor, DateParams, parse_date, parse_ratio};
