//! Date detection and decomposition.
//!
//! A column becomes a date candidate at fit time when its name contains one
//! of the configured tokens and enough of its values parse as dates. Each
//! candidate is then replaced in place by three columns:
//!
//! - `{column}_year`: calendar year (Int32)
//! - `{column}_month`: English month name
//! - `{column}_day`: English weekday name
//!
//! Values that fail to parse yield nulls in all three.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use churnkit_primitives::Date;
use churnkit_traits::{FrameTransform, TransformError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::values::string_values;

const NAME: &str = "date extractor";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Parse a date from common textual layouts.
///
/// Month-first is tried before day-first for slash-separated dates.
#[must_use]
pub fn parse_date(text: &str) -> Option<Date> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

/// Settings for date candidate detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateExtractorConfig {
    /// Case-insensitive substrings that mark a column name as date-like.
    pub tokens: Vec<String>,
    /// Minimum share of rows that must parse for a column to qualify.
    pub min_parse_ratio: f64,
}

impl Default for DateExtractorConfig {
    fn default() -> Self {
        Self {
            tokens: vec!["date".to_string(), "fecha".to_string(), "time".to_string()],
            min_parse_ratio: 0.8,
        }
    }
}

impl DateExtractorConfig {
    /// Check the configuration.
    ///
    /// # Errors
    /// Returns `TransformError::InvalidParameter` if the ratio is outside [0, 1].
    pub fn validate(&self) -> Result<(), TransformError> {
        if !(0.0..=1.0).contains(&self.min_parse_ratio) {
            return Err(TransformError::InvalidParameter(format!(
                "min_parse_ratio must be in [0, 1], got {}",
                self.min_parse_ratio
            )));
        }
        Ok(())
    }

    fn name_matches(&self, column: &str) -> bool {
        let lower = column.to_lowercase();
        self.tokens.iter().any(|t| lower.contains(&t.to_lowercase()))
    }
}

/// Frozen date candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParams {
    /// Columns decomposed at transform time, in frame order.
    pub candidate_columns: Vec<String>,
}

/// Share of rows in `column` that parse as dates; nulls count as failures.
///
/// # Errors
/// Returns `TransformError` if the column cannot be read as text.
pub fn parse_ratio(column: &Column) -> Result<f64, TransformError> {
    if column.is_empty() {
        return Ok(0.0);
    }
    let values = string_values(column)?;
    let parsed = values.iter().flatten().filter(|v| parse_date(v).is_some()).count();
    Ok(parsed as f64 / values.len() as f64)
}

const fn is_date_like_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Date | DataType::Datetime(_, _))
}

const PART_SUFFIXES: [&str; 3] = ["year", "month", "day"];

fn part_names(name: &str) -> [String; 3] {
    PART_SUFFIXES.map(|suffix| format!("{name}_{suffix}"))
}

/// Fail if a derived part name is already taken by a column that stays.
fn check_part_collisions(df: &DataFrame, candidates: &[String]) -> Result<(), TransformError> {
    let kept: Vec<&str> = df
        .get_column_names()
        .into_iter()
        .map(|n| n.as_str())
        .filter(|n| !candidates.iter().any(|c| c == n))
        .collect();
    for candidate in candidates {
        if let Some(clash) = part_names(candidate).into_iter().find(|p| kept.contains(&p.as_str())) {
            return Err(TransformError::InvalidParameter(format!(
                "date part {clash} of {candidate} collides with an existing column"
            )));
        }
    }
    Ok(())
}

fn decompose(column: &Column) -> Result<[Column; 3], TransformError> {
    let name = column.name().as_str();
    let dates: Vec<Option<Date>> = string_values(column)?
        .iter()
        .map(|v| v.as_deref().and_then(parse_date))
        .collect();

    let years: Vec<Option<i32>> = dates.iter().map(|d| d.map(|d| d.year())).collect();
    let months: Vec<Option<String>> =
        dates.iter().map(|d| d.map(|d| d.format("%B").to_string())).collect();
    let days: Vec<Option<String>> =
        dates.iter().map(|d| d.map(|d| d.format("%A").to_string())).collect();

    let [year, month, day] = part_names(name);
    Ok([
        Column::new(year.into(), years),
        Column::new(month.into(), months),
        Column::new(day.into(), days),
    ])
}

/// Detects date-like columns at fit time and decomposes them at transform time.
#[derive(Debug, Clone, Default)]
pub struct DateFeatureExtractor {
    config: DateExtractorConfig,
    params: Option<DateParams>,
}

impl DateFeatureExtractor {
    /// Create an unfitted extractor with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unfitted extractor with a custom configuration.
    ///
    /// # Errors
    /// Returns `TransformError::InvalidParameter` if the configuration is invalid.
    pub fn with_config(config: DateExtractorConfig) -> Result<Self, TransformError> {
        config.validate()?;
        Ok(Self { config, params: None })
    }

    /// Rebuild a fitted extractor from frozen candidates.
    #[must_use]
    pub fn from_params(params: DateParams) -> Self {
        Self { config: DateExtractorConfig::default(), params: Some(params) }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &DateExtractorConfig {
        &self.config
    }

    /// Frozen candidates, if fitted.
    #[must_use]
    pub const fn params(&self) -> Option<&DateParams> {
        self.params.as_ref()
    }

    /// Frozen candidate column names; empty before fit.
    #[must_use]
    pub fn candidate_columns(&self) -> &[String] {
        self.params.as_ref().map_or(&[], |p| p.candidate_columns.as_slice())
    }
}

impl FrameTransform for DateFeatureExtractor {
    type Output = DataFrame;

    fn fit(&mut self, df: &DataFrame) -> Result<(), TransformError> {
        let mut candidate_columns = Vec::new();

        if df.height() > 0 {
            for column in df.get_columns() {
                let name = column.name().as_str();
                if !is_date_like_dtype(column.dtype()) || !self.config.name_matches(name) {
                    continue;
                }
                let ratio = parse_ratio(column)?;
                let accepted = ratio >= self.config.min_parse_ratio;
                debug!(column = name, ratio, accepted, "date candidate check");
                if accepted {
                    candidate_columns.push(name.to_string());
                }
            }
        }

        check_part_collisions(df, &candidate_columns)?;

        info!(n_candidates = candidate_columns.len(), "fitted date extractor");
        self.params = Some(DateParams { candidate_columns });
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame, TransformError> {
        let params = self.params.as_ref().ok_or_else(|| TransformError::Unfitted(NAME.into()))?;
        if params.candidate_columns.is_empty() {
            return Ok(df.clone());
        }
        TransformError::check_columns(df, &params.candidate_columns, NAME)?;
        check_part_collisions(df, &params.candidate_columns)?;

        let mut columns = Vec::with_capacity(df.width() + 2 * params.candidate_columns.len());
        for column in df.get_columns() {
            if params.candidate_columns.iter().any(|c| c == column.name().as_str()) {
                columns.extend(decompose(column)?);
            } else {
                columns.push(column.clone());
            }
        }

        Ok(DataFrame::new(columns)?)
    }

    fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    fn name(&self) -> &str {
        NAME
    }
}
