//! Missing value imputation directives.

use std::collections::BTreeMap;

use churnkit_math::{mean, median};
use derive_more::Display;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::UtilsError;

/// A constant used to fill missing values.
#[derive(Debug, Clone, PartialEq, Display, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    /// Fill a numeric column.
    #[display("{_0}")]
    Number(f64),
    /// Fill a text column.
    #[display("{_0:?}")]
    Text(String),
}

/// How missing values in one column are handled.
#[derive(Debug, Clone, PartialEq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    /// Fill with the mean of observed values (numeric only).
    #[display("mean")]
    Mean,
    /// Fill with the median of observed values (numeric only).
    #[display("median")]
    Median,
    /// Fill with the most frequent value; ties go to the smallest.
    #[display("mode")]
    Mode,
    /// Fill with a constant.
    #[display("constant({_0})")]
    Constant(FillValue),
    /// Drop rows where the column is missing.
    #[display("drop_rows")]
    DropRows,
}

/// An imputation strategy bound to a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationDirective {
    /// Target column.
    pub column: String,
    /// Strategy to apply.
    pub strategy: ImputeStrategy,
}

impl ImputationDirective {
    /// Create a new directive.
    #[must_use]
    pub fn new(column: impl Into<String>, strategy: ImputeStrategy) -> Self {
        Self { column: column.into(), strategy }
    }
}

const fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Replace NaN with null so float columns have a single notion of missing.
fn normalize_missing(df: &DataFrame, column: &Column) -> Result<DataFrame, UtilsError> {
    if !matches!(column.dtype(), DataType::Float32 | DataType::Float64) {
        return Ok(df.clone());
    }

    let values: Vec<Option<f64>> = column
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();

    let mut out = df.clone();
    out.with_column(Column::new(column.name().clone(), values))?;
    Ok(out)
}

fn observed_numbers(column: &Column) -> Result<Vec<f64>, UtilsError> {
    Ok(column.cast(&DataType::Float64)?.f64()?.into_iter().flatten().collect())
}

fn numeric_mode(column: &Column) -> Result<Option<f64>, UtilsError> {
    let mut values = observed_numbers(column)?;
    values.sort_by(|a, b| a.total_cmp(b));

    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < values.len() {
        let run = values[i..].iter().take_while(|x| **x == values[i]).count();
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((values[i], run));
        }
        i += run;
    }
    Ok(best.map(|(value, _)| value))
}

fn text_mode(column: &Column) -> Result<Option<String>, UtilsError> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in column.cast(&DataType::String)?.str()?.into_iter().flatten() {
        *counts.entry(value.to_string()).or_default() += 1;
    }

    let mut best: Option<(String, usize)> = None;
    for (value, count) in counts {
        if best.as_ref().is_none_or(|(_, c)| count > *c) {
            best = Some((value, count));
        }
    }
    Ok(best.map(|(value, _)| value))
}

fn fill(df: DataFrame, column: &str, value: Expr) -> Result<DataFrame, UtilsError> {
    Ok(df.lazy().with_column(col(column).fill_null(value).alias(column)).collect()?)
}

fn apply_one(df: &DataFrame, directive: &ImputationDirective) -> Result<DataFrame, UtilsError> {
    let name = directive.column.as_str();
    let column =
        df.column(name).map_err(|_| UtilsError::MissingColumn(directive.column.clone()))?;
    let dtype = column.dtype().clone();
    let numeric = is_numeric(&dtype);
    let df = normalize_missing(df, column)?;
    let column = df.column(name)?;

    let out = match &directive.strategy {
        ImputeStrategy::Mean | ImputeStrategy::Median => {
            if !numeric {
                return Err(UtilsError::not_numeric(column));
            }
            let observed = observed_numbers(column)?;
            let stat = if directive.strategy == ImputeStrategy::Mean {
                mean(&observed)
            } else {
                median(&observed)
            };
            match stat {
                Some(value) => fill(df, name, lit(value))?,
                None => {
                    warn!(column = name, strategy = %directive.strategy, "no observed values to impute from");
                    df
                }
            }
        }
        ImputeStrategy::Mode => {
            let mode = if numeric {
                numeric_mode(column)?.map(|v| lit(v).cast(dtype.clone()))
            } else {
                text_mode(column)?.map(|v| lit(v).cast(dtype.clone()))
            };
            match mode {
                Some(value) => fill(df, name, value)?,
                None => {
                    warn!(column = name, "no observed values to take the mode of");
                    df
                }
            }
        }
        ImputeStrategy::Constant(value) => match (value, numeric) {
            (FillValue::Number(x), true) => fill(df, name, lit(*x))?,
            (FillValue::Text(s), false) if matches!(dtype, DataType::String) => {
                fill(df, name, lit(s.as_str()))?
            }
            _ => {
                return Err(UtilsError::InvalidParameter(format!(
                    "constant {value} does not match dtype {dtype} of column {name}"
                )));
            }
        },
        ImputeStrategy::DropRows => df.lazy().filter(col(name).is_not_null()).collect()?,
    };

    Ok(out)
}

/// Apply imputation directives in order.
///
/// Each directive sees the result of the previous ones, so a `DropRows`
/// before a `Mean` changes the mean.
///
/// # Errors
/// Returns `UtilsError::MissingColumn` for unknown columns,
/// `UtilsError::NotNumeric` for mean/median on text, and
/// `UtilsError::InvalidParameter` for a constant of the wrong type.
pub fn apply_imputations(
    df: &DataFrame,
    directives: &[ImputationDirective],
) -> Result<DataFrame, UtilsError> {
    let mut out = df.clone();
    for directive in directives {
        let before = out.column(&directive.column).map(|c| c.null_count()).unwrap_or(0);
        out = apply_one(&out, directive)?;
        debug!(
            column = %directive.column,
            strategy = %directive.strategy,
            nulls_before = before,
            rows = out.height(),
            "applied imputation"
        );
    }
    Ok(out)
}
