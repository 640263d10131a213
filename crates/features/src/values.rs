//! Column value extraction shared by the transforms.

use churnkit_primitives::ColumnKind;
use churnkit_traits::TransformError;
use polars::prelude::*;

/// Route a column by its dtype: text is categorical, calendar dtypes are
/// dates, everything else numeric.
#[must_use]
pub fn classify_dtype(dtype: &DataType) -> ColumnKind {
    match dtype {
        DataType::String => ColumnKind::Categorical,
        DataType::Date | DataType::Datetime(_, _) => ColumnKind::Date,
        _ => ColumnKind::Numeric,
    }
}

const fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Boolean
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::Float32
            | DataType::Float64
            | DataType::Null
    )
}

/// Read a column as optional floats; NaN and blank strings are missing.
pub(crate) fn numeric_values(column: &Column) -> Result<Vec<Option<f64>>, TransformError> {
    let name = column.name().to_string();

    match column.dtype() {
        DataType::String => column
            .str()?
            .into_iter()
            .map(|value| match value.map(str::trim) {
                None | Some("") => Ok(None),
                Some(text) => text.parse::<f64>().map(|x| (!x.is_nan()).then_some(x)).map_err(
                    |_| TransformError::TypeMismatch {
                        column: name.clone(),
                        detail: format!("value {text:?} is not numeric"),
                    },
                ),
            })
            .collect(),
        dtype if is_numeric_dtype(dtype) => {
            let casted = column.cast(&DataType::Float64)?;
            Ok(casted.f64()?.into_iter().map(|v| v.filter(|x| !x.is_nan())).collect())
        }
        dtype => Err(TransformError::TypeMismatch {
            column: name,
            detail: format!("dtype {dtype} is not numeric"),
        }),
    }
}

/// Read a column as optional strings, casting non-text dtypes.
pub(crate) fn string_values(column: &Column) -> Result<Vec<Option<String>>, TransformError> {
    let casted = if matches!(column.dtype(), DataType::String) {
        column.clone()
    } else {
        column.cast(&DataType::String)?
    };

    Ok(casted.str()?.into_iter().map(|v| v.map(str::to_string)).collect())
}
