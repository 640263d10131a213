//! Order statistics over observed values.

use crate::MathError;

/// Sort the finite values of `data`, dropping NaN and infinities.
#[must_use]
pub fn sorted_finite(data: &[f64]) -> Vec<f64> {
    let mut values: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values
}

/// Quantile of already sorted values using linear interpolation.
///
/// The rank of quantile `q` is `q * (n - 1)`; values between two ranks are
/// interpolated linearly.
///
/// # Errors
/// Returns `MathError::InvalidQuantile` if `q` is not in [0, 1], and
/// `MathError::EmptyData` if `sorted` is empty.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Result<f64, MathError> {
    if !(0.0..=1.0).contains(&q) {
        return Err(MathError::InvalidQuantile(q));
    }
    if sorted.is_empty() {
        return Err(MathError::EmptyData);
    }

    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let frac = rank - lower as f64;

    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Quantile of the finite values in `data`.
///
/// # Errors
/// Returns `MathError::EmptyData` if there are no finite values.
pub fn quantile(data: &[f64], q: f64) -> Result<f64, MathError> {
    quantile_sorted(&sorted_finite(data), q)
}

/// Median of the finite values in `data`, or `None` if there are none.
#[must_use]
pub fn median(data: &[f64]) -> Option<f64> {
    quantile(data, 0.5).ok()
}

/// Mean of the finite values in `data`, or `None` if there are none.
#[must_use]
pub fn mean(data: &[f64]) -> Option<f64> {
    let (sum, n) = data
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize), |(sum, n), x| (sum + x, n + 1));
    (n > 0).then(|| sum / n as f64)
}
