//! Named feature matrix.

use ndarray::{Array2, ArrayView1, Axis, ShapeError, concatenate};

/// Dense numeric feature matrix with one name per column.
///
/// Unlike a DataFrame, a matrix with zero columns still carries its row
/// count, so an empty branch of a preparation pipeline keeps the shape of
/// its input.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    /// Column names (n_cols,).
    names: Vec<String>,
    /// Values (n_rows x n_cols).
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Create a new feature matrix.
    ///
    /// # Errors
    /// Returns `ShapeError` if the number of names differs from the number of columns.
    pub fn new(names: Vec<String>, values: Array2<f64>) -> Result<Self, ShapeError> {
        if names.len() != values.ncols() {
            return Err(ShapeError::from_kind(ndarray::ErrorKind::IncompatibleShape));
        }
        Ok(Self { names, values })
    }

    /// Zero-width matrix with `n_rows` rows.
    #[must_use]
    pub fn empty(n_rows: usize) -> Self {
        Self { names: Vec::new(), values: Array2::zeros((n_rows, 0)) }
    }

    /// Number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    /// Column names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Underlying values.
    #[must_use]
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Position of a column by name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// View of a single column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_index(name).map(|i| self.values.column(i))
    }

    /// Concatenate `other` to the right of `self`.
    ///
    /// # Errors
    /// Returns `ShapeError` if the row counts differ.
    pub fn hstack(&self, other: &Self) -> Result<Self, ShapeError> {
        let values = concatenate(Axis(1), &[self.values.view(), other.values.view()])?;
        let mut names = self.names.clone();
        names.extend(other.names.iter().cloned());
        Ok(Self { names, values })
    }

    /// Select columns by name, in the given order.
    ///
    /// Names that are not present are skipped.
    #[must_use]
    pub fn select_present(&self, names: &[String]) -> Self {
        let (kept, indices): (Vec<String>, Vec<usize>) = names
            .iter()
            .filter_map(|n| self.column_index(n).map(|i| (n.clone(), i)))
            .unzip();
        Self { names: kept, values: self.values.select(Axis(1), &indices) }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn empty_keeps_rows() {
        let m = FeatureMatrix::empty(4);
        assert_eq!(m.n_rows(), 4);
        assert_eq!(m.n_cols(), 0);
        assert!(m.names().is_empty());
    }

    #[test]
    fn new_rejects_name_count_mismatch() {
        let values = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(FeatureMatrix::new(vec!["a".to_string()], values).is_err());
    }

    #[test]
    fn hstack_with_empty() {
        let left = FeatureMatrix::new(vec!["a".to_string()], array![[1.0], [2.0]]).unwrap();
        let joined = left.hstack(&FeatureMatrix::empty(2)).unwrap();
        assert_eq!(joined.names(), &["a".to_string()]);
        assert_eq!(joined.n_rows(), 2);

        assert!(left.hstack(&FeatureMatrix::empty(3)).is_err());
    }

    #[test]
    fn select_present_reorders_and_skips() {
        let m = FeatureMatrix::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
        )
        .unwrap();

        let picked = m.select_present(&["c".to_string(), "zz".to_string(), "a".to_string()]);
        assert_eq!(picked.names(), &["c".to_string(), "a".to_string()]);
        assert_eq!(picked.values(), &array![[3.0, 1.0], [6.0, 4.0]]);
    }

    #[test]
    fn column_lookup() {
        let m = FeatureMatrix::new(vec!["x".to_string()], array![[7.0], [8.0]]).unwrap();
        assert_eq!(m.column("x").unwrap().to_vec(), vec![7.0, 8.0]);
        assert!(m.column("y").is_none());
    }
}
