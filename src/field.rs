use ndarray::Array2;

use crate::{
    error::{ReliefError, Result},
    height::HeightPolicy,
    types::Value,
};

/// A grid of normalized grayscale samples, indexed `[row][col]`.
///
/// Values are expected in `[0, 1]` (0 = black, 1 = white); normalisation is
/// the image decoder's job, not this crate's.
pub type GraySamples = Array2<Value>;

/// A per-pixel emboss height grid, produced by applying a
/// [`HeightPolicy`](crate::height::HeightPolicy) to every sample of a
/// [`GraySamples`] grid.
///
/// Indexed `[row][col]`, same orientation as the source samples.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    values: Array2<Value>,
}

impl HeightField {
    /// Builds a height field by evaluating `policy` at every sample.
    ///
    /// Each sample is mapped independently, so the result does not depend on
    /// traversal order.
    ///
    /// Returns [`ReliefError::EmptySamples`] if either grid dimension is zero.
    pub fn from_samples(samples: &GraySamples, policy: &impl HeightPolicy) -> Result<Self> {
        if samples.is_empty() {
            return Err(ReliefError::EmptySamples);
        }
        Ok(Self {
            values: samples.mapv(|gray| policy.height(gray)),
        })
    }

    /// Number of sample rows.
    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of sample columns.
    pub fn cols(&self) -> usize {
        self.values.ncols()
    }

    /// Returns the height at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Value {
        self.values[[row, col]]
    }

    /// Returns the `(min, max)` height extent over the whole field.
    pub fn extent(&self) -> (Value, Value) {
        self.values
            .iter()
            .fold((Value::INFINITY, Value::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Borrows the underlying grid.
    pub fn values(&self) -> &Array2<Value> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::height::EmbossProfile;
    use ndarray::array;

    #[test]
    fn field_follows_policy_per_sample() {
        let samples: GraySamples = array![[0.0, 0.5], [1.0, 0.25]];
        let field = HeightField::from_samples(&samples, &EmbossProfile::default()).unwrap();

        assert_eq!(field.rows(), 2);
        assert_eq!(field.cols(), 2);
        assert_eq!(field.get(0, 0), 3.0);
        assert_eq!(field.get(0, 1), 1.5);
        assert_eq!(field.get(1, 0), 0.0);
        assert_eq!(field.get(1, 1), 2.25);
    }

    #[test]
    fn extent_spans_min_and_max() {
        let samples: GraySamples = array![[0.0, 1.0, 0.5]];
        let field = HeightField::from_samples(&samples, &EmbossProfile::default()).unwrap();
        assert_eq!(field.extent(), (0.0, 3.0));
    }

    #[test]
    fn empty_grid_is_rejected() {
        let samples = GraySamples::zeros((0, 4));
        assert!(HeightField::from_samples(&samples, &EmbossProfile::default()).is_err());
    }
}
