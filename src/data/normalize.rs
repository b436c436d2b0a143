use crate::math::matrix::Matrix;

/// Per-feature min-max normalization vectors.
///
/// Fitted once over the training matrix and persisted alongside the weights
/// so test data can be scaled exactly as the training data was.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalization {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

impl Normalization {
    /// Computes per-feature minima and maxima over a training matrix.
    pub fn fit(data: &Matrix) -> Normalization {
        assert!(data.rows() > 0, "fit: empty training matrix");

        let mut min = vec![f64::MAX; data.cols()];
        let mut max = vec![f64::MIN; data.cols()];

        for row in 0..data.rows() {
            for col in 0..data.cols() {
                let v = data.at(row, col);
                min[col] = min[col].min(v);
                max[col] = max[col].max(v);
            }
        }

        Normalization { min, max }
    }

    pub fn features(&self) -> usize {
        self.min.len()
    }

    /// In place, maps every value to `(v − min) / (max − min)`.
    ///
    /// A zero-range feature (`max == min`) maps to 0.0: a constant column
    /// contributes nothing instead of feeding `0/0` NaNs into training.
    pub fn apply(&self, data: &mut Matrix) {
        assert_eq!(
            data.cols(),
            self.features(),
            "apply: data has {} features, normalization has {}",
            data.cols(),
            self.features()
        );

        for row in 0..data.rows() {
            for col in 0..data.cols() {
                let range = self.max[col] - self.min[col];
                let v = data.at(row, col);

                *data.at_mut(row, col) = if range == 0.0 {
                    0.0
                } else {
                    (v - self.min[col]) / range
                };
            }
        }
    }

    /// In-place inverse of [`Normalization::apply`]: `v ↦ v·(max − min) + min`.
    pub fn invert(&self, data: &mut Matrix) {
        assert_eq!(
            data.cols(),
            self.features(),
            "invert: data has {} features, normalization has {}",
            data.cols(),
            self.features()
        );

        for row in 0..data.rows() {
            for col in 0..data.cols() {
                let v = data.at(row, col);
                *data.at_mut(row, col) = v * (self.max[col] - self.min[col]) + self.min[col];
            }
        }
    }
}
