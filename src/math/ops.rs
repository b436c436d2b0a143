//! Matrix operations used by the forward and backward passes.
//!
//! Shape mismatches on this path are programmer error and panic with the
//! offending dimensions in the message; the fallible public surfaces
//! (model loading, setup) validate shapes and return `Result` instead.

use std::f64::consts::E;

use crate::math::matrix::Matrix;

impl Matrix {
    /// Returns a new matrix with rows and columns swapped.
    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[j * res.cols + i] = self.data[i * self.cols + j];
            }
        }

        res
    }

    /// Classic matrix product; panics when `self.cols != rhs.rows`.
    pub fn multiply(&self, rhs: &Matrix) -> Matrix {
        let mut res = Matrix::zeros(self.rows, rhs.cols);
        res.multiply_into(self, rhs);
        res
    }

    /// Writes `a · b` into a pre-sized destination, avoiding a reallocation
    /// on the backward-pass hot path.
    pub fn multiply_into(&mut self, a: &Matrix, b: &Matrix) {
        assert_eq!(
            a.cols, b.rows,
            "multiply: inner dimensions differ ({}x{} · {}x{})",
            a.rows, a.cols, b.rows, b.cols
        );
        assert!(
            self.rows == a.rows && self.cols == b.cols,
            "multiply: destination is {}x{}, product is {}x{}",
            self.rows, self.cols, a.rows, b.cols
        );

        for i in 0..a.rows {
            for j in 0..b.cols {
                let mut sum = 0.0;

                for k in 0..a.cols {
                    sum += a.data[i * a.cols + k] * b.data[k * b.cols + j];
                }

                self.data[i * self.cols + j] = sum;
            }
        }
    }

    /// Returns a new matrix with `self`'s columns followed by `right`'s;
    /// prepends the constant-1 bias column ahead of every layer's input.
    pub fn column_bind(&self, right: &Matrix) -> Matrix {
        assert_eq!(
            self.rows, right.rows,
            "column_bind: row counts differ ({} vs {})",
            self.rows, right.rows
        );

        let mut res = Matrix::zeros(self.rows, self.cols + right.cols);

        for i in 0..self.rows {
            let out = &mut res.data[i * res.cols..(i + 1) * res.cols];
            out[..self.cols].copy_from_slice(self.row(i));
            out[self.cols..].copy_from_slice(right.row(i));
        }

        res
    }

    /// Elementwise logistic function.
    pub fn sigmoid(&self) -> Matrix {
        self.map(|x| 1.0 / (1.0 + E.powf(-x)))
    }

    /// Elementwise `σ(z) · (1 − σ(z))` — the activation-gradient factor.
    pub fn sigmoid_derivative(&self) -> Matrix {
        self.map(|x| {
            let s = 1.0 / (1.0 + E.powf(-x));
            s * (1.0 - s)
        })
    }

    /// Elementwise `self − rhs`; the output error term `y − y_true`.
    pub fn difference(&self, rhs: &Matrix) -> Matrix {
        assert!(
            self.rows == rhs.rows && self.cols == rhs.cols,
            "difference: shapes differ ({}x{} vs {}x{})",
            self.rows, self.cols, rhs.rows, rhs.cols
        );

        let mut res = self.clone();
        for (a, b) in res.data.iter_mut().zip(rhs.data.iter()) {
            *a -= b;
        }
        res
    }

    /// Elementwise product in place; masks a backpropagated error with the
    /// activation gradient.
    pub fn hadamard_assign(&mut self, rhs: &Matrix) {
        assert!(
            self.rows == rhs.rows && self.cols == rhs.cols,
            "hadamard: shapes differ ({}x{} vs {}x{})",
            self.rows, self.cols, rhs.rows, rhs.cols
        );

        for (a, b) in self.data.iter_mut().zip(rhs.data.iter()) {
            *a *= b;
        }
    }

    /// `self += scale · rhs`; the gradient-descent update uses `scale = -alpha`.
    pub fn add_scaled(&mut self, rhs: &Matrix, scale: f64) {
        assert!(
            self.rows == rhs.rows && self.cols == rhs.cols,
            "add_scaled: shapes differ ({}x{} vs {}x{})",
            self.rows, self.cols, rhs.rows, rhs.cols
        );

        for (a, b) in self.data.iter_mut().zip(rhs.data.iter()) {
            *a += scale * b;
        }
    }

    /// Fills `self` with the same-sized rectangle of `src` starting at
    /// `(row_offset, col_offset)`; strips the bias column off a weight
    /// matrix before it is used as a backward error projection.
    pub fn copy_region_from(&mut self, src: &Matrix, row_offset: usize, col_offset: usize) {
        assert!(
            row_offset + self.rows <= src.rows && col_offset + self.cols <= src.cols,
            "copy_region: {}x{} at offset ({}, {}) exceeds source {}x{}",
            self.rows, self.cols, row_offset, col_offset, src.rows, src.cols
        );

        for i in 0..self.rows {
            let src_start = (row_offset + i) * src.cols + col_offset;
            self.data[i * self.cols..(i + 1) * self.cols]
                .copy_from_slice(&src.data[src_start..src_start + self.cols]);
        }
    }
}
