use rand::prelude::*;

/// A dense, heap-owned matrix of `f64` values.
///
/// Storage is a single row-major buffer: element `(row, col)` lives at
/// `row * cols + col`, and `data.len() == rows * cols` holds at all times.
/// Every operation either returns a newly owned `Matrix` or mutates an
/// existing one through `&mut`; intermediates drop when their owner does.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Uniform random values in `[-1, 1)` — the weight initialization range.
    pub fn random(rows: usize, cols: usize) -> Matrix {
        let mut rng = rand::thread_rng();
        let mut res = Matrix::zeros(rows, cols);

        for value in res.data.iter_mut() {
            *value = rng.gen::<f64>() * 2.0 - 1.0;
        }

        res
    }

    /// The n×n identity matrix; its rows double as one-hot label encodings.
    pub fn identity(n: usize) -> Matrix {
        let mut res = Matrix::zeros(n, n);

        for i in 0..n {
            res.data[i * n + i] = 1.0;
        }

        res
    }

    /// Builds a matrix from nested rows. Panics if the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Matrix {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |row| row.len());

        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in &rows {
            assert_eq!(
                row.len(),
                n_cols,
                "from_rows: ragged input ({} columns, expected {})",
                row.len(),
                n_cols
            );
            data.extend_from_slice(row);
        }

        Matrix {
            rows: n_rows,
            cols: n_cols,
            data,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn at_mut(&mut self, row: usize, col: usize) -> &mut f64 {
        debug_assert!(row < self.rows && col < self.cols);
        &mut self.data[row * self.cols + col]
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.cols).map(|row| row.to_vec()).collect()
    }

    /// Reallocates to the new dimensions and zeroes the contents.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
        self.data = vec![0.0; rows * cols];
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}
