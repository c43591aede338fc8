// src/model/matrix.rs

use crate::error::{MdpError, MdpResult};
use serde::ser::{Serialize, Serializer};
use std::ops::{Index, IndexMut};

/// Dense, row-major 2-D table.
///
/// Every matrix the solver produces is one of these: `P` and `R` are
/// `(s+1) x (s+1)`, `u` and `a` are `(T+1) x (s+1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

/// Real-valued table (transition probabilities, rewards, values).
pub type Matrix = Table<f64>;

/// Integer table holding ordering quantities.
pub type ActionTable = Table<usize>;

impl<T: Clone + Default> Table<T> {
    /// A `rows x cols` table filled with `T::default()`.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::default(); rows * cols],
        }
    }
}

impl<T: Clone> Table<T> {
    /// Builds a table from nested rows, rejecting ragged input.
    pub fn from_rows(what: &'static str, rows: Vec<Vec<T>>) -> MdpResult<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);

        let mut data = Vec::with_capacity(height * width);
        for row in rows {
            if row.len() != width {
                return Err(MdpError::DimensionMismatch {
                    what,
                    expected_rows: height,
                    expected_cols: width,
                    rows: height,
                    cols: row.len(),
                });
            }
            data.extend(row);
        }

        Ok(Self {
            rows: height,
            cols: width,
            data,
        })
    }

    /// Copies the table back out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.iter_rows().map(<[T]>::to_vec).collect()
    }
}

impl<T> Table<T> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Borrow one row.
    ///
    /// # Panics
    /// If `row` is out of bounds, like slice indexing.
    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        // chunks() rejects a zero chunk size
        self.data.chunks(self.cols.max(1)).take(self.rows)
    }

    /// Fails with `DimensionMismatch` unless the table is `rows x cols`.
    pub fn ensure_shape(&self, what: &'static str, rows: usize, cols: usize) -> MdpResult<()> {
        if self.rows == rows && self.cols == cols {
            Ok(())
        } else {
            Err(MdpError::DimensionMismatch {
                what,
                expected_rows: rows,
                expected_cols: cols,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    fn check_bounds(&self, row: usize, col: usize) {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for a {}x{} table",
            self.rows,
            self.cols
        );
    }
}

impl<T> Index<(usize, usize)> for Table<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        self.check_bounds(row, col);
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Table<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        self.check_bounds(row, col);
        &mut self.data[row * self.cols + col]
    }
}

// Serialized as nested rows so JSON output reads like the printed matrices.
impl<T: Serialize> Serialize for Table<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter_rows())
    }
}
