// src/model/transition.rs

use crate::error::{MdpError, MdpResult};
use crate::model::demand::{DemandDistribution, PROBABILITY_TOLERANCE};
use crate::model::matrix::Matrix;
use serde::Serialize;

/// One-period stock transition law.
///
/// `P[before][after]` is the probability that a period starting with
/// `before` units on the shelf ends with `after` units. Rows sum to one and
/// stock never grows during a sales period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TransitionMatrix {
    matrix: Matrix,
}

impl TransitionMatrix {
    /// Builds `P` from the demand law: every demand outcome that would push
    /// stock below zero lands in the `after = 0` bucket.
    pub fn from_demand(demand: &DemandDistribution) -> Self {
        let size = demand.capacity() + 1;
        let mut matrix = Matrix::new(size, size);

        for before in 0..size {
            for (units, p) in demand.iter() {
                let after = before.saturating_sub(units);
                matrix[(before, after)] += p;
            }
        }

        Self { matrix }
    }

    /// Wraps a literal matrix, e.g. a hand-computed fixture.
    ///
    /// The matrix must be square, row-stochastic and never move mass to a
    /// higher stock level.
    pub fn from_matrix(matrix: Matrix) -> MdpResult<Self> {
        let size = matrix.rows();
        matrix.ensure_shape("transition matrix", size, size)?;
        if size == 0 {
            return Err(MdpError::DimensionMismatch {
                what: "transition matrix",
                expected_rows: 1,
                expected_cols: 1,
                rows: 0,
                cols: 0,
            });
        }

        for (before, row) in matrix.iter_rows().enumerate() {
            if let Some(after) = row
                .iter()
                .enumerate()
                .position(|(after, &p)| !p.is_finite() || p < 0.0 || (after > before && p != 0.0))
            {
                return Err(MdpError::InvalidTransition {
                    row: before,
                    reason: format!("entry {after} is {}", row[after]),
                });
            }

            let total: f64 = row.iter().sum();
            if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
                return Err(MdpError::InvalidTransition {
                    row: before,
                    reason: format!("row sums to {total}"),
                });
            }
        }

        Ok(Self { matrix })
    }

    pub fn capacity(&self) -> usize {
        self.matrix.rows() - 1
    }

    pub fn probability(&self, before: usize, after: usize) -> f64 {
        self.matrix[(before, after)]
    }

    pub fn row(&self, before: usize) -> &[f64] {
        self.matrix.row(before)
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Expected value of `values[after]` starting from `before` units.
    pub fn expectation(&self, before: usize, values: &[f64]) -> f64 {
        self.row(before)
            .iter()
            .zip(values)
            .map(|(p, v)| p * v)
            .sum()
    }
}
