// src/model/reward.rs

use crate::error::{MdpError, MdpResult};
use crate::model::demand::DemandDistribution;
use crate::model::matrix::Matrix;
use crate::strategy::traits::InventoryEconomics;
use serde::ser::{Serialize, Serializer};

/// One-period expected reward `R[before][inbound]`.
///
/// Only cells with `before + inbound <= s` are meaningful. The remaining
/// cells hold `0.0` and are reported as `None` by [`RewardMatrix::reward`].
#[derive(Debug, Clone, PartialEq)]
pub struct RewardMatrix {
    matrix: Matrix,
}

impl RewardMatrix {
    /// Expected sales revenue on the stock available after ordering, minus
    /// the ordering cost of `inbound`, minus the holding cost of that stock.
    pub fn from_model(demand: &DemandDistribution, economics: &dyn InventoryEconomics) -> Self {
        let capacity = demand.capacity();
        let size = capacity + 1;

        let expected_revenue: Vec<f64> = (0..size)
            .map(|stock| demand.expected_sales_value(stock, |units| economics.sales_revenue(units)))
            .collect();

        let mut matrix = Matrix::new(size, size);
        for before in 0..size {
            for inbound in 0..size - before {
                let stocked = before + inbound;
                matrix[(before, inbound)] = expected_revenue[stocked]
                    - economics.ordering_cost(inbound)
                    - economics.holding_cost(stocked);
            }
        }

        Self { matrix }
    }

    /// Wraps a literal square matrix. Infeasible cells are ignored.
    pub fn from_matrix(matrix: Matrix) -> MdpResult<Self> {
        let size = matrix.rows();
        matrix.ensure_shape("reward matrix", size, size)?;
        if size == 0 {
            return Err(MdpError::DimensionMismatch {
                what: "reward matrix",
                expected_rows: 1,
                expected_cols: 1,
                rows: 0,
                cols: 0,
            });
        }
        Ok(Self { matrix })
    }

    pub fn capacity(&self) -> usize {
        self.matrix.rows() - 1
    }

    pub fn is_feasible(&self, before: usize, inbound: usize) -> bool {
        before + inbound <= self.capacity()
    }

    /// `None` when ordering `inbound` on top of `before` would overflow.
    pub fn reward(&self, before: usize, inbound: usize) -> Option<f64> {
        self.is_feasible(before, inbound).then(|| self.matrix[(before, inbound)])
    }

    /// Like [`reward`](Self::reward) but treats an infeasible pair as a
    /// broken invariant.
    pub fn feasible_reward(&self, before: usize, inbound: usize) -> MdpResult<f64> {
        self.reward(before, inbound).ok_or(MdpError::InfeasibleAction {
            before,
            inbound,
            capacity: self.capacity(),
        })
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Rows with infeasible cells as `None`.
    pub fn feasible_rows(&self) -> Vec<Vec<Option<f64>>> {
        let size = self.capacity() + 1;
        (0..size)
            .map(|before| (0..size).map(|inbound| self.reward(before, inbound)).collect())
            .collect()
    }
}

// Infeasible cells come out as `null`.
impl Serialize for RewardMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.feasible_rows().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::implementations::{FnEconomics, LinearEconomics};

    fn classic_economics() -> LinearEconomics {
        LinearEconomics {
            unit_order_cost: 2.0,
            fixed_order_cost: 0.0,
            unit_holding_cost: 1.0,
            unit_price: 8.0,
            terminal_value: 0.0,
        }
    }

    #[test]
    fn classic_example_matches_hand_computation() {
        let demand = DemandDistribution::new(vec![0.25, 0.5, 0.25, 0.0], 3).unwrap();
        let r = RewardMatrix::from_model(&demand, &classic_economics());
        let expected = [
            vec![0.0, 3.0, 2.0, -1.0],
            vec![5.0, 4.0, 1.0],
            vec![6.0, 3.0],
            vec![5.0],
        ];
        for (before, row) in expected.iter().enumerate() {
            for (inbound, want) in row.iter().enumerate() {
                let got = r.reward(before, inbound).unwrap();
                assert!((got - want).abs() < 1e-12, "R[{before}][{inbound}] = {got}");
            }
        }
    }

    #[test]
    fn infeasible_cells_are_absent() {
        let demand = DemandDistribution::new(vec![0.25, 0.5, 0.25, 0.0], 3).unwrap();
        let r = RewardMatrix::from_model(&demand, &classic_economics());
        assert_eq!(r.reward(1, 3), None);
        assert_eq!(r.reward(3, 1), None);
        assert_eq!(r.matrix()[(3, 1)], 0.0);
        assert!(matches!(
            r.feasible_reward(2, 2),
            Err(MdpError::InfeasibleAction { before: 2, inbound: 2, capacity: 3 })
        ));
    }

    #[test]
    fn zero_capacity_uses_all_three_functions() {
        let demand = DemandDistribution::new(vec![1.0], 0).unwrap();
        let economics = FnEconomics::new(
            |inbound| 2.0 * inbound as f64 + 0.5,
            |stock| stock as f64 + 1.0,
            |units| 8.0 * units as f64 + 3.0,
            |_| 0.0,
        );
        let r = RewardMatrix::from_model(&demand, &economics);
        // F(0) - o(0) - h(0) = 3 - 0.5 - 1
        assert_eq!(r.reward(0, 0), Some(1.5));
    }

    #[test]
    fn non_square_literal_is_rejected() {
        let m = Matrix::from_rows("R", vec![vec![0.0, 1.0]]).unwrap();
        assert!(RewardMatrix::from_matrix(m).is_err());
    }
}
