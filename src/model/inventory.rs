// src/model/inventory.rs

use crate::error::{MdpError, MdpResult};
use crate::model::demand::DemandDistribution;
use crate::model::matrix::Matrix;
use crate::model::reward::RewardMatrix;
use crate::model::transition::TransitionMatrix;
use crate::strategy::implementations::NoopObserver;
use crate::strategy::optimization::{backward_induction, MaximizationRule, PolicySolution};
use crate::strategy::traits::{InventoryEconomics, SolveObserver};
use serde::Serialize;
use tracing::{debug, info};

/// Largest capacity accepted; `P` and `R` alone take `2 * (s+1)^2` floats.
pub const MAX_CAPACITY: usize = 10_000;

/// Checks a capacity supplied by a caller.
pub fn validate_capacity(capacity: i64) -> MdpResult<usize> {
    if capacity < 0 {
        return Err(MdpError::InvalidCapacity {
            capacity,
            reason: "capacity cannot be negative".to_string(),
        });
    }
    match usize::try_from(capacity) {
        Ok(c) if c <= MAX_CAPACITY => Ok(c),
        _ => Err(MdpError::InvalidCapacity {
            capacity,
            reason: format!("capacity exceeds the supported maximum of {MAX_CAPACITY}"),
        }),
    }
}

/// Everything a solve produces: `P`, `R`, `u` and `a`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub transition: TransitionMatrix,
    pub reward: RewardMatrix,
    #[serde(flatten)]
    pub policy: PolicySolution,
}

impl Solution {
    pub fn capacity(&self) -> usize {
        self.policy.capacity
    }

    pub fn horizon(&self) -> usize {
        self.policy.horizon
    }
}

/// A single-product inventory problem ready to be solved.
#[derive(Debug)]
pub struct InventoryModel {
    demand: DemandDistribution,
    economics: Box<dyn InventoryEconomics>,
    horizon: usize,
    rule: MaximizationRule,
}

impl InventoryModel {
    /// The capacity is taken from the demand distribution (`s = len - 1`).
    pub fn new(
        demand: DemandDistribution,
        economics: impl InventoryEconomics + 'static,
        horizon: usize,
    ) -> MdpResult<Self> {
        Self::from_boxed(demand, Box::new(economics), horizon)
    }

    pub fn from_boxed(
        demand: DemandDistribution,
        economics: Box<dyn InventoryEconomics>,
        horizon: usize,
    ) -> MdpResult<Self> {
        if horizon == 0 {
            return Err(MdpError::InvalidHorizon { horizon: 0 });
        }
        if demand.capacity() > MAX_CAPACITY {
            return Err(MdpError::InvalidCapacity {
                capacity: demand.capacity() as i64,
                reason: format!("capacity exceeds the supported maximum of {MAX_CAPACITY}"),
            });
        }

        Ok(Self {
            demand,
            economics,
            horizon,
            rule: MaximizationRule::default(),
        })
    }

    pub fn with_rule(mut self, rule: MaximizationRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn capacity(&self) -> usize {
        self.demand.capacity()
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn rule(&self) -> MaximizationRule {
        self.rule
    }

    pub fn demand(&self) -> &DemandDistribution {
        &self.demand
    }

    pub fn economics(&self) -> &dyn InventoryEconomics {
        self.economics.as_ref()
    }

    pub fn transition_matrix(&self) -> TransitionMatrix {
        TransitionMatrix::from_demand(&self.demand)
    }

    pub fn reward_matrix(&self) -> RewardMatrix {
        RewardMatrix::from_model(&self.demand, self.economics.as_ref())
    }

    pub fn solve(&self) -> MdpResult<Solution> {
        self.solve_with(&mut NoopObserver)
    }

    /// Builds `P` and `R`, then runs backward induction, reporting progress
    /// to `observer`.
    pub fn solve_with(&self, observer: &mut dyn SolveObserver) -> MdpResult<Solution> {
        info!(
            capacity = self.capacity(),
            horizon = self.horizon,
            rule = ?self.rule,
            "solving inventory model"
        );

        let transition = self.transition_matrix();
        observer.on_transition_built(&transition);

        let reward = self.reward_matrix();
        observer.on_reward_built(&reward);

        let economics = self.economics.as_ref();
        let solution = solve_matrices(
            transition,
            reward,
            self.horizon,
            |t| economics.terminal_value(t),
            self.rule,
            observer,
        )?;

        info!(initial_values = ?solution.policy.values.row(0), "solved inventory model");
        Ok(solution)
    }
}

/// Runs the solver on caller-supplied `P` and `R`, bypassing the builders.
pub fn solve_matrices(
    transition: TransitionMatrix,
    reward: RewardMatrix,
    horizon: usize,
    terminal: impl Fn(usize) -> f64,
    rule: MaximizationRule,
    observer: &mut dyn SolveObserver,
) -> MdpResult<Solution> {
    let policy = backward_induction(&transition, &reward, horizon, terminal, rule, observer)?;
    debug!(horizon, capacity = policy.capacity, "backward induction complete");
    Ok(Solution {
        transition,
        reward,
        policy,
    })
}

/// Hand-checked literal `P` and `R` for a capacity-3 store.
///
/// With `g = 0` and a horizon of 3 the optimal first-period values are
/// `[67/16, 129/16, 97/8, 227/16]`.
pub fn reference_matrices() -> MdpResult<(TransitionMatrix, RewardMatrix)> {
    let transition = TransitionMatrix::from_matrix(Matrix::from_rows(
        "transition matrix",
        vec![
            vec![1.0, 0.0, 0.0, 0.0],
            vec![0.75, 0.25, 0.0, 0.0],
            vec![0.25, 0.5, 0.25, 0.0],
            vec![0.0, 0.25, 0.5, 0.25],
        ],
    )?)?;
    let reward = RewardMatrix::from_matrix(Matrix::from_rows(
        "reward matrix",
        vec![
            vec![0.0, -1.0, -2.0, -5.0],
            vec![5.0, 0.0, -3.0, 0.0],
            vec![6.0, -1.0, 0.0, 0.0],
            vec![5.0, 0.0, 0.0, 0.0],
        ],
    )?)?;
    Ok((transition, reward))
}
