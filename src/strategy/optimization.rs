// src/strategy/optimization.rs

//! Backward induction for the finite-horizon inventory problem.
//!
//! Starting from the terminal condition `u[T][x] = g(T)`, each earlier period
//! is solved from the one after it:
//!
//! ```text
//! u[t][x] = max over a in 0..=s-x of  R[x][a] + sum_y P[x+a][y] * u[t+1][y]
//! ```
//!
//! Period `t` only reads period `t+1`, so a single backward sweep suffices.

use crate::error::{MdpError, MdpResult};
use crate::model::matrix::{ActionTable, Matrix};
use crate::model::reward::RewardMatrix;
use crate::model::transition::TransitionMatrix;
use crate::strategy::traits::{ActionEvaluation, Decision, SolveObserver};
use serde::{Deserialize, Serialize};

/// How the best action for a `(time, stock)` cell is picked.
///
/// Both rules scan actions from `0` upwards and replace the incumbent only on
/// a strictly greater cumulative reward, so ties go to the smallest order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaximizationRule {
    /// The incumbent starts at "order nothing, earn nothing" (action `0`,
    /// value `0`). When every feasible action has a non-positive cumulative
    /// reward the cell reports `(0, 0.0)`, even if some action loses less.
    #[default]
    FloorAtZero,
    /// Plain maximisation: the best feasible action is always reported,
    /// negative or not.
    Unconstrained,
}

impl MaximizationRule {
    fn initial_incumbent(self) -> f64 {
        match self {
            MaximizationRule::FloorAtZero => 0.0,
            MaximizationRule::Unconstrained => f64::NEG_INFINITY,
        }
    }
}

/// Checks a horizon supplied by a caller.
pub fn validate_horizon(horizon: i64) -> MdpResult<usize> {
    if horizon <= 0 {
        return Err(MdpError::InvalidHorizon { horizon });
    }
    usize::try_from(horizon).map_err(|_| MdpError::InvalidHorizon { horizon })
}

/// Optimal value function `u` and policy `a`, both `(T+1) x (s+1)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicySolution {
    pub horizon: usize,
    pub capacity: usize,
    pub rule: MaximizationRule,
    /// `u[t][stock]`: best expected cumulative reward from `t` to the horizon.
    pub values: Matrix,
    /// `a[t][stock]`: the order quantity attaining `u[t][stock]`.
    /// The terminal row holds zeros; no decision is taken there.
    pub actions: ActionTable,
}

impl PolicySolution {
    pub fn value(&self, time: usize, stock: usize) -> Option<f64> {
        self.values.get(time, stock).copied()
    }

    /// `None` at the terminal period and outside the table.
    pub fn action(&self, time: usize, stock: usize) -> Option<usize> {
        if time >= self.horizon {
            return None;
        }
        self.actions.get(time, stock).copied()
    }
}

/// Solves the recursion over `horizon` periods.
///
/// `terminal` is `g`, evaluated once at `t = T` and applied to every stock
/// level. The observer sees every action evaluation and every decision.
pub fn backward_induction(
    transition: &TransitionMatrix,
    reward: &RewardMatrix,
    horizon: usize,
    terminal: impl Fn(usize) -> f64,
    rule: MaximizationRule,
    observer: &mut dyn SolveObserver,
) -> MdpResult<PolicySolution> {
    if horizon == 0 {
        return Err(MdpError::InvalidHorizon { horizon: 0 });
    }
    let capacity = transition.capacity();
    reward
        .matrix()
        .ensure_shape("reward matrix", capacity + 1, capacity + 1)?;

    let size = capacity + 1;
    let mut values = Matrix::new(horizon + 1, size);
    let mut actions = ActionTable::new(horizon + 1, size);

    let terminal_value = terminal(horizon);
    for stock in 0..size {
        values[(horizon, stock)] = terminal_value;
    }

    for time in (0..horizon).rev() {
        observer.on_period_started(time);
        let continuation = values.row(time + 1).to_vec();

        for stock in 0..size {
            let mut best_action = 0;
            let mut best_value = rule.initial_incumbent();

            for inbound in 0..size - stock {
                let cumulative_reward = reward.feasible_reward(stock, inbound)?
                    + transition.expectation(stock + inbound, &continuation);

                observer.on_action_evaluated(&ActionEvaluation {
                    time,
                    stock,
                    inbound,
                    cumulative_reward,
                });

                if cumulative_reward > best_value {
                    best_value = cumulative_reward;
                    best_action = inbound;
                }
            }

            values[(time, stock)] = best_value;
            actions[(time, stock)] = best_action;
            observer.on_decision(&Decision {
                time,
                stock,
                action: best_action,
                value: best_value,
            });
        }
    }

    observer.on_solved(&values);

    Ok(PolicySolution {
        horizon,
        capacity,
        rule,
        values,
        actions,
    })
}

/// Expected cumulative reward of following `actions`, without maximising.
///
/// Same recursion as [`backward_induction`] with the action fixed to
/// `a[t][x]`. Under `FloorAtZero` a cell whose every action loses money
/// keeps `u = 0` while the policy still orders `0` and pays for it, so this
/// is the value a simulation of the policy converges to.
pub fn evaluate_policy(
    transition: &TransitionMatrix,
    reward: &RewardMatrix,
    actions: &ActionTable,
    horizon: usize,
    terminal: impl Fn(usize) -> f64,
) -> MdpResult<Matrix> {
    let size = transition.capacity() + 1;
    actions.ensure_shape("policy", horizon + 1, size)?;
    reward.matrix().ensure_shape("reward matrix", size, size)?;

    let mut values = Matrix::new(horizon + 1, size);
    let terminal_value = terminal(horizon);
    for stock in 0..size {
        values[(horizon, stock)] = terminal_value;
    }

    for time in (0..horizon).rev() {
        let continuation = values.row(time + 1).to_vec();
        for stock in 0..size {
            let inbound = actions[(time, stock)];
            values[(time, stock)] = reward.feasible_reward(stock, inbound)?
                + transition.expectation(stock + inbound, &continuation);
        }
    }

    Ok(values)
}
