// src/strategy/implementations.rs

use crate::model::matrix::Matrix;
use crate::model::reward::RewardMatrix;
use crate::model::transition::TransitionMatrix;
use crate::strategy::traits::{ActionEvaluation, Decision, InventoryEconomics, SolveObserver};
use serde::{Deserialize, Serialize};
use std::fmt;

// =========================================================================
// 1. Linear Economics
// =========================================================================

/// Per-unit prices and costs, optionally with a fixed charge per order.
///
/// The classic textbook example is `o(u) = 2u`, `h(u) = u`, `f(u) = 8u`,
/// `g(t) = 0`, which is also the `Default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinearEconomics {
    pub unit_order_cost: f64,
    /// Charged once whenever a positive quantity is ordered.
    pub fixed_order_cost: f64,
    pub unit_holding_cost: f64,
    pub unit_price: f64,
    pub terminal_value: f64,
}

impl Default for LinearEconomics {
    fn default() -> Self {
        Self {
            unit_order_cost: 2.0,
            fixed_order_cost: 0.0,
            unit_holding_cost: 1.0,
            unit_price: 8.0,
            terminal_value: 0.0,
        }
    }
}

impl InventoryEconomics for LinearEconomics {
    fn ordering_cost(&self, inbound: usize) -> f64 {
        if inbound == 0 {
            0.0
        } else {
            self.fixed_order_cost + self.unit_order_cost * inbound as f64
        }
    }

    fn holding_cost(&self, stock: usize) -> f64 {
        self.unit_holding_cost * stock as f64
    }

    fn sales_revenue(&self, units: usize) -> f64 {
        self.unit_price * units as f64
    }

    fn terminal_value(&self, _time: usize) -> f64 {
        self.terminal_value
    }
}

// =========================================================================
// 2. Closure Economics
// =========================================================================

type ScalarFn = Box<dyn Fn(usize) -> f64 + Send + Sync>;

/// Economics given as four plain functions `o`, `h`, `f`, `g`.
pub struct FnEconomics {
    ordering: ScalarFn,
    holding: ScalarFn,
    revenue: ScalarFn,
    terminal: ScalarFn,
}

impl FnEconomics {
    pub fn new(
        ordering: impl Fn(usize) -> f64 + Send + Sync + 'static,
        holding: impl Fn(usize) -> f64 + Send + Sync + 'static,
        revenue: impl Fn(usize) -> f64 + Send + Sync + 'static,
        terminal: impl Fn(usize) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            ordering: Box::new(ordering),
            holding: Box::new(holding),
            revenue: Box::new(revenue),
            terminal: Box::new(terminal),
        }
    }
}

// Closures have no useful Debug output.
impl fmt::Debug for FnEconomics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnEconomics").finish_non_exhaustive()
    }
}

impl InventoryEconomics for FnEconomics {
    fn ordering_cost(&self, inbound: usize) -> f64 {
        (self.ordering)(inbound)
    }

    fn holding_cost(&self, stock: usize) -> f64 {
        (self.holding)(stock)
    }

    fn sales_revenue(&self, units: usize) -> f64 {
        (self.revenue)(units)
    }

    fn terminal_value(&self, time: usize) -> f64 {
        (self.terminal)(time)
    }
}

// =========================================================================
// 3. Observers
// =========================================================================

/// Observer that ignores everything. Used when no diagnostics are wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SolveObserver for NoopObserver {}

/// Forwards every solver event to `tracing`.
///
/// Matrices and decisions go out at `debug`, individual action evaluations
/// at `trace` since there are `O(T * s^2)` of them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SolveObserver for TracingObserver {
    fn on_transition_built(&mut self, transition: &TransitionMatrix) {
        tracing::debug!(matrix = ?transition.matrix().to_rows(), "transition probabilities P[before][after]");
    }

    fn on_reward_built(&mut self, reward: &RewardMatrix) {
        tracing::debug!(matrix = ?reward.matrix().to_rows(), "reward matrix R[stock][action]");
    }

    fn on_period_started(&mut self, time: usize) {
        tracing::debug!(time, "solving period");
    }

    fn on_action_evaluated(&mut self, e: &ActionEvaluation) {
        tracing::trace!(
            time = e.time,
            stock = e.stock,
            inbound = e.inbound,
            cumulative_reward = e.cumulative_reward,
            "evaluated action"
        );
    }

    fn on_decision(&mut self, d: &Decision) {
        tracing::debug!(time = d.time, stock = d.stock, action = d.action, value = d.value, "chose action");
    }

    fn on_solved(&mut self, values: &Matrix) {
        tracing::debug!(periods = values.rows(), "backward induction finished");
    }
}

/// Keeps every event in memory, in call order.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub transition_built: bool,
    pub reward_built: bool,
    pub periods: Vec<usize>,
    pub evaluations: Vec<ActionEvaluation>,
    pub decisions: Vec<Decision>,
    pub solved: bool,
}

impl SolveObserver for RecordingObserver {
    fn on_transition_built(&mut self, _transition: &TransitionMatrix) {
        self.transition_built = true;
    }

    fn on_reward_built(&mut self, _reward: &RewardMatrix) {
        self.reward_built = true;
    }

    fn on_period_started(&mut self, time: usize) {
        self.periods.push(time);
    }

    fn on_action_evaluated(&mut self, evaluation: &ActionEvaluation) {
        self.evaluations.push(*evaluation);
    }

    fn on_decision(&mut self, decision: &Decision) {
        self.decisions.push(*decision);
    }

    fn on_solved(&mut self, _values: &Matrix) {
        self.solved = true;
    }
}
