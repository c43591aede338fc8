// src/strategy/traits.rs

use crate::model::matrix::Matrix;
use crate::model::reward::RewardMatrix;
use crate::model::transition::TransitionMatrix;
use serde::Serialize;
use std::fmt::Debug;

/// The cash-flow side of the inventory model.
///
/// We require `Debug` so a model can be printed alongside its solution.
/// We require `Send` + `Sync` so independent solves can share one instance.
pub trait InventoryEconomics: Debug + Send + Sync {
    /// Cost of ordering `inbound` units at the start of a period.
    fn ordering_cost(&self, inbound: usize) -> f64;

    /// Cost of carrying `stock` units into the sales period.
    fn holding_cost(&self, stock: usize) -> f64;

    /// Revenue from selling `units` units.
    fn sales_revenue(&self, units: usize) -> f64;

    /// Salvage / terminal reward at the end of the horizon.
    ///
    /// Only the time is passed: leftover stock does not change it.
    fn terminal_value(&self, time: usize) -> f64;
}

/// One candidate action scored during backward induction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActionEvaluation {
    pub time: usize,
    pub stock: usize,
    pub inbound: usize,
    /// Immediate expected reward plus expected continuation value.
    pub cumulative_reward: f64,
}

/// The action kept for one `(time, stock)` cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    pub time: usize,
    pub stock: usize,
    pub action: usize,
    pub value: f64,
}

/// Opt-in diagnostics hook for a solve.
///
/// The builders and the solver call these at fixed points; every method
/// defaults to doing nothing so implementors only override what they need.
pub trait SolveObserver {
    fn on_transition_built(&mut self, _transition: &TransitionMatrix) {}

    fn on_reward_built(&mut self, _reward: &RewardMatrix) {}

    /// Called once per period, before any stock level of `time` is solved.
    fn on_period_started(&mut self, _time: usize) {}

    fn on_action_evaluated(&mut self, _evaluation: &ActionEvaluation) {}

    fn on_decision(&mut self, _decision: &Decision) {}

    fn on_solved(&mut self, _values: &Matrix) {}
}
