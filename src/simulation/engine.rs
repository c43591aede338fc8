// src/simulation/engine.rs

use crate::error::{MdpError, MdpResult};
use crate::io::demand::DemandSampler;
use crate::model::inventory::InventoryModel;
use crate::model::matrix::Matrix;
use crate::simulation::config::SimulationConfig;
use crate::strategy::optimization::{evaluate_policy, PolicySolution};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

// Serialize so the history can be written as CSV
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub run: usize,
    pub period: usize,
    pub opening_stock: usize,
    pub ordered: usize,
    pub demand: usize,
    pub sold: usize,
    pub closing_stock: usize,
    pub revenue: f64,
    pub ordering_cost: f64,
    pub holding_cost: f64,
    pub reward: f64,
}

/// Outcome of a batch of simulated runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub runs: usize,
    pub initial_stock: usize,
    /// Expected total reward of the policy from `initial_stock`.
    pub predicted_value: f64,
    /// `u[0][initial_stock]` from the solver. Above `predicted_value` only
    /// where the zero floor hid a loss.
    pub optimal_value: f64,
    pub mean_reward: f64,
    /// Standard error of `mean_reward`; zero for fewer than two runs.
    pub std_error: f64,
}

impl SimulationSummary {
    /// Distance between simulation and prediction, in standard errors.
    pub fn z_score(&self) -> f64 {
        if self.std_error == 0.0 {
            return if self.mean_reward == self.predicted_value {
                0.0
            } else {
                f64::INFINITY
            };
        }
        (self.mean_reward - self.predicted_value) / self.std_error
    }
}

/// Replays a solved policy against sampled demand.
///
/// Each period: look up the order for the current stock, receive it
/// instantly, pay ordering and holding costs on the stocked amount, sell
/// `min(demand, stock)` and carry the rest over. The terminal value is
/// added once at the horizon.
pub struct PolicySimulation<'a> {
    config: SimulationConfig,
    model: &'a InventoryModel,
    policy: &'a PolicySolution,
    policy_values: Matrix,
    sampler: DemandSampler,
    pub history: Vec<HistoryRecord>,
    totals: Vec<f64>,
}

impl<'a> PolicySimulation<'a> {
    pub fn new(
        model: &'a InventoryModel,
        policy: &'a PolicySolution,
        sampler: DemandSampler,
        config: SimulationConfig,
    ) -> MdpResult<Self> {
        if policy.capacity != model.capacity() || policy.horizon != model.horizon() {
            return Err(MdpError::DimensionMismatch {
                what: "policy",
                expected_rows: model.horizon() + 1,
                expected_cols: model.capacity() + 1,
                rows: policy.horizon + 1,
                cols: policy.capacity + 1,
            });
        }
        if config.initial_stock > model.capacity() {
            return Err(MdpError::Config(format!(
                "initial stock {} exceeds capacity {}",
                config.initial_stock,
                model.capacity()
            )));
        }

        let policy_values = evaluate_policy(
            &model.transition_matrix(),
            &model.reward_matrix(),
            &policy.actions,
            policy.horizon,
            |t| model.economics().terminal_value(t),
        )?;

        Ok(Self {
            config,
            model,
            policy,
            policy_values,
            sampler,
            history: Vec::new(),
            totals: Vec::new(),
        })
    }

    /// Runs `config.runs` paths with an RNG seeded from `config.seed`.
    pub fn run_seeded(&mut self) -> SimulationSummary {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.run(&mut rng)
    }

    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SimulationSummary {
        info!(
            runs = self.config.runs,
            initial_stock = self.config.initial_stock,
            "simulating policy"
        );
        for run in 0..self.config.runs {
            let total = self.run_once(run, rng);
            self.totals.push(total);
        }
        let summary = self.summary();
        info!(
            mean_reward = summary.mean_reward,
            predicted_value = summary.predicted_value,
            optimal_value = summary.optimal_value,
            std_error = summary.std_error,
            "simulation complete"
        );
        summary
    }

    fn run_once<R: Rng + ?Sized>(&mut self, run: usize, rng: &mut R) -> f64 {
        let model = self.model;
        let economics = model.economics();
        let horizon = self.policy.horizon;
        let mut stock = self.config.initial_stock;
        let mut total = 0.0;

        for period in 0..horizon {
            // stock <= capacity always holds, so the lookup is in bounds
            let ordered = self.policy.actions[(period, stock)];
            let stocked = stock + ordered;
            let demand = self.sampler.sample(rng);
            let sold = demand.min(stocked);

            let revenue = economics.sales_revenue(sold);
            let ordering_cost = economics.ordering_cost(ordered);
            let holding_cost = economics.holding_cost(stocked);
            let reward = revenue - ordering_cost - holding_cost;
            total += reward;

            if self.config.record_history {
                self.history.push(HistoryRecord {
                    run,
                    period,
                    opening_stock: stock,
                    ordered,
                    demand,
                    sold,
                    closing_stock: stocked - sold,
                    revenue,
                    ordering_cost,
                    holding_cost,
                    reward,
                });
            }
            stock = stocked - sold;
        }

        total += economics.terminal_value(horizon);
        debug!(run, total, closing_stock = stock, "run finished");
        total
    }

    /// Summary over every run so far.
    pub fn summary(&self) -> SimulationSummary {
        let runs = self.totals.len();
        let mean_reward = if runs == 0 {
            0.0
        } else {
            self.totals.iter().sum::<f64>() / runs as f64
        };
        let std_error = if runs < 2 {
            0.0
        } else {
            let variance = self
                .totals
                .iter()
                .map(|x| (x - mean_reward).powi(2))
                .sum::<f64>()
                / (runs - 1) as f64;
            (variance / runs as f64).sqrt()
        };

        SimulationSummary {
            runs,
            initial_stock: self.config.initial_stock,
            predicted_value: self.policy_values[(0, self.config.initial_stock)],
            optimal_value: self.policy.values[(0, self.config.initial_stock)],
            mean_reward,
            std_error,
        }
    }

    pub fn totals(&self) -> &[f64] {
        &self.totals
    }
}
