// src/cli.rs

use crate::io::reporting;
use crate::model::inventory::{reference_matrices, solve_matrices, Solution};
use crate::simulation::config::ModelConfig;
use crate::simulation::engine::PolicySimulation;
use crate::strategy::implementations::{NoopObserver, TracingObserver};
use crate::strategy::optimization::{validate_horizon, MaximizationRule};
use crate::strategy::traits::SolveObserver;
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Solve the built-in literal P and R instead of building them
    Test,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Csv,
    Json,
}

/// Optimal ordering policy for a finite-horizon inventory problem.
#[derive(Debug, Parser)]
#[command(name = "mdp-inventory", version, about)]
pub struct Cli {
    /// Number of decision periods T; overrides the configuration
    #[arg(allow_negative_numbers = true)]
    pub horizon: Option<i64>,

    /// `test` solves the literal fixture matrices
    #[arg(value_enum)]
    pub mode: Option<Mode>,

    /// JSON model configuration; defaults to the classic capacity-3 example
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Report the best action even when every action loses money
    #[arg(long)]
    pub unconstrained: bool,

    /// Emit every matrix and action evaluation as tracing events
    #[arg(long)]
    pub trace: bool,

    /// Replay the optimal policy over RUNS sampled demand paths
    #[arg(long, value_name = "RUNS")]
    pub simulate: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub initial_stock: Option<usize>,

    /// With --simulate, also print the per-period history as CSV
    #[arg(long, requires = "simulate")]
    pub history: bool,
}

impl Cli {
    fn load_config(&self) -> Result<ModelConfig> {
        let mut config = match &self.config {
            Some(path) => ModelConfig::from_path(path)
                .with_context(|| format!("loading model configuration {}", path.display()))?,
            None => ModelConfig::default(),
        };

        if let Some(horizon) = self.horizon {
            config.horizon = horizon;
        }
        if self.unconstrained {
            config.maximization = MaximizationRule::Unconstrained;
        }
        if let Some(runs) = self.simulate {
            config.simulation.runs = runs;
        }
        if let Some(seed) = self.seed {
            config.simulation.seed = seed;
        }
        if let Some(stock) = self.initial_stock {
            config.simulation.initial_stock = stock;
        }
        config.simulation.record_history = self.history;
        Ok(config)
    }
}

fn write_report<W: Write>(out: &mut W, format: OutputFormat, solution: &Solution) -> Result<()> {
    match format {
        OutputFormat::Text => reporting::write_text_report(out, solution)?,
        OutputFormat::Csv => reporting::write_csv_report(&mut *out, solution)?,
        OutputFormat::Json => reporting::write_json_report(out, solution)?,
    }
    Ok(())
}

/// Runs one invocation, writing every report to `out`.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let config = cli.load_config()?;

    let mut tracing_observer = TracingObserver;
    let mut noop = NoopObserver;
    let observer: &mut dyn SolveObserver = if cli.trace {
        &mut tracing_observer
    } else {
        &mut noop
    };

    if cli.mode == Some(Mode::Test) {
        if cli.simulate.is_some() {
            bail!("--simulate needs a model built from demand and economics, not the test matrices");
        }
        let horizon = validate_horizon(config.horizon)?;
        info!(horizon, "solving literal test matrices");

        let (transition, reward) = reference_matrices()?;
        observer.on_transition_built(&transition);
        observer.on_reward_built(&reward);
        let solution = solve_matrices(transition, reward, horizon, |_| 0.0, config.maximization, observer)?;
        return write_report(out, cli.format, &solution);
    }

    let model = config.build().context("invalid model configuration")?;
    let solution = model.solve_with(observer)?;
    write_report(out, cli.format, &solution)?;

    if cli.simulate.is_some() {
        let sampler = config.demand.sampler(model.capacity())?;
        let mut sim = PolicySimulation::new(&model, &solution.policy, sampler, config.simulation.clone())?;
        let summary = sim.run_seeded();

        writeln!(out)?;
        reporting::write_simulation_summary(out, &summary)?;
        if cli.history {
            writeln!(out)?;
            reporting::write_simulation_log(&mut *out, &sim.history)?;
        }
    }

    Ok(())
}
