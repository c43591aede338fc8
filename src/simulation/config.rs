// src/simulation/config.rs

use crate::error::{MdpError, MdpResult};
use crate::io::demand::DemandModel;
use crate::model::inventory::{validate_capacity, InventoryModel};
use crate::strategy::implementations::LinearEconomics;
use crate::strategy::optimization::{validate_horizon, MaximizationRule};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Monte Carlo settings for replaying a solved policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub runs: usize,
    pub seed: u64,
    pub initial_stock: usize,
    /// Keep one record per run and period.
    pub record_history: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            runs: 1_000,
            seed: 42,
            initial_stock: 0,
            record_history: false,
        }
    }
}

/// Model parameters as read from a JSON file.
///
/// Capacity and horizon are signed here so that nonsense such as a
/// negative horizon is reported as such instead of as a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub capacity: i64,
    pub horizon: i64,
    pub demand: DemandModel,
    pub economics: LinearEconomics,
    pub maximization: MaximizationRule,
    pub simulation: SimulationConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            capacity: 3,
            horizon: 3,
            demand: DemandModel::Explicit {
                pmf: vec![0.25, 0.5, 0.25, 0.0],
            },
            economics: LinearEconomics::default(),
            maximization: MaximizationRule::FloorAtZero,
            simulation: SimulationConfig::default(),
        }
    }
}

impl ModelConfig {
    pub fn from_json(json: &str) -> MdpResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> MdpResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| MdpError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Checks every parameter and builds the solvable model.
    pub fn build(&self) -> MdpResult<InventoryModel> {
        let capacity = validate_capacity(self.capacity)?;
        let horizon = validate_horizon(self.horizon)?;
        let demand = self.demand.distribution(capacity)?;

        if self.simulation.initial_stock > capacity {
            return Err(MdpError::Config(format!(
                "initial stock {} exceeds capacity {capacity}",
                self.simulation.initial_stock
            )));
        }

        Ok(InventoryModel::new(demand, self.economics.clone(), horizon)?.with_rule(self.maximization))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_the_classic_example() {
        let model = ModelConfig::default().build().unwrap();
        assert_eq!(model.capacity(), 3);
        assert_eq!(model.horizon(), 3);
        assert_eq!(model.rule(), MaximizationRule::FloorAtZero);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = ModelConfig::from_json(
            r#"{
                "capacity": 5,
                "demand": { "kind": "poisson", "mean": 2.0 },
                "maximization": "unconstrained"
            }"#,
        )
        .unwrap();
        assert_eq!(config.horizon, 3);
        assert_eq!(config.economics, LinearEconomics::default());

        let model = config.build().unwrap();
        assert_eq!(model.capacity(), 5);
        assert_eq!(model.rule(), MaximizationRule::Unconstrained);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(ModelConfig::from_json(r#"{"capacty": 3}"#).is_err());
    }

    #[test]
    fn negative_inputs_fail_fast() {
        let config = ModelConfig {
            capacity: -1,
            ..ModelConfig::default()
        };
        assert!(matches!(config.build(), Err(MdpError::InvalidCapacity { capacity: -1, .. })));

        let config = ModelConfig {
            horizon: 0,
            ..ModelConfig::default()
        };
        assert!(matches!(config.build(), Err(MdpError::InvalidHorizon { horizon: 0 })));
    }

    #[test]
    fn pmf_length_must_match_capacity() {
        let config = ModelConfig {
            capacity: 4,
            ..ModelConfig::default()
        };
        assert!(matches!(config.build(), Err(MdpError::MalformedDistribution(_))));
    }

    #[test]
    fn initial_stock_is_bounded() {
        let mut config = ModelConfig::default();
        config.simulation.initial_stock = 4;
        assert!(matches!(config.build(), Err(MdpError::Config(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"capacity": 2, "demand": {{"kind": "uniform"}}, "horizon": 4}}"#).unwrap();

        let model = ModelConfig::from_path(file.path()).unwrap().build().unwrap();
        assert_eq!(model.capacity(), 2);
        assert_eq!(model.horizon(), 4);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = ModelConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, MdpError::Config(_)));
    }
}
