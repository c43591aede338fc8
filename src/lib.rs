//! Finite-horizon inventory control as a Markov decision process.
//!
//! A single product is stocked in `0..=s` units. Each period the
//! decision maker orders some quantity, demand is drawn from a stationary
//! distribution, and unsold stock carries over. [`model::inventory::InventoryModel`]
//! builds the transition matrix `P` and reward matrix `R` from the demand
//! law and the economics, then backward induction yields the optimal value
//! function `u` and ordering policy `a` for every period and stock level.
//!
//! ```
//! use mdp_inventory::model::demand::DemandDistribution;
//! use mdp_inventory::model::inventory::InventoryModel;
//! use mdp_inventory::strategy::implementations::LinearEconomics;
//!
//! let demand = DemandDistribution::new(vec![0.25, 0.5, 0.25, 0.0], 3)?;
//! let model = InventoryModel::new(demand, LinearEconomics::default(), 3)?;
//! let solution = model.solve()?;
//! assert_eq!(solution.policy.action(0, 0), Some(2));
//! # Ok::<(), mdp_inventory::error::MdpError>(())
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use error::{MdpError, MdpResult};
pub use model::inventory::{InventoryModel, Solution};
pub use strategy::optimization::{MaximizationRule, PolicySolution};
