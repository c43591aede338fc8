// src/model/demand.rs

use crate::error::{MdpError, MdpResult};
use serde::Serialize;

/// Allowed deviation of the pmf total from 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Validated per-period demand distribution for a store of capacity `s`.
///
/// `pmf[d]` is the probability that exactly `d` units are demanded for
/// `d < s`; the last entry `pmf[s]` is the censored tail, the probability
/// that demand is `s` or more. Since stock never exceeds `s`, the tail
/// behaves exactly like a demand of `s`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandDistribution {
    pmf: Vec<f64>,
}

impl DemandDistribution {
    /// Checks length, sign, finiteness and normalisation of `pmf`.
    pub fn new(pmf: Vec<f64>, capacity: usize) -> MdpResult<Self> {
        if pmf.len() != capacity + 1 {
            return Err(MdpError::MalformedDistribution(format!(
                "expected {} probabilities for capacity {}, got {}",
                capacity + 1,
                capacity,
                pmf.len()
            )));
        }

        for (demand, &p) in pmf.iter().enumerate() {
            if !p.is_finite() || p < 0.0 {
                return Err(MdpError::MalformedDistribution(format!(
                    "probability of demand {demand} is {p}"
                )));
            }
        }

        let total: f64 = pmf.iter().sum();
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(MdpError::MalformedDistribution(format!(
                "probabilities sum to {total}, not 1"
            )));
        }

        Ok(Self { pmf })
    }

    /// Largest stock level this distribution was built for.
    pub fn capacity(&self) -> usize {
        self.pmf.len() - 1
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.pmf
    }

    pub fn probability(&self, demand: usize) -> f64 {
        self.pmf.get(demand).copied().unwrap_or(0.0)
    }

    /// `(demand, probability)` pairs, tail included.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.pmf.iter().copied().enumerate()
    }

    /// Expected value of `f(units sold)` when `stock` units are on the shelf.
    ///
    /// Sales are capped at the available stock: unmet demand sells nothing.
    pub fn expected_sales_value(&self, stock: usize, f: impl Fn(usize) -> f64) -> f64 {
        self.iter().map(|(demand, p)| p * f(demand.min(stock))).sum()
    }

    /// Mean of the censored demand.
    pub fn mean(&self) -> f64 {
        self.iter().map(|(demand, p)| demand as f64 * p).sum()
    }
}
