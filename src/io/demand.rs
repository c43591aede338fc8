// src/io/demand.rs

use crate::error::{MdpError, MdpResult};
use crate::model::demand::DemandDistribution;
use rand::distributions::WeightedIndex;
use rand::Rng;
use rand_distr::{Distribution, Poisson};
use serde::{Deserialize, Serialize};

/// How the per-period demand law is specified in a model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DemandModel {
    /// `pmf[0..s]` exact, `pmf[s]` the probability of `s` or more.
    Explicit { pmf: Vec<f64> },
    /// Poisson demand with the given mean, censored at capacity.
    Poisson { mean: f64 },
    /// Every level `0..=s` equally likely.
    Uniform,
    /// The same demand every period.
    Constant { demand: usize },
}

impl DemandModel {
    /// Resolves the model into a validated pmf for `capacity`.
    pub fn distribution(&self, capacity: usize) -> MdpResult<DemandDistribution> {
        match self {
            DemandModel::Explicit { pmf } => DemandDistribution::new(pmf.clone(), capacity),
            DemandModel::Poisson { mean } => poisson_demand(*mean, capacity),
            DemandModel::Uniform => uniform_demand(capacity),
            DemandModel::Constant { demand } => constant_demand(*demand, capacity),
        }
    }

    /// Sampler drawing raw (uncensored where possible) demand realisations.
    pub fn sampler(&self, capacity: usize) -> MdpResult<DemandSampler> {
        match self {
            DemandModel::Poisson { mean } if *mean > 0.0 => Poisson::new(*mean)
                .map(DemandSampler::Poisson)
                .map_err(|e| MdpError::Sampling(e.to_string())),
            _ => DemandSampler::from_distribution(&self.distribution(capacity)?),
        }
    }
}

/// Generates a distribution where demand is always `demand` units.
/// Anything at or above capacity lands in the tail bucket.
pub fn constant_demand(demand: usize, capacity: usize) -> MdpResult<DemandDistribution> {
    let mut pmf = vec![0.0; capacity + 1];
    pmf[demand.min(capacity)] = 1.0;
    DemandDistribution::new(pmf, capacity)
}

/// Generates a uniform distribution over `0..=capacity`.
pub fn uniform_demand(capacity: usize) -> MdpResult<DemandDistribution> {
    let p = 1.0 / (capacity + 1) as f64;
    DemandDistribution::new(vec![p; capacity + 1], capacity)
}

/// Generates a Poisson distribution censored at `capacity`.
///
/// # Arguments
/// * `mean` - Expected demand per period, must be finite and non-negative.
/// * `capacity` - Largest stock level; `pmf[capacity]` collects `P(D >= capacity)`.
pub fn poisson_demand(mean: f64, capacity: usize) -> MdpResult<DemandDistribution> {
    if !mean.is_finite() || mean < 0.0 {
        return Err(MdpError::MalformedDistribution(format!(
            "Poisson mean must be finite and non-negative, got {mean}"
        )));
    }

    if mean == 0.0 {
        return constant_demand(0, capacity);
    }

    // ln p(d) = -mean + d ln(mean) - ln(d!); e^-mean alone underflows past ~745
    let mut pmf = Vec::with_capacity(capacity + 1);
    let ln_mean = mean.ln();
    let mut ln_factorial = 0.0;
    for demand in 0..capacity {
        if demand > 0 {
            ln_factorial += (demand as f64).ln();
        }
        pmf.push((-mean + demand as f64 * ln_mean - ln_factorial).exp());
    }

    // Tail mass; clamp rounding noise below zero
    let head: f64 = pmf.iter().sum();
    pmf.push((1.0 - head).max(0.0));

    DemandDistribution::new(pmf, capacity)
}

/// Draws demand realisations for the policy simulation.
#[derive(Debug, Clone)]
pub enum DemandSampler {
    /// Draws an index of the censored pmf.
    Table(WeightedIndex<f64>),
    /// Draws from the underlying Poisson law, tail included.
    Poisson(Poisson<f64>),
}

impl DemandSampler {
    pub fn from_distribution(distribution: &DemandDistribution) -> MdpResult<Self> {
        WeightedIndex::new(distribution.probabilities())
            .map(DemandSampler::Table)
            .map_err(|e| MdpError::Sampling(e.to_string()))
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self {
            DemandSampler::Table(index) => index.sample(rng),
            // Float-to-int casts saturate; Poisson draws are non-negative integers
            DemandSampler::Poisson(poisson) => poisson.sample(rng) as usize,
        }
    }
}

/// Generates a demand schedule of `periods` draws.
pub fn sample_schedule<R: Rng + ?Sized>(
    sampler: &DemandSampler,
    periods: usize,
    rng: &mut R,
) -> Vec<usize> {
    (0..periods).map(|_| sampler.sample(rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn poisson_tail_holds_remaining_mass() {
        let dist = poisson_demand(1.5, 4).unwrap();
        let p = dist.probabilities();
        assert!((p[0] - (-1.5f64).exp()).abs() < 1e-12);
        assert!((p[1] - 1.5 * (-1.5f64).exp()).abs() < 1e-12);
        let head: f64 = p[..4].iter().sum();
        assert!((p[4] - (1.0 - head)).abs() < 1e-12);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn poisson_zero_capacity_and_zero_mean() {
        assert_eq!(poisson_demand(3.0, 0).unwrap().probabilities(), &[1.0]);
        assert_eq!(poisson_demand(0.0, 2).unwrap().probabilities(), &[1.0, 0.0, 0.0]);
        assert!(poisson_demand(-1.0, 2).is_err());
        assert!(poisson_demand(f64::INFINITY, 2).is_err());
    }

    #[test]
    fn large_poisson_mean_keeps_its_mass_near_the_mean() {
        let dist = poisson_demand(800.0, 1000).unwrap();
        let p = dist.probabilities();
        let near_mean: f64 = p[700..=900].iter().sum();
        assert!(near_mean > 0.99, "mass near the mean {near_mean}");
        assert!(p[1000] < 1e-6, "tail {}", p[1000]);

        let mode = (0..1000).max_by(|&a, &b| p[a].total_cmp(&p[b])).unwrap();
        assert!((799..=800).contains(&mode), "mode {mode}");
    }

    #[test]
    fn constant_demand_above_capacity_is_censored() {
        assert_eq!(constant_demand(7, 3).unwrap().probabilities(), &[0.0, 0.0, 0.0, 1.0]);
        assert_eq!(constant_demand(1, 3).unwrap().probabilities(), &[0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn uniform_is_flat() {
        let dist = uniform_demand(3).unwrap();
        assert!(dist.probabilities().iter().all(|&p| (p - 0.25).abs() < 1e-12));
    }

    #[test]
    fn explicit_model_is_validated() {
        let model = DemandModel::Explicit { pmf: vec![0.5, 0.6] };
        assert!(model.distribution(1).is_err());
    }

    #[test]
    fn models_deserialize_by_kind() {
        let model: DemandModel = serde_json::from_str(r#"{"kind": "poisson", "mean": 2.0}"#).unwrap();
        assert_eq!(model, DemandModel::Poisson { mean: 2.0 });
        let model: DemandModel = serde_json::from_str(r#"{"kind": "uniform"}"#).unwrap();
        assert_eq!(model, DemandModel::Uniform);
    }

    #[test]
    fn table_sampler_never_draws_impossible_demand() {
        let dist = DemandDistribution::new(vec![0.25, 0.5, 0.25, 0.0], 3).unwrap();
        let sampler = DemandSampler::from_distribution(&dist).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let schedule = sample_schedule(&sampler, 2_000, &mut rng);
        assert!(schedule.iter().all(|&d| d <= 2));
        let mean = schedule.iter().sum::<usize>() as f64 / schedule.len() as f64;
        assert!((mean - 1.0).abs() < 0.1, "sample mean {mean}");
    }

    #[test]
    fn poisson_sampler_matches_mean() {
        let sampler = DemandModel::Poisson { mean: 2.0 }.sampler(3).unwrap();
        assert!(matches!(sampler, DemandSampler::Poisson(_)));
        let mut rng = StdRng::seed_from_u64(11);
        let schedule = sample_schedule(&sampler, 5_000, &mut rng);
        let mean = schedule.iter().sum::<usize>() as f64 / schedule.len() as f64;
        assert!((mean - 2.0).abs() < 0.15, "sample mean {mean}");
    }
}
