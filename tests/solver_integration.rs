// tests/solver_integration.rs

use mdp_inventory::io::demand::{poisson_demand, DemandModel};
use mdp_inventory::logging;
use mdp_inventory::model::demand::DemandDistribution;
use mdp_inventory::model::inventory::{reference_matrices, solve_matrices, InventoryModel};
use mdp_inventory::simulation::config::{ModelConfig, SimulationConfig};
use mdp_inventory::simulation::engine::PolicySimulation;
use mdp_inventory::strategy::implementations::{
    FnEconomics, LinearEconomics, NoopObserver, RecordingObserver, TracingObserver,
};
use mdp_inventory::strategy::optimization::MaximizationRule;
use mdp_inventory::MdpError;

const TOLERANCE: f64 = 1e-9;

fn classic_model(horizon: usize) -> InventoryModel {
    let demand = DemandDistribution::new(vec![0.25, 0.5, 0.25, 0.0], 3).unwrap();
    let economics = FnEconomics::new(
        |u| 2.0 * u as f64,
        |u| u as f64,
        |u| 8.0 * u as f64,
        |_| 0.0,
    );
    InventoryModel::new(demand, economics, horizon).unwrap()
}

#[test]
fn fixture_values_propagate_backwards() {
    let (p, r) = reference_matrices().unwrap();
    let solution =
        solve_matrices(p, r, 3, |_| 0.0, MaximizationRule::FloorAtZero, &mut NoopObserver).unwrap();
    let policy = &solution.policy;

    // t = 2: no continuation, best immediate reward with the floor
    assert_eq!(policy.values.row(2), &[0.0, 5.0, 6.0, 5.0]);

    let expected_t1 = [2.0, 6.25, 10.0, 10.5];
    let expected_t0 = [4.1875, 8.0625, 12.125, 14.1875];
    for stock in 0..=3 {
        assert!((policy.values[(1, stock)] - expected_t1[stock]).abs() < TOLERANCE);
        assert!((policy.values[(0, stock)] - expected_t0[stock]).abs() < TOLERANCE);
    }
    assert_eq!(policy.actions.row(0), &[3, 0, 0, 0]);
    assert_eq!(policy.actions.row(1), &[2, 0, 0, 0]);
}

#[test]
fn built_example_with_closures_matches_linear_config() {
    let from_closures = classic_model(3).solve().unwrap();
    let from_config = ModelConfig::default().build().unwrap().solve().unwrap();

    assert_eq!(from_closures.transition, from_config.transition);
    assert_eq!(from_closures.policy.actions, from_config.policy.actions);
    for t in 0..=3 {
        for stock in 0..=3 {
            let a = from_closures.policy.values[(t, stock)];
            let b = from_config.policy.values[(t, stock)];
            assert!((a - b).abs() < TOLERANCE);
        }
    }

    let u0 = from_closures.policy.values.row(0);
    assert!((u0[3] - 243.0 / 16.0).abs() < TOLERANCE);
}

fn is_non_decreasing(row: &[f64]) -> bool {
    row.windows(2).all(|pair| pair[1] >= pair[0] - TOLERANCE)
}

#[test]
fn values_rise_with_stock_until_holding_bites() {
    let solution = classic_model(3).solve().unwrap();
    let values = &solution.policy.values;
    assert!(is_non_decreasing(values.row(0)));

    // With one period left a full shelf costs more to hold than it sells
    let last = values.row(2);
    assert_eq!(last, &[3.0, 5.0, 6.0, 5.0]);
    assert!(!is_non_decreasing(last));
}

#[test]
fn zero_capacity_collapses_to_one_state() {
    let demand = DemandDistribution::new(vec![1.0], 0).unwrap();
    let economics = LinearEconomics {
        unit_order_cost: 2.0,
        fixed_order_cost: 0.0,
        unit_holding_cost: 1.0,
        unit_price: 8.0,
        terminal_value: 1.5,
    };
    let solution = InventoryModel::new(demand, economics, 4).unwrap().solve().unwrap();

    assert_eq!(solution.transition.matrix().to_rows(), vec![vec![1.0]]);
    assert_eq!(solution.reward.reward(0, 0), Some(0.0));
    // R = 0 each period, so the floor keeps the terminal value
    for t in 0..4 {
        assert_eq!(solution.policy.action(t, 0), Some(0));
        assert_eq!(solution.policy.value(t, 0), Some(1.5));
    }
    assert_eq!(solution.policy.value(4, 0), Some(1.5));
}

#[test]
fn terminal_row_ignores_stock() {
    let demand = poisson_demand(1.2, 4).unwrap();
    let economics = FnEconomics::new(|u| u as f64, |u| 0.5 * u as f64, |u| 4.0 * u as f64, |t| t as f64 * 0.25);
    let solution = InventoryModel::new(demand, economics, 6).unwrap().solve().unwrap();
    assert!(solution.policy.values.row(6).iter().all(|&v| v == 1.5));
}

#[test]
fn floor_invariant_and_feasibility_hold_for_poisson_demand() {
    let config = ModelConfig::from_json(
        r#"{
            "capacity": 8,
            "horizon": 6,
            "demand": { "kind": "poisson", "mean": 3.0 },
            "economics": { "unit_order_cost": 3.0, "fixed_order_cost": 4.0, "unit_holding_cost": 0.5, "unit_price": 6.0 }
        }"#,
    )
    .unwrap();
    let solution = config.build().unwrap().solve().unwrap();

    for t in 0..6 {
        for stock in 0..=8 {
            let action = solution.policy.action(t, stock).unwrap();
            assert!(stock + action <= 8);
            assert!(solution.policy.value(t, stock).unwrap() >= 0.0);
        }
    }
    // Only the final decision period is hurt by overstock
    for t in 0..5 {
        assert!(is_non_decreasing(solution.policy.values.row(t)), "u[{t}]");
    }
    let last = solution.policy.values.row(5);
    assert!(last[8] < last[6]);

    for before in 0..=8 {
        let total: f64 = solution.transition.row(before).iter().sum();
        assert!((total - 1.0).abs() < TOLERANCE);
    }
}

#[test]
fn unconstrained_rule_reports_losses() {
    // Selling below cost: every order loses money
    let demand = DemandDistribution::new(vec![0.25, 0.5, 0.25, 0.0], 3).unwrap();
    let economics = FnEconomics::new(|u| 5.0 * u as f64, |u| u as f64, |u| 2.0 * u as f64, |_| 0.0);
    let model = InventoryModel::new(demand, economics, 2).unwrap();

    let floored = model.solve().unwrap();
    assert_eq!(floored.policy.value(0, 3), Some(0.0));

    let model = model.with_rule(MaximizationRule::Unconstrained);
    let free = model.solve().unwrap();
    assert!((free.policy.value(0, 3).unwrap() + 9.0 / 8.0).abs() < TOLERANCE);
    assert_eq!(free.policy.action(0, 3), Some(0));
}

#[test]
fn invalid_inputs_fail_before_solving() {
    assert!(matches!(
        DemandDistribution::new(vec![0.25, 0.5, 0.25], 3),
        Err(MdpError::MalformedDistribution(_))
    ));

    let demand = DemandDistribution::new(vec![0.5, 0.5], 1).unwrap();
    assert!(matches!(
        InventoryModel::new(demand, LinearEconomics::default(), 0),
        Err(MdpError::InvalidHorizon { horizon: 0 })
    ));

    let config = ModelConfig {
        capacity: -3,
        ..ModelConfig::default()
    };
    assert!(matches!(config.build(), Err(MdpError::InvalidCapacity { capacity: -3, .. })));
}

#[test]
fn tracing_observer_runs_under_a_subscriber() {
    logging::init_test();
    let solution = classic_model(2).solve_with(&mut TracingObserver).unwrap();
    assert_eq!(solution.horizon(), 2);
}

#[test]
fn recording_observer_sees_decisions_in_backward_order() {
    let mut recorder = RecordingObserver::default();
    classic_model(3).solve_with(&mut recorder).unwrap();

    let times: Vec<usize> = recorder.decisions.iter().map(|d| d.time).collect();
    assert!(times.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(recorder.decisions.first().map(|d| d.time), Some(2));
    assert_eq!(recorder.decisions.last().map(|d| (d.time, d.stock)), Some((0, 3)));
}

#[test]
fn simulated_policy_tracks_predicted_value() {
    let model = classic_model(3);
    let solution = model.solve().unwrap();
    let sampler = DemandModel::Explicit {
        pmf: vec![0.25, 0.5, 0.25, 0.0],
    }
    .sampler(3)
    .unwrap();

    let config = SimulationConfig {
        runs: 10_000,
        seed: 99,
        initial_stock: 2,
        record_history: false,
    };
    let mut sim = PolicySimulation::new(&model, &solution.policy, sampler, config).unwrap();
    let summary = sim.run_seeded();

    assert!((summary.predicted_value - 59.0 / 4.0).abs() < TOLERANCE);
    assert!(summary.z_score().abs() < 5.0, "{summary:?}");
}
