//! Integration tests for skyward-bench.

use skyward_bench::metrics::FlightMetrics;
use skyward_bench::runner::BatchRunner;
use skyward_bench::scenarios::{Scenario, ScenarioKind};

// ─── Scenario Tests ───────────────────────────────────────────

#[test]
fn all_scenarios() {
    assert_eq!(ScenarioKind::all().len(), 5);
    for &kind in ScenarioKind::all() {
        assert_eq!(ScenarioKind::from_name(kind.name()), Some(kind));
        let scenario = Scenario::from_kind(kind);
        assert_eq!(scenario.kind, kind);
        scenario.rocket.validate().unwrap();
        scenario.options.validate().unwrap();
    }
    assert_eq!(ScenarioKind::from_name("orbital"), None);
}

#[test]
fn scenario_stage_counts() {
    assert_eq!(Scenario::single_stage().rocket.stage_count(), 1);
    assert_eq!(Scenario::two_stage().rocket.stage_count(), 2);
    assert_eq!(Scenario::three_stage().rocket.stage_count(), 3);
    assert_eq!(Scenario::strap_on().rocket.stage_count(), 3);
    assert!(Scenario::windy().options.wind_average > 0.0);
}

#[test]
fn seed_is_applied() {
    let scenario = Scenario::windy().with_seed(42);
    assert_eq!(scenario.options.random_seed, 42);
}

// ─── Runner Tests ─────────────────────────────────────────────

#[test]
fn run_single_stage() {
    let metrics = BatchRunner::run(&Scenario::single_stage().fast()).unwrap();
    assert_eq!(metrics.scenario, "single_stage");
    assert_eq!(metrics.branches, 1);
    assert_eq!(metrics.aborted_branches, 0);
    assert!(metrics.apogee > 0.0);
    assert!(metrics.flight_time > metrics.time_to_apogee);
    assert!(metrics.wall_time > 0.0);
}

#[test]
fn run_strap_on() {
    let metrics = BatchRunner::run(&Scenario::strap_on().fast()).unwrap();
    assert_eq!(metrics.branches, 3);
    assert_eq!(metrics.aborted_branches, 0);
    assert!(metrics.apogee > 0.0);
}

#[test]
fn run_many_keeps_order_and_is_deterministic() {
    let kinds = [ScenarioKind::Windy, ScenarioKind::TwoStage];
    let seeds = [1, 2];
    let first = BatchRunner::run_many(&kinds, &seeds).unwrap();
    assert_eq!(first.len(), 4);
    let order: Vec<_> = first.iter().map(|m| (m.scenario.as_str(), m.seed)).collect();
    assert_eq!(
        order,
        vec![("windy", 1), ("windy", 2), ("two_stage", 1), ("two_stage", 2)]
    );
    assert_eq!(first[2].branches, 2);

    let second = BatchRunner::run_many(&kinds, &seeds).unwrap();
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.apogee, b.apogee);
        assert_eq!(a.flight_time, b.flight_time);
    }
}

// ─── Metrics Tests ────────────────────────────────────────────

#[test]
fn csv_output() {
    let metrics = BatchRunner::run(&Scenario::single_stage().fast()).unwrap();
    let csv = FlightMetrics::to_csv(&[metrics.clone(), metrics]);
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("scenario,seed,apogee_m"));
    assert!(lines[1].starts_with("single_stage,0,"));
    assert_eq!(
        lines[0].split(',').count(),
        lines[1].split(',').count()
    );
}

#[test]
fn metrics_serialization() {
    let metrics = BatchRunner::run(&Scenario::three_stage().fast()).unwrap();
    let json = serde_json::to_string(&metrics).unwrap();
    let recovered: FlightMetrics = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered.branches, 3);
    assert_eq!(recovered.scenario, "three_stage");
}
