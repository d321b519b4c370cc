//! Batch runner: executes scenarios and collects metrics.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use skyward_sim::Simulation;
use skyward_types::{SkywardError, SkywardResult};
use tracing::{debug, info};

use crate::metrics::FlightMetrics;
use crate::scenarios::{Scenario, ScenarioKind};

pub struct BatchRunner;

impl BatchRunner {
    /// Runs a single scenario to completion.
    ///
    /// Aborted branches still produce metrics; a hard simulation error
    /// is returned.
    pub fn run(scenario: &Scenario) -> SkywardResult<FlightMetrics> {
        let mut simulation = Simulation::from_options(Arc::new(scenario.rocket.clone()), &scenario.options)?;

        let start = Instant::now();
        simulation.simulate()?;
        let wall_time = start.elapsed().as_secs_f64();

        let data = simulation
            .flight_data()
            .ok_or_else(|| SkywardError::InvalidConfig("simulation produced no data".into()))?;
        let metrics = FlightMetrics::from_flight_data(scenario.kind.name(), scenario.options.random_seed, data, wall_time);
        debug!(
            scenario = %metrics.scenario,
            seed = metrics.seed,
            apogee = metrics.apogee,
            wall_time = metrics.wall_time,
            "scenario finished"
        );
        Ok(metrics)
    }

    /// Runs every `kind` with every seed in `seeds`, in parallel.
    ///
    /// Results come back in `kinds × seeds` order.
    pub fn run_many(kinds: &[ScenarioKind], seeds: &[u64]) -> SkywardResult<Vec<FlightMetrics>> {
        let scenarios: Vec<Scenario> = kinds
            .iter()
            .flat_map(|&kind| seeds.iter().map(move |&seed| Scenario::from_kind(kind).with_seed(seed)))
            .collect();
        info!(runs = scenarios.len(), "running batch");
        scenarios.par_iter().map(Self::run).collect()
    }

    /// Every scenario once, with seed 0.
    pub fn run_all() -> SkywardResult<Vec<FlightMetrics>> {
        Self::run_many(ScenarioKind::all(), &[0])
    }
}
