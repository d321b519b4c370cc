//! The user-facing simulation: a rocket, a flight configuration, launch
//! conditions, and the data of the last run.

use std::sync::Arc;

use skyward_rocket::{FlightConfiguration, Rocket};
use skyward_types::SkywardResult;
use tracing::info;

use crate::abort::AbortFlag;
use crate::conditions::{SimulationConditions, SimulationOptions};
use crate::engine::{RunnerState, SimulationRunner};
use crate::flight_data::FlightData;
use crate::listener::SimulationListener;
use crate::status::SimulationStatus;

#[derive(Debug)]
pub struct Simulation {
    configuration: FlightConfiguration,
    conditions: Arc<SimulationConditions>,
    state: RunnerState,
    flight_data: Option<FlightData>,
}

impl Simulation {
    /// A simulation of `rocket` with every stage active.
    pub fn new(rocket: Arc<Rocket>, conditions: SimulationConditions) -> Self {
        Self {
            configuration: FlightConfiguration::new(rocket),
            conditions: Arc::new(conditions),
            state: RunnerState::NotStarted,
            flight_data: None,
        }
    }

    pub fn from_options(rocket: Arc<Rocket>, options: &SimulationOptions) -> SkywardResult<Self> {
        Ok(Self::new(rocket, options.to_conditions()?))
    }

    pub fn rocket(&self) -> &Arc<Rocket> {
        self.configuration.rocket()
    }

    pub fn configuration(&self) -> &FlightConfiguration {
        &self.configuration
    }

    pub fn configuration_mut(&mut self) -> &mut FlightConfiguration {
        &mut self.configuration
    }

    pub fn conditions(&self) -> &SimulationConditions {
        &self.conditions
    }

    pub fn conditions_mut(&mut self) -> &mut SimulationConditions {
        Arc::make_mut(&mut self.conditions)
    }

    pub fn add_listener(&mut self, listener: Arc<dyn SimulationListener>) {
        self.conditions_mut().add_listener(listener);
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Data of the last run, if any.
    pub fn flight_data(&self) -> Option<&FlightData> {
        self.flight_data.as_ref()
    }

    /// Runs the simulation to completion.
    ///
    /// Aborted branches are a normal outcome and are reported through the
    /// flight data. A hard error in any branch is returned after every
    /// branch has run; the data of all branches is kept either way.
    pub fn simulate(&mut self) -> SkywardResult<()> {
        self.simulate_with_abort(&AbortFlag::new())
    }

    /// Like [`Simulation::simulate`], stopping every branch once `abort`
    /// is requested.
    pub fn simulate_with_abort(&mut self, abort: &AbortFlag) -> SkywardResult<()> {
        let rocket = Arc::clone(self.configuration.rocket());
        let branch_name = self
            .configuration
            .top_active_stage()
            .and_then(|n| rocket.stage(n))
            .map_or_else(|| rocket.name.clone(), |stage| stage.name.clone());
        info!(
            rocket = %rocket.name,
            stages = self.configuration.active_stages().len(),
            "simulation started"
        );

        let status = SimulationStatus::new(Arc::clone(&self.conditions), self.configuration.clone(), branch_name);
        let mut runner = SimulationRunner::new();
        let (data, error) = runner.run(status, abort);
        self.state = runner.state();
        info!(
            branches = data.branch_count(),
            max_altitude = data.max_altitude(),
            flight_time = data.flight_time(),
            state = ?self.state,
            "simulation finished"
        );
        self.flight_data = Some(data);

        match error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}
