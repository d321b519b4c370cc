//! The discrete-event engine: a [`BranchDriver`] advances one flight path
//! step by step and handles its events; the [`SimulationRunner`] drives
//! the main branch and every booster branch forked off it.

use serde::{Deserialize, Serialize};
use skyward_models::FlightConditions;
use skyward_rocket::IgnitionTrigger;
use skyward_types::constants::{
    AOA_TUMBLE_CONDITION, APOGEE_DROP, EPSILON, LIFTOFF_ALTITUDE, MIN_DEPLOYMENT_DELAY, MIN_TIME_STEP,
    THRUST_TUMBLE_CONDITION, WARNINGS_GRACE_TIME,
};
use skyward_types::{AbortCause, ComponentRef, EventType, SimulationError, Warning, WarningSet};
use tracing::{debug, info, warn};

use crate::abort::AbortFlag;
use crate::event::{EventData, FlightEvent};
use crate::flight_data::{BranchOutcome, FlightData, FlightDataBranch, FlightDataType};
use crate::listener::{fire, fire_gate};
use crate::status::SimulationStatus;
use crate::stepper::{self, SimulationStepper, StepperKind};
use crate::triggers;

/// Lifecycle of a [`SimulationRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunnerState {
    #[default]
    NotStarted,
    Running,
    /// Every branch ended normally.
    Completed,
    /// At least one branch aborted or failed.
    Aborted,
}

/// What a finished branch hands back to the runner.
pub(crate) struct BranchResult {
    pub branch: FlightDataBranch,
    pub warnings: WarningSet,
    pub outcome: BranchOutcome,
    pub forks: Vec<SimulationStatus>,
}

/// Drives one branch from its start to `SIMULATION_END` or `SIM_ABORT`.
pub(crate) struct BranchDriver {
    status: SimulationStatus,
    stepper: Option<Box<dyn SimulationStepper>>,
    forks: Vec<SimulationStatus>,
    is_main: bool,
}

impl BranchDriver {
    pub fn new(status: SimulationStatus, is_main: bool) -> Self {
        Self {
            status,
            stepper: None,
            forks: Vec::new(),
            is_main,
        }
    }

    pub fn run(mut self, abort: &AbortFlag) -> BranchResult {
        let name = self.status.flight_data().name().to_string();
        info!(branch = %name, time = self.status.time(), "branch started");
        fire(&mut self.status, |l, s| l.start_simulation(s));

        let error = self.simulate(abort).err();
        if let Some(e) = &error {
            warn!(branch = %name, time = self.status.time(), error = %e, "branch failed");
            let event = FlightEvent::new(EventType::Exception, self.status.time())
                .with_data(EventData::Exception(e.to_string()));
            if let Err(e) = self.status.record_event(event) {
                debug!(error = %e, "exception not recorded");
            }
        }
        fire(&mut self.status, |l, s| l.end_simulation(s, error.as_ref()));

        if self.status.flight_data().is_empty() {
            self.status.add_warning(Warning::EmptyBranch(name.clone()));
        }
        let outcome = match error {
            Some(e) => BranchOutcome::Failed(e),
            None => match self.status.flight_data().abort_cause() {
                Some(cause) => BranchOutcome::Aborted(cause),
                None => BranchOutcome::Completed,
            },
        };
        self.status.set_stepper(StepperKind::Terminated);
        info!(
            branch = %name,
            time = self.status.time(),
            samples = self.status.flight_data().len(),
            outcome = ?outcome,
            "branch finished"
        );

        let forks = std::mem::take(&mut self.forks);
        let (mut branch, warnings) = self.status.into_flight_data();
        branch.immute();
        BranchResult {
            branch,
            warnings,
            outcome,
            forks,
        }
    }

    fn simulate(&mut self, abort: &AbortFlag) -> Result<(), SimulationError> {
        if self.is_main {
            self.start_main()?;
        } else {
            self.check_geometry();
        }
        self.switch_stepper(self.status.stepper())?;

        let mut cancelled = false;
        while self.handle_events()? {
            if abort.is_requested() {
                if cancelled {
                    break;
                }
                cancelled = true;
                self.status.abort_simulation(AbortCause::Cancelled);
                continue;
            }

            let altitude = self.status.position().z;
            let step_start = self.status.time();
            if fire_gate(&mut self.status, |l, s| l.pre_step(s)) {
                let max_dt = self.max_time_step();
                if let Some(stepper) = self.stepper.as_mut() {
                    stepper.step(&mut self.status, max_dt)?;
                }
            }
            fire(&mut self.status, |l, s| l.post_step(s));
            self.check_nan()?;
            self.after_step(altitude, step_start);
        }
        Ok(())
    }

    /// Startup checks and the `LAUNCH` event of the main branch.
    fn start_main(&mut self) -> Result<(), SimulationError> {
        let s = &mut self.status;
        s.store_data()?;
        let configuration = s.configuration().clone();
        if !configuration.has_active_stages() {
            s.abort_simulation(AbortCause::NoActiveStages);
            return Ok(());
        }
        if !configuration.has_motors() {
            s.abort_simulation(AbortCause::NoMotorsDefined);
            return Ok(());
        }
        if configuration
            .active_motor_mounts()
            .all(|(_, mount)| mount.ignition == IgnitionTrigger::Never)
        {
            s.abort_simulation(AbortCause::NoConfiguredIgnition);
            return Ok(());
        }
        if !configuration.has_recovery_device() {
            s.add_warning(Warning::NoRecoveryDevice);
        }
        let time = s.time();
        s.add_event(FlightEvent::new(EventType::Launch, time));
        self.check_geometry();
        Ok(())
    }

    /// Aborts on a degenerate airframe; a booster without a CP tumbles.
    fn check_geometry(&mut self) {
        let s = &mut self.status;
        let configuration = s.configuration();
        if !configuration.has_active_stages() {
            return;
        }
        if configuration.length_aerodynamic() <= EPSILON {
            s.abort_simulation(AbortCause::ZeroLength);
            return;
        }
        let conditions = FlightConditions::new(configuration.reference_length(), configuration.reference_area());
        let (_, weight) = s.conditions().aerodynamics.cp(configuration, &conditions);
        let is_sustainer = configuration.top_active_stage() == Some(0);
        if weight <= EPSILON {
            if is_sustainer {
                s.abort_simulation(AbortCause::NoCp);
            } else {
                let time = s.time();
                s.add_event(FlightEvent::new(EventType::Tumble, time));
            }
        }
    }

    fn switch_stepper(&mut self, kind: StepperKind) -> Result<(), SimulationError> {
        debug!(from = ?self.status.stepper(), to = ?kind, "switching stepper");
        self.stepper = stepper::create(kind);
        if let Some(stepper) = self.stepper.as_mut() {
            stepper.initialize(&mut self.status)?;
        }
        self.status.set_stepper(kind);
        Ok(())
    }

    fn max_time_step(&self) -> f64 {
        match self.status.event_queue().peek_min() {
            Some(event) => (event.time - self.status.time()).max(MIN_TIME_STEP),
            None if self.status.is_landed() => 0.0,
            None => f64::INFINITY,
        }
    }

    fn check_nan(&self) -> Result<(), SimulationError> {
        let s = &self.status;
        if s.time().is_nan() {
            return Err(SimulationError::NaN("time".into()));
        }
        if s.position().is_nan() {
            return Err(SimulationError::NaN("position".into()));
        }
        if s.velocity().is_nan() {
            return Err(SimulationError::NaN("velocity".into()));
        }
        if s.orientation().is_nan() || s.angular_velocity().is_nan() {
            return Err(SimulationError::NaN("rotation".into()));
        }
        Ok(())
    }

    /// Detects the flight events implied by the state after a step.
    fn after_step(&mut self, previous_altitude: f64, step_start: f64) {
        let s = &mut self.status;
        let time = s.time();

        if !s.is_liftoff() && s.position().z < 0.0 {
            s.set_position(glam::DVec3::ZERO);
            s.set_velocity(glam::DVec3::ZERO);
        }
        let altitude = s.position().z;

        if !s.is_landed() {
            s.add_event(
                FlightEvent::new(EventType::Altitude, time).with_data(EventData::Altitude {
                    from: previous_altitude,
                    to: altitude,
                }),
            );
        }
        s.track_max_altitude();

        if !s.is_liftoff() && altitude > LIFTOFF_ALTITUDE {
            s.add_event(FlightEvent::new(EventType::Liftoff, time));
        }
        if !s.is_launch_rod_cleared() && s.position().length() > s.conditions().launch_rod_length {
            s.add_event(FlightEvent::new(EventType::LaunchRod, time));
        }
        if s.is_liftoff() && !s.is_landed() && altitude < EPSILON {
            s.add_event(FlightEvent::new(EventType::GroundHit, time));
        }
        if s.is_liftoff()
            && !s.is_apogee_reached()
            && !s.is_tumbling()
            && altitude < s.max_altitude() - APOGEE_DROP
        {
            s.add_event(FlightEvent::new(EventType::Apogee, step_start));
        }
        if !s.is_tumbling() && s.is_launch_rod_cleared() && s.deployed_devices().is_empty() && !s.is_landed() {
            let data = s.flight_data();
            let cg = data.last(FlightDataType::CgLocation);
            let cp = data.last(FlightDataType::CpLocation);
            let aoa = data.last(FlightDataType::AngleOfAttack);
            if cg > cp && aoa > AOA_TUMBLE_CONDITION {
                s.add_event(FlightEvent::new(EventType::Tumble, time));
            }
        }
        if s.is_landed() && s.event_queue().is_empty() {
            s.add_event(FlightEvent::new(EventType::SimulationEnd, time));
        }
    }

    /// Handles every due event. Returns whether the branch continues.
    fn handle_events(&mut self) -> Result<bool, SimulationError> {
        loop {
            let due = matches!(
                self.status.event_queue().peek_min(),
                Some(event) if event.time <= self.status.time()
            );
            if !due {
                break;
            }
            let event = self.status.event_queue_mut().pop_min()?;
            if !self.handle_event(event)? {
                return Ok(false);
            }
        }

        let s = &mut self.status;
        if s.time() >= s.conditions().max_simulation_time {
            debug!(time = s.time(), "maximum simulation time reached");
            let time = s.time();
            s.add_event(FlightEvent::new(EventType::SimulationEnd, time));
        }
        if !s.is_motor_ignited() && !s.has_pending_ignition() {
            s.abort_simulation(AbortCause::NoMotorsFired);
        }
        Ok(true)
    }

    fn handle_event(&mut self, event: FlightEvent) -> Result<bool, SimulationError> {
        debug!(
            branch = self.status.flight_data().name(),
            event = %event.kind,
            time = event.time,
            "handling event"
        );
        let configuration = self.status.configuration().clone();
        let rocket = configuration.rocket().clone();

        if self.status.is_landed()
            && !matches!(event.kind, EventType::Altitude | EventType::SimulationEnd | EventType::SimWarn)
        {
            self.status.add_warning(Warning::EventAfterLanding(event.kind));
        }

        // Motor ignition triggers.
        let ignitions: Vec<_> = self
            .status
            .motors()
            .iter()
            .filter(|state| state.is_ready() && configuration.is_stage_active(state.key().stage))
            .filter_map(|state| {
                let key = state.key();
                let mount = rocket.motor_mount(key)?;
                triggers::ignites(mount.ignition, key.stage, &event, &configuration)
                    .then_some((key, mount.ignition_delay))
            })
            .collect();
        for (key, delay) in ignitions {
            self.status
                .add_event(FlightEvent::with_source(EventType::Ignition, event.time + delay, key));
        }

        if let Some(source) = event.source {
            if !configuration.is_component_active(source) {
                debug!(event = %event.kind, "ignoring event from inactive component");
                return Ok(true);
            }
        }
        if !fire_gate(&mut self.status, |l, s| l.handle_flight_event(s, &event)) {
            return Ok(true);
        }
        if let (EventType::RecoveryDeviceDeployment, Some(ComponentRef::Recovery(key))) = (event.kind, event.source) {
            if !fire_gate(&mut self.status, |l, s| l.recovery_device_deployment(s, key)) {
                return Ok(true);
            }
        }

        // Stage separation triggers.
        let separations: Vec<_> = configuration
            .active_stage_iter()
            .filter(|(n, stage)| triggers::separates(stage.separation, *n, &event, &rocket))
            .map(|(n, stage)| (n, stage.separation_delay))
            .collect();
        for (n, delay) in separations {
            self.status.add_event(FlightEvent::with_source(
                EventType::StageSeparation,
                event.time + delay,
                ComponentRef::Stage(n),
            ));
        }

        // Recovery deployment triggers.
        let apogee = self.status.is_apogee_reached();
        let deployments: Vec<_> = configuration
            .active_recovery_devices()
            .filter(|(key, device)| {
                !self.status.is_deployed(*key) && triggers::deploys(device.deploy, key.stage, &event, apogee, &rocket)
            })
            .map(|(key, device)| (key, device.deploy_delay.max(MIN_DEPLOYMENT_DELAY)))
            .collect();
        for (key, delay) in deployments {
            self.status.add_event(FlightEvent::with_source(
                EventType::RecoveryDeviceDeployment,
                event.time + delay,
                key,
            ));
        }

        match event.kind {
            EventType::Launch => {
                self.status.record_event(event)?;
            }
            EventType::Ignition => {
                let Some(ComponentRef::Motor(key)) = event.source else {
                    return Ok(true);
                };
                let Some(mount) = rocket.motor_mount(key) else {
                    return Ok(true);
                };
                if !self.status.motor(key).is_some_and(|m| m.is_ready()) {
                    debug!(stage = key.stage, "ignoring duplicate ignition");
                    return Ok(true);
                }
                if !fire_gate(&mut self.status, |l, s| l.motor_ignition(s, key)) {
                    return Ok(true);
                }
                let s = &mut self.status;
                if let Some(motor) = s.motor_mut(key) {
                    motor.ignite(event.time);
                }
                s.set_motor_ignited(true);
                info!(motor = %mount.motor.designation, stage = key.stage, time = event.time, "motor ignited");
                for point in mount.motor.time_points() {
                    s.add_event(FlightEvent::with_source(EventType::Altitude, event.time + point, key));
                }
                s.add_event(FlightEvent::with_source(
                    EventType::Burnout,
                    event.time + mount.motor.burn_time(),
                    key,
                ));
                s.record_event(event)?;
            }
            EventType::Liftoff => {
                self.status.set_liftoff(true);
                self.status.record_event(event)?;
            }
            EventType::LaunchRod => {
                self.status.set_launch_rod_cleared(true);
                self.status.set_start_warnings_time(event.time + WARNINGS_GRACE_TIME);
                self.status.record_event(event)?;
            }
            EventType::Burnout => {
                let s = &mut self.status;
                if !s.is_liftoff() {
                    s.abort_simulation(AbortCause::NoLiftoff);
                    return Ok(true);
                }
                let Some(ComponentRef::Motor(key)) = event.source else {
                    return Ok(true);
                };
                let mut ejection = None;
                if let Some(motor) = s.motor_mut(key) {
                    motor.burn_out(event.time);
                    if motor.has_ejection_charge() {
                        ejection = Some(event.time + motor.ejection_delay());
                    }
                }
                let time = event.time;
                s.record_event(event)?;
                if let Some(at) = ejection {
                    s.add_event(FlightEvent::with_source(EventType::EjectionCharge, at, key));
                }
                debug!(stage = key.stage, time, "motor burnout");
            }
            EventType::EjectionCharge => {
                if let Some(ComponentRef::Motor(key)) = event.source {
                    if let Some(motor) = self.status.motor_mut(key) {
                        motor.expend();
                    }
                }
                self.status.record_event(event)?;
            }
            EventType::StageSeparation => self.separate(event)?,
            EventType::Apogee => {
                let s = &mut self.status;
                s.set_apogee_reached(true);
                s.record_event(event)?;
                if s.deployed_devices().is_empty() {
                    let (altitude, time) = (s.max_altitude(), s.max_altitude_time());
                    s.flight_data_mut().set_optimum_altitude(altitude, time)?;
                }
            }
            EventType::RecoveryDeviceDeployment => {
                let Some(ComponentRef::Recovery(key)) = event.source else {
                    return Ok(true);
                };
                let s = &mut self.status;
                if s.is_deployed(key) {
                    return Ok(true);
                }
                if s.has_burning_motor() {
                    s.abort_simulation(AbortCause::DeployUnderThrust);
                    return Ok(true);
                }
                if !s.is_launch_rod_cleared() {
                    s.add_warning(Warning::RecoveryLaunchRod);
                }
                s.check_deployment_speed();
                s.set_liftoff(true);
                s.deploy(key);
                info!(stage = key.stage, device = key.index, time = event.time, "recovery device deployed");
                s.record_event(event)?;
                if !s.is_landed() {
                    self.switch_stepper(StepperKind::Landing)?;
                }
            }
            EventType::GroundHit => {
                self.status.set_landed(true);
                self.status.record_event(event)?;
                self.switch_stepper(StepperKind::Ground)?;
            }
            EventType::Tumble => {
                let s = &self.status;
                if s.is_tumbling() || !s.deployed_devices().is_empty() || s.is_landed() {
                    return Ok(true);
                }
                let thrust = s.thrust_at(event.time);
                self.switch_stepper(StepperKind::Tumble)?;
                let s = &mut self.status;
                s.set_tumbling(true);
                s.record_event(event)?;
                if thrust > THRUST_TUMBLE_CONDITION {
                    s.abort_simulation(AbortCause::TumbleUnderThrust);
                }
            }
            EventType::SimAbort => {
                if let Some(cause) = event.abort_cause() {
                    debug!(branch = self.status.flight_data().name(), time = event.time, %cause, "handling abort");
                }
                self.status.record_event(event)?;
                return Ok(false);
            }
            EventType::SimulationEnd => {
                self.status.record_event(event)?;
                return Ok(false);
            }
            EventType::Altitude | EventType::Exception | EventType::SimWarn => {}
        }
        Ok(true)
    }

    /// Splits off the assembly rooted at the stage named by `event` into a
    /// new branch. A serial stage takes everything below it; a parallel
    /// booster takes only itself.
    fn separate(&mut self, event: FlightEvent) -> Result<(), SimulationError> {
        let Some(ComponentRef::Stage(n)) = event.source else {
            return Ok(());
        };
        let s = &mut self.status;
        let rocket = s.configuration().rocket().clone();
        let Some(parent) = rocket.parent_stage(n) else {
            return Ok(());
        };
        if !s.configuration().is_stage_active(parent) {
            return Ok(());
        }
        let time = event.time;
        s.record_event(event)?;

        if !rocket.is_parallel(n) {
            let configuration = s.configuration();
            let attached_below = rocket
                .assembly(n)
                .filter(|m| !rocket.is_parallel(*m) && configuration.is_stage_active(*m))
                .count();
            if attached_below != 1 {
                s.add_warning(Warning::SeparationOrder);
            }
        }
        if !s.is_launch_rod_cleared() {
            s.add_warning(Warning::EarlySeparation);
        }

        let name = rocket
            .stage(n)
            .map_or_else(|| format!("Stage {n}"), |stage| stage.name.clone());
        let mut booster = s.fork(name.clone(), n);
        booster.configuration_mut().isolate(n);
        s.configuration_mut().detach(n);
        info!(stage = n, branch = %name, parallel = rocket.is_parallel(n), time, "stage separated");
        self.forks.push(booster);
        self.check_geometry();
        Ok(())
    }
}

/// Runs a simulation as a stack of branches, main branch first.
#[derive(Debug, Default)]
pub struct SimulationRunner {
    state: RunnerState,
}

impl SimulationRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Simulates `status` and every branch it forks. Returns the data of all
    /// branches and the first hard error, if any.
    pub fn run(&mut self, status: SimulationStatus, abort: &AbortFlag) -> (FlightData, Option<SimulationError>) {
        self.state = RunnerState::Running;
        let mut data = FlightData::new();
        let mut first_error = None;
        let mut aborted = false;

        let mut pending = vec![BranchDriver::new(status, true)];
        while let Some(driver) = pending.pop() {
            let result = driver.run(abort);
            match &result.outcome {
                BranchOutcome::Completed => {}
                BranchOutcome::Aborted(_) => aborted = true,
                BranchOutcome::Failed(e) => {
                    aborted = true;
                    first_error.get_or_insert_with(|| e.clone());
                }
            }
            pending.extend(result.forks.into_iter().map(|fork| BranchDriver::new(fork, false)));
            data.push_branch(result.branch, result.outcome, &result.warnings);
        }

        self.state = if aborted {
            RunnerState::Aborted
        } else {
            RunnerState::Completed
        };
        (data, first_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::SimulationOptions;
    use skyward_rocket::{presets, FlightConfiguration};
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn run(rocket: skyward_rocket::Rocket) -> (FlightData, RunnerState) {
        let conditions = Arc::new(SimulationOptions::calm().to_conditions().unwrap());
        let configuration = FlightConfiguration::new(Arc::new(rocket));
        let status = SimulationStatus::new(conditions, configuration, "Sustainer");
        let mut runner = SimulationRunner::new();
        assert_eq!(runner.state(), RunnerState::NotStarted);
        let (data, error) = runner.run(status, &AbortFlag::new());
        assert!(error.is_none());
        (data, runner.state())
    }

    #[test]
    #[traced_test]
    fn logs_branch_lifecycle() {
        let (data, state) = run(presets::beta());
        assert_eq!(state, RunnerState::Completed);
        assert_eq!(data.branch_count(), 2);
        assert!(logs_contain("branch started"));
        assert!(logs_contain("motor ignited"));
        assert!(logs_contain("stage separated"));
        assert!(logs_contain("branch finished"));
    }

    #[test]
    fn motorless_rocket_aborts() {
        let mut rocket = presets::alpha();
        rocket.stages[0].motors.clear();
        let (data, state) = run(rocket);
        assert_eq!(state, RunnerState::Aborted);
        assert_eq!(data.branch(0).and_then(|b| b.abort_cause()), Some(AbortCause::NoMotorsDefined));
    }

    #[test]
    fn never_ignited_motor_aborts() {
        let mut rocket = presets::alpha();
        rocket.stages[0].motors[0].ignition = IgnitionTrigger::Never;
        let (data, _) = run(rocket);
        assert_eq!(
            data.branch(0).and_then(|b| b.abort_cause()),
            Some(AbortCause::NoConfiguredIgnition)
        );
    }

    #[test]
    fn rocket_without_recovery_is_warned() {
        let mut rocket = presets::alpha();
        rocket.stages[0].recovery.clear();
        let (data, _) = run(rocket);
        assert!(data.warnings().contains(&Warning::NoRecoveryDevice));
        let main = data.branch(0).unwrap();
        assert!(main.first_event(EventType::GroundHit).is_some());
    }

    #[test]
    fn noseless_sustainer_has_no_cp() {
        let mut rocket = presets::alpha();
        rocket.stages[0].nose = None;
        let (data, _) = run(rocket);
        assert_eq!(data.branch(0).and_then(|b| b.abort_cause()), Some(AbortCause::NoCp));
    }

    #[test]
    fn apogee_sets_the_optimum_altitude() {
        let (data, _) = run(presets::alpha());
        let main = data.branch(0).unwrap();
        let apogee = main.first_event(EventType::Apogee).unwrap();
        assert!(main.optimum_altitude() > 0.0);
        assert!((main.time_to_optimum_altitude() - apogee.time).abs() < 0.5);
    }
}
