//! The rocket lies on the ground: time advances, nothing moves.

use glam::DVec3;
use skyward_types::SimulationError;

use super::{SimulationStepper, StepperKind};
use crate::status::SimulationStatus;

const GROUND_TIME_STEP: f64 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct GroundStepper;

impl GroundStepper {
    pub fn new() -> Self {
        Self
    }
}

impl SimulationStepper for GroundStepper {
    fn kind(&self) -> StepperKind {
        StepperKind::Ground
    }

    fn step(&mut self, status: &mut SimulationStatus, max_dt: f64) -> Result<(), SimulationError> {
        status.store_data()?;
        status.set_velocity(DVec3::ZERO);
        status.set_angular_velocity(DVec3::ZERO);
        let dt = max_dt.min(GROUND_TIME_STEP).max(0.0);
        status.set_time(status.time() + dt);
        status.set_previous_time_step(dt);
        Ok(())
    }

    fn name(&self) -> &str {
        "Ground"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::SimulationOptions;
    use skyward_rocket::{presets, FlightConfiguration};
    use std::sync::Arc;

    #[test]
    fn only_time_advances() {
        let conditions = Arc::new(SimulationOptions::calm().to_conditions().unwrap());
        let configuration = FlightConfiguration::new(Arc::new(presets::alpha()));
        let mut status = SimulationStatus::new(conditions, configuration, "main");
        status.set_velocity(DVec3::new(1.0, 0.0, -3.0));
        let mut stepper = GroundStepper::new();
        stepper.step(&mut status, f64::INFINITY).unwrap();
        assert_eq!(status.time(), 0.5);
        assert_eq!(status.velocity(), DVec3::ZERO);
        stepper.step(&mut status, 0.0).unwrap();
        assert_eq!(status.time(), 0.5);
        assert_eq!(status.flight_data().len(), 2);
    }
}
