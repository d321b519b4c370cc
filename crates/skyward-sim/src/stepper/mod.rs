//! Time-integration strategies.
//!
//! The branch driver owns one stepper at a time and swaps it in response
//! to flight events:
//!
//! ```text
//! Rk4 ──TUMBLE──▶ Tumble ──GROUND_HIT──▶ Ground
//!  │                                      ▲
//!  └──RECOVERY_DEVICE_DEPLOYMENT──▶ Landing┘
//! ```
//!
//! Every model evaluation goes through the listener pipeline, so the
//! helpers in this module are shared by all steppers.

pub mod euler;
pub mod ground;
pub mod rk4;

use serde::{Deserialize, Serialize};
use skyward_models::{AerodynamicForces, AtmosphericConditions, FlightConditions, RigidBody};
use skyward_types::{SimulationError, WarningSet};

use crate::listener::{pipeline, AccelerationData};
use crate::status::SimulationStatus;

pub use euler::{EulerStepper, EulerMode};
pub use ground::GroundStepper;
pub use rk4::Rk4Stepper;

/// Which integration strategy is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepperKind {
    /// Six-degree-of-freedom Runge–Kutta for aerodynamic flight.
    Rk4,
    /// Drag-only free fall of an unstable airframe.
    Tumble,
    /// Descent under deployed recovery devices.
    Landing,
    /// On the ground.
    Ground,
    /// The branch has ended.
    Terminated,
}

/// Trait for time integration strategies.
///
/// ```text
/// stepper.initialize(status)?;
/// loop {
///     stepper.step(status, max_dt)?;
/// }
/// ```
pub trait SimulationStepper: Send {
    fn kind(&self) -> StepperKind;

    /// Called when the stepper becomes active.
    fn initialize(&mut self, _status: &mut SimulationStatus) -> Result<(), SimulationError> {
        Ok(())
    }

    /// Advances `status` by at most `max_dt` seconds, storing one data sample.
    fn step(&mut self, status: &mut SimulationStatus, max_dt: f64) -> Result<(), SimulationError>;

    fn name(&self) -> &str;
}

/// Builds the stepper for `kind`. `Terminated` has none.
pub fn create(kind: StepperKind) -> Option<Box<dyn SimulationStepper>> {
    match kind {
        StepperKind::Rk4 => Some(Box::new(Rk4Stepper::new())),
        StepperKind::Tumble => Some(Box::new(EulerStepper::new(EulerMode::Tumble))),
        StepperKind::Landing => Some(Box::new(EulerStepper::new(EulerMode::Landing))),
        StepperKind::Ground => Some(Box::new(GroundStepper::new())),
        StepperKind::Terminated => None,
    }
}

// ─── Model pipelines ─────────────────────────────────────────────

pub(crate) fn atmospheric_conditions(status: &mut SimulationStatus) -> AtmosphericConditions {
    pipeline(
        status,
        |l, s| l.pre_atmospheric_model(s),
        |s| {
            let altitude = s.conditions().launch_site.altitude + s.position().z;
            s.conditions().atmosphere.conditions_at(altitude)
        },
        |l, s, v| l.post_atmospheric_model(s, v),
    )
}

pub(crate) fn wind_velocity(status: &mut SimulationStatus) -> glam::DVec3 {
    pipeline(
        status,
        |l, s| l.pre_wind_model(s),
        |s| s.conditions().wind.velocity_at(s.time(), s.position().z),
        |l, s, v| l.post_wind_model(s, v),
    )
}

pub(crate) fn gravity(status: &mut SimulationStatus) -> f64 {
    pipeline(
        status,
        |l, s| l.pre_gravity_model(s),
        |s| {
            let altitude = s.conditions().launch_site.altitude + s.position().z;
            s.conditions().gravity.gravity_at(altitude)
        },
        |l, s, v| l.post_gravity_model(s, v),
    )
}

/// Mass properties through the listener pipeline, cached on the status.
pub(crate) fn mass_data(status: &mut SimulationStatus) -> RigidBody {
    let mass = pipeline(
        status,
        |l, s| l.pre_mass_calculation(s),
        |s| {
            s.conditions()
                .mass
                .mass_data(s.configuration(), s.motors(), s.time())
        },
        |l, s, v| l.post_mass_calculation(s, v),
    );
    status.set_mass_snapshot(mass);
    mass
}

pub(crate) fn thrust(status: &mut SimulationStatus) -> f64 {
    pipeline(
        status,
        |l, s| l.pre_thrust_calculation(s),
        |s| s.thrust_at(s.time()),
        |l, s, v| l.post_thrust_calculation(s, v),
    )
}

pub(crate) fn flight_conditions(
    status: &mut SimulationStatus,
    compute: impl FnOnce(&mut SimulationStatus) -> FlightConditions,
) -> FlightConditions {
    pipeline(
        status,
        |l, s| l.pre_flight_conditions(s),
        compute,
        |l, s, v| l.post_flight_conditions(s, v),
    )
}

pub(crate) fn aerodynamic_forces(
    status: &mut SimulationStatus,
    conditions: &FlightConditions,
    warnings: &mut WarningSet,
) -> AerodynamicForces {
    pipeline(
        status,
        |l, s| l.pre_aerodynamic_calculation(s),
        |s| {
            s.conditions()
                .aerodynamics
                .forces(s.configuration(), conditions, warnings)
        },
        |l, s, v| l.post_aerodynamic_calculation(s, v),
    )
}

pub(crate) fn acceleration(
    status: &mut SimulationStatus,
    compute: impl FnOnce(&mut SimulationStatus) -> AccelerationData,
) -> AccelerationData {
    pipeline(
        status,
        |l, s| l.pre_acceleration_calculation(s),
        compute,
        |l, s, v| l.post_acceleration_calculation(s, v),
    )
}
