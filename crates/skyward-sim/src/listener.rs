//! Simulation listeners: hooks into the step loop, event handling and every
//! physical computation.
//!
//! Every method has a no-op default, so a listener implements only the
//! hooks it needs. Listeners are shared read-only across branches; any
//! state they keep must use interior mutability.
//!
//! "Pre" hooks may return `Some(value)` to replace the model computation
//! entirely; later listeners and the post hooks are then skipped. "Post"
//! hooks receive the computed value and return it, possibly modified.
//! Event gates return `false` to cancel the action.
//!
//! A listener that changes the simulation (bumps the status generation,
//! overrides a value, or returns a different post value) raises a
//! [`Warning::ListenersAffected`] unless it reports itself as a system
//! listener.

use std::sync::Arc;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use skyward_models::{AerodynamicForces, AtmosphericConditions, FlightConditions, RigidBody};
use skyward_types::{DeviceKey, MotorKey, SimulationError, Warning};

use crate::event::FlightEvent;
use crate::status::SimulationStatus;

/// Linear and angular acceleration in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AccelerationData {
    /// m/s²
    pub linear: DVec3,
    /// rad/s²
    pub angular: DVec3,
}

#[allow(unused_variables)]
pub trait SimulationListener: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// System listeners observe without being reported as affecting the
    /// simulation.
    fn is_system_listener(&self) -> bool {
        false
    }

    // ─── Boundaries ──────────────────────────────────────────

    fn start_simulation(&self, status: &mut SimulationStatus) {}

    fn end_simulation(&self, status: &mut SimulationStatus, error: Option<&SimulationError>) {}

    /// Returning `false` skips the physical step.
    fn pre_step(&self, status: &mut SimulationStatus) -> bool {
        true
    }

    fn post_step(&self, status: &mut SimulationStatus) {}

    // ─── Event gates ─────────────────────────────────────────

    fn add_flight_event(&self, status: &mut SimulationStatus, event: &FlightEvent) -> bool {
        true
    }

    fn handle_flight_event(&self, status: &mut SimulationStatus, event: &FlightEvent) -> bool {
        true
    }

    fn motor_ignition(&self, status: &mut SimulationStatus, motor: MotorKey) -> bool {
        true
    }

    fn recovery_device_deployment(&self, status: &mut SimulationStatus, device: DeviceKey) -> bool {
        true
    }

    // ─── Computations ────────────────────────────────────────

    fn pre_atmospheric_model(&self, status: &mut SimulationStatus) -> Option<AtmosphericConditions> {
        None
    }

    fn post_atmospheric_model(
        &self,
        status: &mut SimulationStatus,
        conditions: AtmosphericConditions,
    ) -> AtmosphericConditions {
        conditions
    }

    fn pre_wind_model(&self, status: &mut SimulationStatus) -> Option<DVec3> {
        None
    }

    fn post_wind_model(&self, status: &mut SimulationStatus, wind: DVec3) -> DVec3 {
        wind
    }

    fn pre_gravity_model(&self, status: &mut SimulationStatus) -> Option<f64> {
        None
    }

    fn post_gravity_model(&self, status: &mut SimulationStatus, gravity: f64) -> f64 {
        gravity
    }

    fn pre_flight_conditions(&self, status: &mut SimulationStatus) -> Option<FlightConditions> {
        None
    }

    fn post_flight_conditions(&self, status: &mut SimulationStatus, conditions: FlightConditions) -> FlightConditions {
        conditions
    }

    fn pre_aerodynamic_calculation(&self, status: &mut SimulationStatus) -> Option<AerodynamicForces> {
        None
    }

    fn post_aerodynamic_calculation(
        &self,
        status: &mut SimulationStatus,
        forces: AerodynamicForces,
    ) -> AerodynamicForces {
        forces
    }

    fn pre_mass_calculation(&self, status: &mut SimulationStatus) -> Option<RigidBody> {
        None
    }

    fn post_mass_calculation(&self, status: &mut SimulationStatus, mass: RigidBody) -> RigidBody {
        mass
    }

    fn pre_thrust_calculation(&self, status: &mut SimulationStatus) -> Option<f64> {
        None
    }

    fn post_thrust_calculation(&self, status: &mut SimulationStatus, thrust: f64) -> f64 {
        thrust
    }

    fn pre_acceleration_calculation(&self, status: &mut SimulationStatus) -> Option<AccelerationData> {
        None
    }

    fn post_acceleration_calculation(
        &self,
        status: &mut SimulationStatus,
        acceleration: AccelerationData,
    ) -> AccelerationData {
        acceleration
    }
}

fn affected(status: &mut SimulationStatus, listener: &dyn SimulationListener) {
    if !listener.is_system_listener() {
        tracing::debug!(listener = listener.name(), "listener affected the simulation");
        status.add_warning(Warning::ListenersAffected);
    }
}

/// Calls a boundary hook on every listener.
pub(crate) fn fire(status: &mut SimulationStatus, hook: impl Fn(&dyn SimulationListener, &mut SimulationStatus)) {
    let conditions = Arc::clone(status.conditions());
    for listener in conditions.listeners() {
        let generation = status.generation();
        hook(listener.as_ref(), status);
        if status.generation() != generation {
            affected(status, listener.as_ref());
        }
    }
}

/// Calls a gate on every listener until one returns `false`.
pub(crate) fn fire_gate(
    status: &mut SimulationStatus,
    hook: impl Fn(&dyn SimulationListener, &mut SimulationStatus) -> bool,
) -> bool {
    let conditions = Arc::clone(status.conditions());
    for listener in conditions.listeners() {
        let generation = status.generation();
        let proceed = hook(listener.as_ref(), status);
        if status.generation() != generation {
            affected(status, listener.as_ref());
        }
        if !proceed {
            return false;
        }
    }
    true
}

/// First override returned by a pre hook, if any.
pub(crate) fn fire_pre<T>(
    status: &mut SimulationStatus,
    hook: impl Fn(&dyn SimulationListener, &mut SimulationStatus) -> Option<T>,
) -> Option<T> {
    let conditions = Arc::clone(status.conditions());
    for listener in conditions.listeners() {
        let generation = status.generation();
        let result = hook(listener.as_ref(), status);
        if result.is_some() || status.generation() != generation {
            affected(status, listener.as_ref());
        }
        if result.is_some() {
            return result;
        }
    }
    None
}

/// Folds `value` through every post hook.
pub(crate) fn fire_post<T: Copy + PartialEq>(
    status: &mut SimulationStatus,
    mut value: T,
    hook: impl Fn(&dyn SimulationListener, &mut SimulationStatus, T) -> T,
) -> T {
    let conditions = Arc::clone(status.conditions());
    for listener in conditions.listeners() {
        let generation = status.generation();
        let result = hook(listener.as_ref(), status, value);
        if result != value || status.generation() != generation {
            affected(status, listener.as_ref());
        }
        value = result;
    }
    value
}

/// Pre hooks, then the model and the post hooks. An override from a pre
/// hook is returned as is.
pub(crate) fn pipeline<T: Copy + PartialEq>(
    status: &mut SimulationStatus,
    pre: impl Fn(&dyn SimulationListener, &mut SimulationStatus) -> Option<T>,
    model: impl FnOnce(&mut SimulationStatus) -> T,
    post: impl Fn(&dyn SimulationListener, &mut SimulationStatus, T) -> T,
) -> T {
    if let Some(value) = fire_pre(status, pre) {
        return value;
    }
    let value = model(status);
    fire_post(status, value, post)
}
