//! Mass and inertia.
//!
//! Positions follow the aerodynamic convention: metres aft of the front of
//! the topmost active stage.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use skyward_rocket::{FlightConfiguration, MotorState};
use skyward_types::constants::EPSILON;

/// Lumped mass properties of a body.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RigidBody {
    /// kg
    pub mass: f64,
    /// Axial CG position (m).
    pub cg: f64,
    /// Pitch/yaw moment of inertia about the CG (kg·m²).
    pub longitudinal_inertia: f64,
    /// Roll moment of inertia (kg·m²).
    pub rotational_inertia: f64,
}

impl RigidBody {
    pub const EMPTY: RigidBody = RigidBody {
        mass: 0.0,
        cg: 0.0,
        longitudinal_inertia: 0.0,
        rotational_inertia: 0.0,
    };

    pub fn new(mass: f64, cg: f64, longitudinal_inertia: f64, rotational_inertia: f64) -> Self {
        Self {
            mass,
            cg,
            longitudinal_inertia,
            rotational_inertia,
        }
    }

    /// A slender cylinder of `length` and `radius` centred at `cg`.
    pub fn cylinder(mass: f64, cg: f64, length: f64, radius: f64) -> Self {
        Self::new(
            mass,
            cg,
            mass * (3.0 * radius * radius + length * length) / 12.0,
            0.5 * mass * radius * radius,
        )
    }

    /// Combination of two bodies (parallel-axis theorem).
    pub fn add(&self, other: &RigidBody) -> RigidBody {
        let mass = self.mass + other.mass;
        if mass <= EPSILON {
            return RigidBody::EMPTY;
        }
        let cg = (self.mass * self.cg + other.mass * other.cg) / mass;
        let d1 = self.cg - cg;
        let d2 = other.cg - cg;
        RigidBody {
            mass,
            cg,
            longitudinal_inertia: self.longitudinal_inertia
                + self.mass * d1 * d1
                + other.longitudinal_inertia
                + other.mass * d2 * d2,
            rotational_inertia: self.rotational_inertia + other.rotational_inertia,
        }
    }
}

/// Mass properties of the active configuration.
pub trait MassCalculator: Send + Sync + Debug {
    /// Structure without motors.
    fn structure_mass(&self, configuration: &FlightConfiguration) -> RigidBody;

    /// Motors in active stages at simulation `time`.
    fn motor_mass(&self, configuration: &FlightConfiguration, motors: &[MotorState], time: f64) -> RigidBody;

    fn mass_data(&self, configuration: &FlightConfiguration, motors: &[MotorState], time: f64) -> RigidBody {
        self.structure_mass(configuration)
            .add(&self.motor_mass(configuration, motors, time))
    }
}

/// Sums stage dry masses, recovery devices and motors as cylinders and
/// point masses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentMassCalculator;

impl ComponentMassCalculator {
    pub fn new() -> Self {
        Self
    }
}

impl MassCalculator for ComponentMassCalculator {
    fn structure_mass(&self, configuration: &FlightConfiguration) -> RigidBody {
        let rocket = configuration.rocket();
        let front = configuration.front_position();
        let mut body = RigidBody::EMPTY;
        for (n, stage) in configuration.active_stage_iter() {
            let offset = rocket.stage_offset(n) - front;
            body = body.add(&RigidBody::cylinder(
                stage.dry_mass,
                offset + stage.dry_cg,
                stage.length,
                0.5 * stage.diameter,
            ));
            for device in &stage.recovery {
                body = body.add(&RigidBody::new(device.mass, offset + device.position, 0.0, 0.0));
            }
        }
        body
    }

    fn motor_mass(&self, configuration: &FlightConfiguration, motors: &[MotorState], time: f64) -> RigidBody {
        let rocket = configuration.rocket();
        let front = configuration.front_position();
        let mut body = RigidBody::EMPTY;
        for state in motors {
            let key = state.key();
            if !configuration.is_stage_active(key.stage) {
                continue;
            }
            let Some(mount) = rocket.motor_mount(key) else {
                continue;
            };
            let offset = rocket.stage_offset(key.stage) - front;
            body = body.add(&RigidBody::cylinder(
                state.mass_at(&mount.motor, time),
                offset + mount.cg(),
                mount.motor.length,
                0.5 * mount.motor.diameter,
            ));
        }
        body
    }
}
