//! Three-degree-of-freedom Euler integration for drag-dominated descent:
//! a tumbling airframe or a rocket hanging under its recovery devices.

use glam::DVec3;
use skyward_models::{landing_drag_coefficient, tumble_drag_coefficient};
use skyward_types::constants::{EPSILON, MIN_TIME_STEP};
use skyward_types::{AbortCause, SimulationError};

use super::{SimulationStepper, StepperKind};
use crate::flight_data::FlightDataType;
use crate::listener::AccelerationData;
use crate::status::SimulationStatus;

const RECOVERY_TIME_STEP: f64 = 0.5;

/// Which drag coefficient the Euler stepper uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EulerMode {
    /// Airframe and fins broadside to the flow.
    Tumble,
    /// Deployed recovery devices.
    Landing,
}

#[derive(Debug, Clone)]
pub struct EulerStepper {
    mode: EulerMode,
}

impl EulerStepper {
    pub fn new(mode: EulerMode) -> Self {
        Self { mode }
    }

    fn drag_coefficient(&self, status: &SimulationStatus) -> f64 {
        match self.mode {
            EulerMode::Tumble => tumble_drag_coefficient(status.configuration()),
            EulerMode::Landing => landing_drag_coefficient(status.configuration(), status.deployed_devices()),
        }
    }
}

impl SimulationStepper for EulerStepper {
    fn kind(&self) -> StepperKind {
        match self.mode {
            EulerMode::Tumble => StepperKind::Tumble,
            EulerMode::Landing => StepperKind::Landing,
        }
    }

    fn step(&mut self, status: &mut SimulationStatus, max_dt: f64) -> Result<(), SimulationError> {
        status.store_data()?;

        let atmosphere = super::atmospheric_conditions(status);
        let wind = super::wind_velocity(status);
        let mass = super::mass_data(status);
        if mass.mass < EPSILON {
            status.abort_simulation(AbortCause::ZeroMass);
            return Ok(());
        }

        let cd = self.drag_coefficient(status);
        let area = status.configuration().reference_area();
        let airspeed = status.velocity() - wind;
        let k = 0.5 * cd * area * atmosphere.density();
        let drag = -airspeed * airspeed.length() * k;

        let mut gravity = 0.0;
        let mut coriolis = DVec3::ZERO;
        let a = super::acceleration(status, |s| {
            let mut linear = drag / mass.mass;
            gravity = super::gravity(s);
            linear.z -= gravity;
            let conditions = s.conditions();
            coriolis = conditions
                .geodetic
                .coriolis_acceleration(conditions.launch_site.latitude, s.velocity());
            linear += coriolis;
            AccelerationData {
                linear,
                angular: DVec3::ZERO,
            }
        })
        .linear;

        let mut dt = RECOVERY_TIME_STEP.min(RECOVERY_TIME_STEP / a.length());
        if max_dt < dt {
            dt = if max_dt > MIN_TIME_STEP { max_dt - MIN_TIME_STEP } else { max_dt };
        }
        dt = dt.max(MIN_TIME_STEP);

        let p = status.position();
        let v = status.velocity();
        let advance = |dt: f64| (p + v * dt + a * (0.5 * dt * dt), v + a * dt);
        let (mut position, mut velocity) = advance(dt);

        if position.z < 0.0 {
            // Land exactly on the ground: solve ½·a·t² + v·t + z = 0.
            let root = (v.z * v.z - 2.0 * a.z * p.z).max(0.0).sqrt();
            let impact = 2.0 * p.z / (-v.z + root);
            dt = if impact.is_finite() { impact.max(MIN_TIME_STEP) } else { MIN_TIME_STEP };
            (position, velocity) = advance(dt);
            position.z = 0.0;
        } else {
            let mut shortened = None;
            if v.z * velocity.z < 0.0 && a.z.abs() > EPSILON {
                // Stop at the top instead of stepping over it.
                shortened = Some((v.z / a.z).abs());
            } else {
                let speed = airspeed.length();
                if speed > EPSILON {
                    let jerk = -(k / mass.mass) * (a * speed + airspeed * (airspeed.dot(a) / speed));
                    if (a + jerk * dt).z * a.z < -EPSILON && jerk.z.abs() > EPSILON {
                        // Drag and gravity would overshoot their balance.
                        shortened = Some((a.z / jerk.z).abs());
                    }
                }
            }
            if let Some(t) = shortened {
                if t < dt {
                    dt = t.max(MIN_TIME_STEP);
                    (position, velocity) = advance(dt);
                }
            }
        }

        if !(dt >= 0.0) {
            return Err(SimulationError::NegativeTimeStep(dt));
        }
        tracing::trace!(time = status.time(), dt, mode = ?self.mode, "euler step");

        {
            let data = status.flight_data_mut();
            data.set_value(FlightDataType::AccelerationZ, a.z)?;
            data.set_value(FlightDataType::AccelerationXY, a.x.hypot(a.y))?;
            data.set_value(FlightDataType::AccelerationTotal, a.length())?;
            data.set_value(FlightDataType::Gravity, gravity)?;
            data.set_value(FlightDataType::CoriolisAcceleration, coriolis.length())?;
            data.set_value(FlightDataType::WindVelocity, wind.length())?;
            data.set_value(FlightDataType::Mass, mass.mass)?;
            data.set_value(FlightDataType::CgLocation, mass.cg)?;
            data.set_value(FlightDataType::Thrust, 0.0)?;
            data.set_value(FlightDataType::DragCoefficient, cd)?;
            data.set_value(FlightDataType::DragForce, k * airspeed.length_squared())?;
            data.set_value(FlightDataType::Mach, airspeed.length() / atmosphere.speed_of_sound())?;
            data.set_value(FlightDataType::AirTemperature, atmosphere.temperature)?;
            data.set_value(FlightDataType::AirPressure, atmosphere.pressure)?;
            data.set_value(FlightDataType::SpeedOfSound, atmosphere.speed_of_sound())?;
            data.set_value(FlightDataType::TimeStep, dt)?;
        }

        let site = status.conditions().launch_site;
        let geodetic = status.conditions().geodetic;
        status.set_time(status.time() + dt);
        status.set_previous_time_step(dt);
        status.set_position(position);
        status.set_velocity(velocity);
        status.set_world_position(geodetic.add_coordinate(site, position));
        Ok(())
    }

    fn name(&self) -> &str {
        match self.mode {
            EulerMode::Tumble => "Tumble",
            EulerMode::Landing => "Landing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::SimulationOptions;
    use skyward_rocket::{presets, FlightConfiguration};
    use std::sync::Arc;

    fn falling(z: f64, vz: f64) -> SimulationStatus {
        let conditions = Arc::new(SimulationOptions::calm().to_conditions().unwrap());
        let configuration = FlightConfiguration::new(Arc::new(presets::alpha()));
        let mut status = SimulationStatus::new(conditions, configuration, "main");
        status.set_position(DVec3::new(0.0, 0.0, z));
        status.set_velocity(DVec3::new(0.0, 0.0, vz));
        status
    }

    #[test]
    fn ground_hit_lands_exactly_at_zero() {
        for (z, vz) in [(0.3, -12.0), (1.0, -3.0), (0.01, -40.0), (2.5, -0.5)] {
            let mut status = falling(z, vz);
            let mut stepper = EulerStepper::new(EulerMode::Tumble);
            for _ in 0..200 {
                stepper.step(&mut status, f64::INFINITY).unwrap();
                if status.position().z <= 0.0 {
                    break;
                }
            }
            assert_eq!(status.position().z, 0.0, "start z={z} vz={vz}");
        }
    }

    #[test]
    fn stops_at_the_top() {
        let mut status = falling(100.0, 0.3);
        let mut stepper = EulerStepper::new(EulerMode::Tumble);
        stepper.step(&mut status, f64::INFINITY).unwrap();
        assert!(status.velocity().z.abs() < 1e-6, "vz {}", status.velocity().z);
    }

    #[test]
    fn step_caches_the_mass() {
        let mut status = falling(100.0, -5.0);
        EulerStepper::new(EulerMode::Landing).step(&mut status, f64::INFINITY).unwrap();
        let mass = status.mass_snapshot();
        assert!(mass.mass > 0.0);
        assert_eq!(status.flight_data().last(FlightDataType::Mass), mass.mass);
    }

    #[test]
    fn honours_max_dt() {
        let mut status = falling(100.0, -5.0);
        let mut stepper = EulerStepper::new(EulerMode::Landing);
        stepper.step(&mut status, 0.03).unwrap();
        assert!((status.time() - 0.029).abs() < 1e-12);
    }
}
