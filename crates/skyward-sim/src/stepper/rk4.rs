//! Fourth-order Runge–Kutta integration of translational and rotational
//! motion for powered and coasting aerodynamic flight.

use glam::{DQuat, DVec3};
use rand::Rng;
use skyward_models::{AerodynamicForces, AtmosphericConditions, FlightConditions, RigidBody};
use skyward_types::constants::EPSILON;
use skyward_types::{AbortCause, SimulationError, WarningSet};

use super::{SimulationStepper, StepperKind};
use crate::flight_data::FlightDataType;
use crate::listener::AccelerationData;
use crate::status::SimulationStatus;

const MAX_ROLL_STEP_ANGLE: f64 = 2.0 * 28.32 * std::f64::consts::PI / 180.0;
const MAX_ROLL_RATE_CHANGE: f64 = 2.0 * std::f64::consts::PI / 180.0;
const MAX_PITCH_YAW_CHANGE: f64 = 4.0 * std::f64::consts::PI / 180.0;
const PERTURBATION: f64 = 0.0005;
const MAX_MAGNITUDE_SQUARED: f64 = 1.0e18;

/// Values computed while evaluating the first Runge–Kutta stage, written
/// to the flight data once the step size is known.
#[derive(Debug, Clone, Default)]
pub(crate) struct DataStore {
    pub atmosphere: Option<AtmosphericConditions>,
    pub wind: DVec3,
    pub gravity: f64,
    pub coriolis: DVec3,
    pub mass: Option<RigidBody>,
    pub motor_mass: f64,
    pub thrust: f64,
    pub drag_force: f64,
    pub conditions: Option<FlightConditions>,
    pub forces: AerodynamicForces,
    pub acceleration: AccelerationData,
    pub time_step: f64,
}

impl DataStore {
    fn write(&self, status: &mut SimulationStatus) -> Result<(), SimulationError> {
        let cleared = status.is_launch_rod_cleared();
        let reference_length = status.configuration().reference_length();
        let body_length = status.configuration().length_aerodynamic();
        let data = status.flight_data_mut();
        let a = self.acceleration.linear;

        data.set_value(FlightDataType::AccelerationZ, a.z)?;
        data.set_value(FlightDataType::AccelerationXY, a.x.hypot(a.y))?;
        data.set_value(FlightDataType::AccelerationTotal, a.length())?;
        data.set_value(FlightDataType::Gravity, self.gravity)?;
        data.set_value(FlightDataType::CoriolisAcceleration, self.coriolis.length())?;
        data.set_value(FlightDataType::WindVelocity, self.wind.length())?;

        if let Some(mass) = &self.mass {
            data.set_value(FlightDataType::Mass, mass.mass)?;
            data.set_value(FlightDataType::MotorMass, self.motor_mass)?;
            data.set_value(FlightDataType::LongitudinalInertia, mass.longitudinal_inertia)?;
            data.set_value(FlightDataType::RotationalInertia, mass.rotational_inertia)?;
            data.set_value(FlightDataType::CgLocation, mass.cg)?;
            if cleared && self.forces.cn_alpha > EPSILON {
                data.set_value(FlightDataType::CpLocation, self.forces.cp)?;
                if reference_length > EPSILON {
                    data.set_value(FlightDataType::Stability, (self.forces.cp - mass.cg) / reference_length)?;
                }
            }
        }

        data.set_value(FlightDataType::Thrust, self.thrust)?;
        data.set_value(FlightDataType::DragForce, self.drag_force)?;
        data.set_value(FlightDataType::DragCoefficient, self.forces.cd)?;
        data.set_value(FlightDataType::AxialDragCoefficient, self.forces.cd_axial)?;
        data.set_value(FlightDataType::FrictionDragCoefficient, self.forces.friction_cd)?;
        data.set_value(FlightDataType::PressureDragCoefficient, self.forces.pressure_cd)?;
        data.set_value(FlightDataType::BaseDragCoefficient, self.forces.base_cd)?;
        data.set_value(FlightDataType::NormalForceCoefficient, self.forces.cn)?;
        data.set_value(FlightDataType::PitchMomentCoefficient, self.forces.cm)?;
        data.set_value(FlightDataType::YawMomentCoefficient, self.forces.cyaw)?;
        data.set_value(FlightDataType::SideForceCoefficient, self.forces.cside)?;
        data.set_value(FlightDataType::RollMomentCoefficient, self.forces.croll)?;
        data.set_value(FlightDataType::PitchDampingCoefficient, self.forces.pitch_damping_moment)?;
        data.set_value(FlightDataType::YawDampingCoefficient, self.forces.yaw_damping_moment)?;

        if let Some(fc) = &self.conditions {
            data.set_value(FlightDataType::AngleOfAttack, fc.aoa)?;
            data.set_value(FlightDataType::RollRate, fc.roll_rate)?;
            data.set_value(FlightDataType::PitchRate, fc.pitch_rate)?;
            data.set_value(FlightDataType::YawRate, fc.yaw_rate)?;
            data.set_value(FlightDataType::Mach, fc.mach)?;
            data.set_value(FlightDataType::ReferenceLength, fc.reference_length)?;
            data.set_value(FlightDataType::ReferenceArea, fc.reference_area)?;
            let viscosity = fc.atmosphere.kinematic_viscosity();
            if viscosity > 0.0 {
                data.set_value(
                    FlightDataType::ReynoldsNumber,
                    fc.velocity * body_length / viscosity,
                )?;
            }
        }
        if let Some(atmosphere) = &self.atmosphere {
            data.set_value(FlightDataType::AirTemperature, atmosphere.temperature)?;
            data.set_value(FlightDataType::AirPressure, atmosphere.pressure)?;
            data.set_value(FlightDataType::SpeedOfSound, atmosphere.speed_of_sound())?;
        }
        data.set_value(FlightDataType::TimeStep, self.time_step)?;
        Ok(())
    }
}

/// Derivatives of the state at one Runge–Kutta stage.
#[derive(Debug, Clone, Copy)]
struct Stage {
    velocity: DVec3,
    acceleration: DVec3,
    angular_velocity: DVec3,
    angular_acceleration: DVec3,
}

/// Kinematic state at the start of a step.
#[derive(Debug, Clone, Copy)]
struct Origin {
    time: f64,
    position: DVec3,
    velocity: DVec3,
    orientation: DQuat,
    angular_velocity: DVec3,
}

impl Origin {
    fn capture(status: &SimulationStatus) -> Self {
        Self {
            time: status.time(),
            position: status.position(),
            velocity: status.velocity(),
            orientation: status.orientation(),
            angular_velocity: status.angular_velocity(),
        }
    }

    /// Moves `status` to this origin advanced by `dt` along `stage`.
    fn advance(&self, status: &mut SimulationStatus, stage: &Stage, dt: f64) {
        status.set_time(self.time + dt);
        status.set_position(self.position + stage.velocity * dt);
        status.set_velocity(self.velocity + stage.acceleration * dt);
        status.set_orientation((DQuat::from_scaled_axis(stage.angular_velocity * dt) * self.orientation).normalize());
        status.set_angular_velocity(self.angular_velocity + stage.angular_acceleration * dt);
    }
}

/// Classic RK4 stepper with adaptive step size.
#[derive(Debug, Clone)]
pub struct Rk4Stepper {
    previous_step: f64,
}

impl Rk4Stepper {
    pub fn new() -> Self {
        Self {
            previous_step: f64::INFINITY,
        }
    }

    fn flight_conditions(status: &mut SimulationStatus, store: &mut DataStore) -> FlightConditions {
        let atmosphere = super::atmospheric_conditions(status);
        let wind = super::wind_velocity(status);
        store.atmosphere = Some(atmosphere);
        store.wind = wind;

        super::flight_conditions(status, |s| {
            let configuration = s.configuration();
            let mut fc = FlightConditions::new(configuration.reference_length(), configuration.reference_area());
            fc.atmosphere = atmosphere;

            let inverse = s.orientation().inverse();
            let airspeed = inverse * (s.velocity() - wind);
            let speed = airspeed.length();
            fc.velocity = speed;
            fc.mach = speed / atmosphere.speed_of_sound();
            if speed > EPSILON {
                fc.aoa = (airspeed.z / speed).clamp(-1.0, 1.0).acos();
            }
            if airspeed.x.hypot(airspeed.y) > EPSILON {
                fc.theta = airspeed.y.atan2(airspeed.x);
            }

            let rates = DQuat::from_rotation_z(-fc.theta) * (inverse * s.angular_velocity());
            fc.roll_rate = rates.z;
            fc.pitch_rate = rates.y;
            fc.yaw_rate = -rates.x;
            fc
        })
    }

    /// Accelerations at the current state of `status`, through the listener
    /// pipeline.
    fn calculate_acceleration(
        status: &mut SimulationStatus,
        store: &mut DataStore,
        warnings: &mut WarningSet,
    ) -> AccelerationData {
        let acceleration = super::acceleration(status, |s| Self::model_acceleration(s, store, warnings));
        store.acceleration = acceleration;
        acceleration
    }

    /// Accelerations from thrust, mass, aerodynamics, gravity and the
    /// Coriolis effect.
    fn model_acceleration(
        status: &mut SimulationStatus,
        store: &mut DataStore,
        warnings: &mut WarningSet,
    ) -> AccelerationData {
        store.thrust = super::thrust(status);
        let mass = super::mass_data(status);
        store.mass = Some(mass);
        store.motor_mass = status
            .conditions()
            .mass
            .motor_mass(status.configuration(), status.motors(), status.time())
            .mass;

        let fc = Self::flight_conditions(status, store);
        let mut forces = super::aerodynamic_forces(status, &fc, warnings);
        let rod_cleared = status.is_launch_rod_cleared();
        if rod_cleared {
            let rng = status.rng();
            forces.cm += rng.gen_range(-PERTURBATION..PERTURBATION);
            forces.cyaw += rng.gen_range(-PERTURBATION..PERTURBATION);
        }

        let dynamic_pressure = fc.dynamic_pressure();
        let area = fc.reference_area;
        let length = fc.reference_length.max(EPSILON);
        let normal_force = forces.cn * dynamic_pressure * area;
        let side_force = forces.cside * dynamic_pressure * area;
        let axial_drag = forces.cd_axial * dynamic_pressure * area;
        store.drag_force = forces.cd * dynamic_pressure * area;

        let theta = DQuat::from_rotation_z(fc.theta);
        let orientation = status.orientation();
        let body = theta
            * DVec3::new(
                -normal_force / mass.mass,
                -side_force / mass.mass,
                (store.thrust - axial_drag) / mass.mass,
            );
        let mut linear = orientation * body;

        store.gravity = super::gravity(status);
        linear.z -= store.gravity;

        let conditions = status.conditions();
        store.coriolis = conditions
            .geodetic
            .coriolis_acceleration(conditions.launch_site.latitude, status.velocity());
        linear += store.coriolis;

        let angular = if rod_cleared {
            let cm_cg = forces.cm - forces.cn * mass.cg / length;
            let cyaw_cg = forces.cyaw - forces.cside * mass.cg / length;
            let moment = dynamic_pressure * area * length;
            let longitudinal = mass.longitudinal_inertia.max(EPSILON);
            let rotational = mass.rotational_inertia.max(EPSILON);
            let body = DVec3::new(
                -cyaw_cg * moment / longitudinal,
                cm_cg * moment / longitudinal,
                forces.croll * moment / rotational,
            );
            orientation * (theta * body)
        } else {
            let rod = status.launch_rod_direction();
            linear = rod * linear.dot(rod);
            DVec3::ZERO
        };

        if !status.is_liftoff() && linear.z < 0.0 {
            linear = DVec3::ZERO;
        }

        store.conditions = Some(fc);
        store.forces = forces;
        AccelerationData { linear, angular }
    }

    fn stage(status: &mut SimulationStatus, store: &mut DataStore, warnings: &mut WarningSet) -> Stage {
        let acceleration = Self::calculate_acceleration(status, store, warnings);
        Stage {
            velocity: status.velocity(),
            acceleration: acceleration.linear,
            angular_velocity: status.angular_velocity(),
            angular_acceleration: acceleration.angular,
        }
    }

    fn time_step(&self, status: &SimulationStatus, store: &DataStore, max_dt: f64) -> f64 {
        let conditions = status.conditions();
        let base = if status.is_launch_rod_cleared() {
            conditions.time_step
        } else {
            conditions.time_step / 5.0
        };
        let mut dt = base.min(max_dt);

        if let Some(fc) = &store.conditions {
            dt = dt.min(conditions.max_angle_step / fc.pitch_rate.hypot(fc.yaw_rate));
            dt = dt.min((MAX_ROLL_STEP_ANGLE / fc.roll_rate).abs());
        }
        let body = status.orientation().inverse() * store.acceleration.angular;
        dt = dt.min((MAX_ROLL_RATE_CHANGE / body.z).abs());
        dt = dt.min((MAX_PITCH_YAW_CHANGE / body.x.abs().max(body.y.abs())).abs());
        if !status.is_launch_rod_cleared() {
            let speed = status.velocity().length();
            if speed > EPSILON {
                dt = dt.min(conditions.launch_rod_length / speed / 10.0);
            }
        }
        dt = dt.min(1.5 * self.previous_step);

        let min_step = conditions.time_step / 20.0;
        if max_dt - dt < min_step {
            dt = max_dt;
        }
        dt.max(min_step)
    }
}

impl Default for Rk4Stepper {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationStepper for Rk4Stepper {
    fn kind(&self) -> StepperKind {
        StepperKind::Rk4
    }

    fn initialize(&mut self, _status: &mut SimulationStatus) -> Result<(), SimulationError> {
        self.previous_step = f64::INFINITY;
        Ok(())
    }

    fn step(&mut self, status: &mut SimulationStatus, max_dt: f64) -> Result<(), SimulationError> {
        status.store_data()?;

        let origin = Origin::capture(status);
        let mut store = DataStore::default();
        let mut warnings = WarningSet::new();
        let k1 = Self::stage(status, &mut store, &mut warnings);
        if store.mass.is_some_and(|mass| mass.mass < EPSILON) {
            status.abort_simulation(AbortCause::ZeroMass);
            return Ok(());
        }
        status.record_warnings(&warnings);

        let dt = self.time_step(status, &store, max_dt);
        if !(dt >= 0.0) {
            return Err(SimulationError::NegativeTimeStep(dt));
        }
        tracing::trace!(time = origin.time, dt, "rk4 step");
        store.time_step = dt;
        store.write(status)?;

        let mut scratch = DataStore::default();
        let mut ignored = WarningSet::new();
        origin.advance(status, &k1, dt / 2.0);
        let k2 = Self::stage(status, &mut scratch, &mut ignored);
        origin.advance(status, &k2, dt / 2.0);
        let k3 = Self::stage(status, &mut scratch, &mut ignored);
        origin.advance(status, &k3, dt);
        let k4 = Self::stage(status, &mut scratch, &mut ignored);

        let weighted = |f: fn(&Stage) -> DVec3| (f(&k1) + 2.0 * f(&k2) + 2.0 * f(&k3) + f(&k4)) * (dt / 6.0);
        let position = origin.position + weighted(|k| k.velocity);
        let velocity = origin.velocity + weighted(|k| k.acceleration);
        let rotation = weighted(|k| k.angular_velocity);
        let angular_velocity = origin.angular_velocity + weighted(|k| k.angular_acceleration);

        if position.length_squared() > MAX_MAGNITUDE_SQUARED
            || velocity.length_squared() > MAX_MAGNITUDE_SQUARED
            || angular_velocity.length_squared() > MAX_MAGNITUDE_SQUARED
        {
            return Err(SimulationError::ValuesTooLarge);
        }

        status.set_time(origin.time + dt);
        status.set_previous_time_step(dt);
        status.set_position(position);
        status.set_velocity(velocity);
        status.set_orientation((DQuat::from_scaled_axis(rotation) * origin.orientation).normalize());
        status.set_angular_velocity(angular_velocity);
        let site = status.conditions().launch_site;
        let geodetic = status.conditions().geodetic;
        status.set_world_position(geodetic.add_coordinate(site, position));
        self.previous_step = dt;
        Ok(())
    }

    fn name(&self) -> &str {
        "RK4"
    }
}
