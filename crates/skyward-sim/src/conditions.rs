//! Simulation options and the immutable per-run conditions built from them.
//!
//! [`SimulationOptions`] is the user-facing, serde-friendly description
//! (angles in degrees). [`SimulationConditions`] is what the engine
//! consumes: launch parameters in SI units plus the shared model objects
//! and the registered listeners.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use skyward_models::{
    AerodynamicCalculator, AtmosphericConditions, AtmosphericModel, BarrowmanAerodynamics, ComponentMassCalculator,
    ConstantAtmosphere, ConstantGravity, ConstantWind, GeodeticComputation, GravityModel, IsaAtmosphere,
    MassCalculator, TurbulentWind, WgsGravity, WindModel, WorldCoordinate,
};
use skyward_types::constants::{MAX_SIMULATION_TIME, RECOMMENDED_ANGLE_STEP, RECOMMENDED_TIME_STEP};
use skyward_types::{SkywardError, SkywardResult};

use crate::listener::SimulationListener;

/// User-facing simulation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    /// RK4 time step (s).
    pub time_step: f64,
    /// Maximum rotation per RK4 step (degrees).
    pub max_angle_step: f64,
    /// Flight time after which the branch ends (s).
    pub max_simulation_time: f64,

    /// Launch rod length (m).
    pub launch_rod_length: f64,
    /// Rod angle from vertical (degrees).
    pub launch_rod_angle: f64,
    /// Compass direction the rod leans towards (degrees, 0 = north, 90 = east).
    pub launch_rod_direction: f64,

    /// Launch site altitude above sea level (m).
    pub launch_altitude: f64,
    /// Launch site latitude (degrees).
    pub launch_latitude: f64,
    /// Launch site longitude (degrees).
    pub launch_longitude: f64,

    /// Average wind speed (m/s).
    pub wind_average: f64,
    /// Turbulence intensity as a fraction of the average speed.
    pub wind_turbulence: f64,
    /// Compass direction the wind blows towards (degrees).
    pub wind_direction: f64,

    pub geodetic: GeodeticComputation,

    /// Use the International Standard Atmosphere. When false, a constant
    /// atmosphere at `temperature`/`pressure` is used.
    pub use_isa: bool,
    /// Sea-level temperature (K).
    pub temperature: f64,
    /// Sea-level pressure (Pa).
    pub pressure: f64,
    /// Latitude-dependent, altitude-dependent gravity.
    pub wgs_gravity: bool,

    pub random_seed: u64,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            time_step: RECOMMENDED_TIME_STEP,
            max_angle_step: RECOMMENDED_ANGLE_STEP.to_degrees(),
            max_simulation_time: MAX_SIMULATION_TIME,
            launch_rod_length: 1.0,
            launch_rod_angle: 0.0,
            launch_rod_direction: 0.0,
            launch_altitude: 0.0,
            launch_latitude: 28.61,
            launch_longitude: -80.6,
            wind_average: 2.0,
            wind_turbulence: 0.1,
            wind_direction: 90.0,
            geodetic: GeodeticComputation::Flat,
            use_isa: true,
            temperature: 288.15,
            pressure: 101_325.0,
            wgs_gravity: false,
            random_seed: 0,
        }
    }
}

impl SimulationOptions {
    /// Coarse steps for quick batch runs.
    pub fn fast() -> Self {
        Self {
            time_step: 0.1,
            max_angle_step: 6.0,
            ..Default::default()
        }
    }

    /// Fine steps and a spherical Earth.
    pub fn precise() -> Self {
        Self {
            time_step: 0.01,
            max_angle_step: 1.0,
            geodetic: GeodeticComputation::Spherical,
            wgs_gravity: true,
            ..Default::default()
        }
    }

    /// Calm air.
    pub fn calm() -> Self {
        Self {
            wind_average: 0.0,
            wind_turbulence: 0.0,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> SkywardResult<()> {
        let invalid = |msg: &str| Err(SkywardError::InvalidConfig(msg.to_string()));
        if !(self.time_step > 0.0) {
            return invalid("time_step must be positive");
        }
        if !(self.max_angle_step > 0.0) {
            return invalid("max_angle_step must be positive");
        }
        if !(self.max_simulation_time > 0.0) {
            return invalid("max_simulation_time must be positive");
        }
        if !(self.launch_rod_length >= 0.0) {
            return invalid("launch_rod_length must not be negative");
        }
        if !(0.0..=90.0).contains(&self.launch_rod_angle) {
            return invalid("launch_rod_angle must be within 0..=90 degrees");
        }
        if !(-90.0..=90.0).contains(&self.launch_latitude) {
            return invalid("launch_latitude must be within -90..=90 degrees");
        }
        if !(self.wind_average >= 0.0) || !(self.wind_turbulence >= 0.0) {
            return invalid("wind speed and turbulence must not be negative");
        }
        if !(self.temperature > 0.0) || !(self.pressure > 0.0) {
            return invalid("temperature and pressure must be positive");
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> SkywardResult<Self> {
        let options: Self = toml::from_str(text).map_err(|e| SkywardError::InvalidConfig(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn to_toml_string(&self) -> SkywardResult<String> {
        toml::to_string_pretty(self).map_err(|e| SkywardError::Serialization(e.to_string()))
    }

    /// Validates the options and builds the models they describe.
    pub fn to_conditions(&self) -> SkywardResult<SimulationConditions> {
        self.validate()?;
        let latitude = self.launch_latitude.to_radians();
        let direction = self.wind_direction.to_radians();

        let atmosphere: Arc<dyn AtmosphericModel> = if self.use_isa {
            Arc::new(IsaAtmosphere::with_sea_level(self.temperature, self.pressure))
        } else {
            Arc::new(ConstantAtmosphere::new(AtmosphericConditions::new(
                self.temperature,
                self.pressure,
            )))
        };
        let wind: Arc<dyn WindModel> = if self.wind_turbulence > 0.0 && self.wind_average > 0.0 {
            Arc::new(TurbulentWind::new(
                self.wind_average,
                self.wind_turbulence,
                direction,
                self.random_seed,
            ))
        } else {
            Arc::new(ConstantWind::from_speed_direction(self.wind_average, direction))
        };
        let gravity: Arc<dyn GravityModel> = if self.wgs_gravity {
            Arc::new(WgsGravity::new(latitude))
        } else {
            Arc::new(ConstantGravity::default())
        };

        Ok(SimulationConditions {
            time_step: self.time_step,
            max_angle_step: self.max_angle_step.to_radians(),
            max_simulation_time: self.max_simulation_time,
            launch_rod_length: self.launch_rod_length,
            launch_rod_angle: self.launch_rod_angle.to_radians(),
            launch_rod_direction: self.launch_rod_direction.to_radians(),
            launch_site: WorldCoordinate::new(latitude, self.launch_longitude.to_radians(), self.launch_altitude),
            geodetic: self.geodetic,
            random_seed: self.random_seed,
            atmosphere,
            wind,
            gravity,
            aerodynamics: Arc::new(BarrowmanAerodynamics::new()),
            mass: Arc::new(ComponentMassCalculator::new()),
            listeners: Vec::new(),
        })
    }
}

/// Immutable inputs of one simulation run, shared by every branch.
///
/// Angles are in radians. Models and listeners are reference-counted so
/// cloning is cheap and independent runs can share them across threads.
#[derive(Clone)]
pub struct SimulationConditions {
    pub time_step: f64,
    pub max_angle_step: f64,
    pub max_simulation_time: f64,
    pub launch_rod_length: f64,
    /// Angle of the rod from vertical.
    pub launch_rod_angle: f64,
    /// Compass direction of the rod lean (0 = north, π/2 = east).
    pub launch_rod_direction: f64,
    pub launch_site: WorldCoordinate,
    pub geodetic: GeodeticComputation,
    pub random_seed: u64,
    pub atmosphere: Arc<dyn AtmosphericModel>,
    pub wind: Arc<dyn WindModel>,
    pub gravity: Arc<dyn GravityModel>,
    pub aerodynamics: Arc<dyn AerodynamicCalculator>,
    pub mass: Arc<dyn MassCalculator>,
    listeners: Vec<Arc<dyn SimulationListener>>,
}

impl SimulationConditions {
    /// Registers a listener. Listeners are called in registration order.
    pub fn add_listener(&mut self, listener: Arc<dyn SimulationListener>) {
        self.listeners.push(listener);
    }

    pub fn listeners(&self) -> &[Arc<dyn SimulationListener>] {
        &self.listeners
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }
}

impl fmt::Debug for SimulationConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationConditions")
            .field("time_step", &self.time_step)
            .field("max_angle_step", &self.max_angle_step)
            .field("max_simulation_time", &self.max_simulation_time)
            .field("launch_rod_length", &self.launch_rod_length)
            .field("launch_rod_angle", &self.launch_rod_angle)
            .field("launch_rod_direction", &self.launch_rod_direction)
            .field("launch_site", &self.launch_site)
            .field("geodetic", &self.geodetic)
            .field("random_seed", &self.random_seed)
            .field("atmosphere", &self.atmosphere)
            .field("wind", &self.wind)
            .field("gravity", &self.gravity)
            .field("aerodynamics", &self.aerodynamics)
            .field("mass", &self.mass)
            .field("listeners", &self.listeners.iter().map(|l| l.name()).collect::<Vec<_>>())
            .finish()
    }
}
