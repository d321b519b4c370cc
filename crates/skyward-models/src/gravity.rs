//! Gravity models.

use std::fmt::Debug;

use skyward_types::constants::{EARTH_RADIUS, STANDARD_GRAVITY};

/// Magnitude of gravitational acceleration (m/s², positive downward).
pub trait GravityModel: Send + Sync + Debug {
    fn gravity_at(&self, altitude: f64) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantGravity {
    pub g: f64,
}

impl ConstantGravity {
    pub fn new(g: f64) -> Self {
        Self { g }
    }
}

impl Default for ConstantGravity {
    fn default() -> Self {
        Self::new(STANDARD_GRAVITY)
    }
}

impl GravityModel for ConstantGravity {
    fn gravity_at(&self, _altitude: f64) -> f64 {
        self.g
    }
}

/// WGS84 normal gravity at the launch latitude, falling off with the
/// inverse square of the distance from the Earth's centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WgsGravity {
    surface: f64,
}

impl WgsGravity {
    /// `latitude` in radians.
    pub fn new(latitude: f64) -> Self {
        let sin2 = latitude.sin().powi(2);
        let surface = 9.780_326_771_4 * (1.0 + 0.001_931_851_386_39 * sin2)
            / (1.0 - 0.006_694_379_990_13 * sin2).sqrt();
        Self { surface }
    }

    pub fn surface_gravity(&self) -> f64 {
        self.surface
    }
}

impl GravityModel for WgsGravity {
    fn gravity_at(&self, altitude: f64) -> f64 {
        let ratio = EARTH_RADIUS / (EARTH_RADIUS + altitude);
        self.surface * ratio * ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wgs_equator_and_pole() {
        assert!((WgsGravity::new(0.0).surface_gravity() - 9.7803).abs() < 1e-3);
        let pole = WgsGravity::new(std::f64::consts::FRAC_PI_2).surface_gravity();
        assert!((pole - 9.8322).abs() < 1e-3);
    }

    #[test]
    fn gravity_decreases_with_altitude() {
        let g = WgsGravity::new(0.5);
        assert!(g.gravity_at(10_000.0) < g.gravity_at(0.0));
    }
}
