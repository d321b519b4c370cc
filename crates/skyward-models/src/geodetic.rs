//! World coordinates and Earth-rotation effects.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use skyward_types::constants::{EARTH_ANGULAR_VELOCITY, EARTH_RADIUS};

/// Geodetic position. Angles in radians, altitude in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl WorldCoordinate {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

/// How local displacements map to the globe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeodeticComputation {
    /// Flat Earth, no Coriolis effect.
    #[default]
    Flat,
    /// Spherical Earth with Coriolis acceleration.
    Spherical,
}

impl GeodeticComputation {
    /// Coriolis acceleration `-2·Ω×v` for a velocity in the local
    /// east-north-up frame at `latitude`.
    pub fn coriolis_acceleration(self, latitude: f64, velocity: DVec3) -> DVec3 {
        match self {
            GeodeticComputation::Flat => DVec3::ZERO,
            GeodeticComputation::Spherical => {
                let omega = DVec3::new(0.0, latitude.cos(), latitude.sin()) * EARTH_ANGULAR_VELOCITY;
                -2.0 * omega.cross(velocity)
            }
        }
    }

    /// World position of a point displaced by `delta` (east, north, up)
    /// from `origin`.
    pub fn add_coordinate(self, origin: WorldCoordinate, delta: DVec3) -> WorldCoordinate {
        let radius = match self {
            GeodeticComputation::Flat => EARTH_RADIUS,
            GeodeticComputation::Spherical => EARTH_RADIUS + origin.altitude,
        };
        let latitude = origin.latitude + delta.y / radius;
        let cos_lat = origin.latitude.cos().max(1e-9);
        let longitude = origin.longitude + delta.x / (radius * cos_lat);
        WorldCoordinate::new(latitude, longitude, origin.altitude + delta.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_has_no_coriolis() {
        let a = GeodeticComputation::Flat.coriolis_acceleration(0.7, DVec3::new(10.0, 20.0, 30.0));
        assert_eq!(a, DVec3::ZERO);
    }

    #[test]
    fn rising_body_drifts_west() {
        let a = GeodeticComputation::Spherical.coriolis_acceleration(0.0, DVec3::new(0.0, 0.0, 100.0));
        assert!(a.x < 0.0);
        assert!(a.y.abs() < 1e-12);
    }
}
