//! Wind models. Velocities are in the launch-site frame (x east, y north, z up).

use std::f64::consts::TAU;
use std::fmt::Debug;

use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Wind velocity as a function of time and altitude.
pub trait WindModel: Send + Sync + Debug {
    fn velocity_at(&self, time: f64, altitude: f64) -> DVec3;
}

/// Horizontal vector for a wind of `speed` blowing toward the compass
/// `direction` (radians clockwise from north).
pub fn horizontal(speed: f64, direction: f64) -> DVec3 {
    DVec3::new(speed * direction.sin(), speed * direction.cos(), 0.0)
}

/// Steady wind.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstantWind {
    pub velocity: DVec3,
}

impl ConstantWind {
    pub fn new(velocity: DVec3) -> Self {
        Self { velocity }
    }

    pub fn calm() -> Self {
        Self::default()
    }

    pub fn from_speed_direction(speed: f64, direction: f64) -> Self {
        Self::new(horizontal(speed, direction))
    }
}

impl WindModel for ConstantWind {
    fn velocity_at(&self, _time: f64, _altitude: f64) -> DVec3 {
        self.velocity
    }
}

const GUST_COMPONENTS: usize = 8;

/// Average wind plus a smooth, seeded gust signal.
///
/// The gust is a sum of sinusoids with log-spaced frequencies and a pink
/// spectrum, scaled so its standard deviation equals `turbulence × average`.
/// The same seed always produces the same signal.
#[derive(Debug, Clone)]
pub struct TurbulentWind {
    average: f64,
    direction: f64,
    components: Vec<(f64, f64, f64)>,
}

impl TurbulentWind {
    pub fn new(average: f64, turbulence_intensity: f64, direction: f64, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut components = Vec::with_capacity(GUST_COMPONENTS);
        let (f_low, f_high) = (0.05_f64, 2.0_f64);
        for i in 0..GUST_COMPONENTS {
            let frac = i as f64 / (GUST_COMPONENTS - 1) as f64;
            let frequency = f_low * (f_high / f_low).powf(frac);
            let amplitude = frequency.powf(-0.5);
            let phase = rng.gen_range(0.0..TAU);
            components.push((amplitude, frequency, phase));
        }
        let variance: f64 = components.iter().map(|(a, _, _)| 0.5 * a * a).sum();
        let scale = if variance > 0.0 {
            turbulence_intensity * average / variance.sqrt()
        } else {
            0.0
        };
        for component in &mut components {
            component.0 *= scale;
        }
        Self {
            average,
            direction,
            components,
        }
    }

    /// Wind speed along the mean direction at `time`, never negative.
    pub fn speed_at(&self, time: f64) -> f64 {
        let gust: f64 = self
            .components
            .iter()
            .map(|(a, f, phase)| a * (TAU * f * time + phase).sin())
            .sum();
        (self.average + gust).max(0.0)
    }
}

impl WindModel for TurbulentWind {
    fn velocity_at(&self, time: f64, _altitude: f64) -> DVec3 {
        horizontal(self.speed_at(time), self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_wind() {
        let a = TurbulentWind::new(5.0, 0.2, 0.0, 7);
        let b = TurbulentWind::new(5.0, 0.2, 0.0, 7);
        for i in 0..50 {
            let t = i as f64 * 0.37;
            assert_eq!(a.velocity_at(t, 0.0), b.velocity_at(t, 0.0));
        }
    }

    #[test]
    fn turbulence_averages_out() {
        let wind = TurbulentWind::new(4.0, 0.1, 0.0, 3);
        let n = 20_000;
        let mean: f64 = (0..n).map(|i| wind.speed_at(i as f64 * 0.05)).sum::<f64>() / n as f64;
        assert!((mean - 4.0).abs() < 0.2, "mean {mean}");
    }

    #[test]
    fn north_wind_points_along_y() {
        let v = ConstantWind::from_speed_direction(3.0, 0.0).velocity_at(0.0, 0.0);
        assert!(v.x.abs() < 1e-12);
        assert!((v.y - 3.0).abs() < 1e-12);
    }
}
