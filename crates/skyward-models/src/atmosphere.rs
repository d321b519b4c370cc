//! Atmospheric models.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// Specific gas constant of dry air (J/(kg·K)).
pub const GAS_CONSTANT: f64 = 287.053;
/// Ratio of specific heats of air.
pub const GAMMA: f64 = 1.4;

/// Temperature and pressure at a point; everything else is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmosphericConditions {
    /// Kelvin.
    pub temperature: f64,
    /// Pascal.
    pub pressure: f64,
}

impl AtmosphericConditions {
    pub fn new(temperature: f64, pressure: f64) -> Self {
        Self { temperature, pressure }
    }

    /// Air density (kg/m³).
    pub fn density(&self) -> f64 {
        self.pressure / (GAS_CONSTANT * self.temperature)
    }

    /// Speed of sound (m/s).
    pub fn speed_of_sound(&self) -> f64 {
        (GAMMA * GAS_CONSTANT * self.temperature).sqrt()
    }

    /// Dynamic viscosity from Sutherland's law (Pa·s).
    pub fn dynamic_viscosity(&self) -> f64 {
        1.458e-6 * self.temperature.powf(1.5) / (self.temperature + 110.4)
    }

    /// Kinematic viscosity (m²/s).
    pub fn kinematic_viscosity(&self) -> f64 {
        self.dynamic_viscosity() / self.density()
    }
}

impl Default for AtmosphericConditions {
    fn default() -> Self {
        Self::new(288.15, 101_325.0)
    }
}

/// Atmospheric conditions as a function of altitude above sea level.
pub trait AtmosphericModel: Send + Sync + Debug {
    fn conditions_at(&self, altitude: f64) -> AtmosphericConditions;
}

/// Same conditions at every altitude.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstantAtmosphere {
    pub conditions: AtmosphericConditions,
}

impl ConstantAtmosphere {
    pub fn new(conditions: AtmosphericConditions) -> Self {
        Self { conditions }
    }
}

impl AtmosphericModel for ConstantAtmosphere {
    fn conditions_at(&self, _altitude: f64) -> AtmosphericConditions {
        self.conditions
    }
}

#[derive(Debug, Clone, Copy)]
struct Layer {
    base_altitude: f64,
    base_temperature: f64,
    base_pressure: f64,
    lapse_rate: f64,
}

/// (base altitude m, lapse rate K/m) of the standard layers.
const ISA_LAYERS: [(f64, f64); 8] = [
    (0.0, -0.0065),
    (11_000.0, 0.0),
    (20_000.0, 0.001),
    (32_000.0, 0.0028),
    (47_000.0, 0.0),
    (51_000.0, -0.0028),
    (71_000.0, -0.002),
    (84_852.0, 0.0),
];

/// International Standard Atmosphere, optionally shifted to custom
/// sea-level temperature and pressure.
#[derive(Debug, Clone)]
pub struct IsaAtmosphere {
    layers: Vec<Layer>,
}

impl IsaAtmosphere {
    pub fn new() -> Self {
        let standard = AtmosphericConditions::default();
        Self::with_sea_level(standard.temperature, standard.pressure)
    }

    /// Layers rebuilt from the given sea-level conditions.
    pub fn with_sea_level(temperature: f64, pressure: f64) -> Self {
        let g = skyward_types::constants::STANDARD_GRAVITY;
        let mut layers = Vec::with_capacity(ISA_LAYERS.len());
        let (mut t, mut p) = (temperature, pressure);
        for (i, &(base, lapse)) in ISA_LAYERS.iter().enumerate() {
            layers.push(Layer {
                base_altitude: base,
                base_temperature: t,
                base_pressure: p,
                lapse_rate: lapse,
            });
            if let Some(&(next, _)) = ISA_LAYERS.get(i + 1) {
                let dh = next - base;
                let t_next = t + lapse * dh;
                p = layer_pressure(p, t, t_next, lapse, dh, g);
                t = t_next;
            }
        }
        Self { layers }
    }
}

fn layer_pressure(p0: f64, t0: f64, t1: f64, lapse: f64, dh: f64, g: f64) -> f64 {
    if lapse.abs() < 1e-12 {
        p0 * (-g * dh / (GAS_CONSTANT * t0)).exp()
    } else {
        p0 * (t1 / t0).powf(-g / (lapse * GAS_CONSTANT))
    }
}

impl Default for IsaAtmosphere {
    fn default() -> Self {
        Self::new()
    }
}

impl AtmosphericModel for IsaAtmosphere {
    fn conditions_at(&self, altitude: f64) -> AtmosphericConditions {
        let g = skyward_types::constants::STANDARD_GRAVITY;
        let layer = self
            .layers
            .iter()
            .rev()
            .find(|l| altitude >= l.base_altitude)
            .or(self.layers.first())
            .copied();
        let Some(layer) = layer else {
            return AtmosphericConditions::default();
        };
        let dh = altitude - layer.base_altitude;
        let temperature = (layer.base_temperature + layer.lapse_rate * dh).max(1.0);
        let pressure = layer_pressure(
            layer.base_pressure,
            layer.base_temperature,
            temperature,
            layer.lapse_rate,
            dh,
            g,
        );
        AtmosphericConditions::new(temperature, pressure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sea_level_density() {
        let isa = IsaAtmosphere::new();
        let c = isa.conditions_at(0.0);
        assert!((c.density() - 1.225).abs() < 1e-3);
        assert!((c.speed_of_sound() - 340.3).abs() < 0.1);
    }

    #[test]
    fn tropopause_values() {
        let c = IsaAtmosphere::new().conditions_at(11_000.0);
        assert!((c.temperature - 216.65).abs() < 1e-6);
        assert!((c.pressure - 22_632.0).abs() < 5.0);
    }

    #[test]
    fn pressure_is_continuous_across_layers() {
        let isa = IsaAtmosphere::new();
        let below = isa.conditions_at(19_999.999).pressure;
        let above = isa.conditions_at(20_000.0).pressure;
        assert!((below - above).abs() < 1e-2);
    }
}
