//! Parts attached to a stage.
//!
//! Positions are axial distances in metres measured aft from the front of
//! the stage that owns the part.

use serde::{Deserialize, Serialize};

use crate::motor::Motor;
use crate::triggers::{DeployTrigger, IgnitionTrigger};

/// Nose cone profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoseShape {
    Conical,
    #[default]
    Ogive,
    Parabolic,
}

impl NoseShape {
    /// CP of the nose as a fraction of its length.
    pub fn cp_fraction(self) -> f64 {
        match self {
            NoseShape::Conical => 2.0 / 3.0,
            NoseShape::Ogive => 0.466,
            NoseShape::Parabolic => 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoseCone {
    pub length: f64,
    #[serde(default)]
    pub shape: NoseShape,
}

/// Set of identical trapezoidal fins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinSet {
    pub count: u32,
    pub root_chord: f64,
    pub tip_chord: f64,
    pub span: f64,
    /// Axial distance from the root leading edge to the tip leading edge.
    pub sweep: f64,
    /// Position of the root leading edge.
    pub position: f64,
    #[serde(default = "default_fin_thickness")]
    pub thickness: f64,
}

fn default_fin_thickness() -> f64 {
    0.003
}

impl FinSet {
    /// Planform area of one fin (m²).
    pub fn single_fin_area(&self) -> f64 {
        0.5 * (self.root_chord + self.tip_chord) * self.span
    }

    /// Length of the mid-chord line (m).
    pub fn mid_chord_length(&self) -> f64 {
        let dx = self.sweep + 0.5 * (self.tip_chord - self.root_chord);
        dx.hypot(self.span)
    }
}

/// A motor installed in a stage, with its ignition configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorMount {
    pub motor: Motor,
    /// Position of the motor's forward end.
    pub position: f64,
    #[serde(default)]
    pub ignition: IgnitionTrigger,
    #[serde(default)]
    pub ignition_delay: f64,
    /// Delay from burnout to the ejection charge. `None` means no charge.
    #[serde(default)]
    pub ejection_delay: Option<f64>,
}

impl MotorMount {
    pub fn new(motor: Motor, position: f64) -> Self {
        Self {
            motor,
            position,
            ignition: IgnitionTrigger::Automatic,
            ignition_delay: 0.0,
            ejection_delay: None,
        }
    }

    pub fn with_ignition(mut self, trigger: IgnitionTrigger, delay: f64) -> Self {
        self.ignition = trigger;
        self.ignition_delay = delay;
        self
    }

    pub fn with_ejection_delay(mut self, delay: Option<f64>) -> Self {
        self.ejection_delay = delay;
        self
    }

    /// Centre of the motor casing, relative to the stage front.
    pub fn cg(&self) -> f64 {
        self.position + 0.5 * self.motor.length
    }
}

/// Parachute or streamer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryDevice {
    pub name: String,
    /// Drag coefficient referenced to `area`.
    pub cd: f64,
    /// Reference area (m²).
    pub area: f64,
    #[serde(default)]
    pub mass: f64,
    #[serde(default)]
    pub position: f64,
    #[serde(default)]
    pub deploy: DeployTrigger,
    #[serde(default)]
    pub deploy_delay: f64,
}

impl RecoveryDevice {
    /// Parachute of the given canopy diameter.
    pub fn parachute(name: impl Into<String>, diameter: f64, cd: f64) -> Self {
        Self {
            name: name.into(),
            cd,
            area: std::f64::consts::PI * 0.25 * diameter * diameter,
            mass: 0.0,
            position: 0.0,
            deploy: DeployTrigger::Ejection,
            deploy_delay: 0.0,
        }
    }

    pub fn with_deploy(mut self, trigger: DeployTrigger, delay: f64) -> Self {
        self.deploy = trigger;
        self.deploy_delay = delay;
        self
    }

    pub fn with_mass(mut self, mass: f64, position: f64) -> Self {
        self.mass = mass;
        self.position = position;
        self
    }

    /// Drag area `Cd·A` (m²).
    pub fn drag_area(&self) -> f64 {
        self.cd * self.area
    }
}
