//! Conditions that ignite motors, separate stages and deploy recovery devices.
//!
//! Triggers are plain data. The simulation engine evaluates them against
//! each flight event as it is handled.

use serde::{Deserialize, Serialize};

/// When a mounted motor ignites.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnitionTrigger {
    /// Bottom-most active stage ignites at launch; every other stage
    /// ignites on the ejection charge of the stage below it.
    #[default]
    Automatic,
    /// At launch.
    Launch,
    /// On the ejection charge of any motor in the stage below.
    EjectionCharge,
    /// On the burnout of any motor in the stage below.
    Burnout,
    Never,
}

/// When a stage separates from the stage above it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparationTrigger {
    /// When a motor of the stage above ignites.
    #[default]
    UpperIgnition,
    /// When a motor of this stage ignites.
    Ignition,
    /// When a motor of this stage burns out.
    Burnout,
    /// On the ejection charge of a motor in this stage.
    Ejection,
    /// At launch.
    Launch,
    Never,
}

/// When a recovery device deploys.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployTrigger {
    /// On the ejection charge of a motor in the same stage.
    #[default]
    Ejection,
    Apogee,
    /// When the stage below separates.
    LowerStageSeparation,
    /// When the device's own stage separates.
    CurrentStageSeparation,
    /// When descending through the given altitude (m) after apogee.
    Altitude(f64),
    Never,
}
