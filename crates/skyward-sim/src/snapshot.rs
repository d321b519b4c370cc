//! Binary snapshots of finished simulations.
//!
//! A snapshot holds the options a run was made with and every branch it
//! produced, so results can be archived and compared later.

use std::path::Path;

use serde::{Deserialize, Serialize};
use skyward_types::{SkywardError, SkywardResult};

use crate::conditions::SimulationOptions;
use crate::flight_data::FlightData;

/// A finished simulation, serialized with `bincode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightDataSnapshot {
    /// Name of the simulated rocket.
    pub rocket: String,
    pub options: SimulationOptions,
    pub data: FlightData,
}

impl FlightDataSnapshot {
    pub fn new(rocket: impl Into<String>, options: SimulationOptions, data: FlightData) -> Self {
        Self {
            rocket: rocket.into(),
            options,
            data,
        }
    }

    /// Serializes to compact binary format.
    pub fn to_bytes(&self) -> SkywardResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| SkywardError::Serialization(format!("snapshot serialization failed: {e}")))
    }

    /// Deserializes from binary format.
    pub fn from_bytes(data: &[u8]) -> SkywardResult<Self> {
        bincode::deserialize(data)
            .map_err(|e| SkywardError::Serialization(format!("snapshot deserialization failed: {e}")))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> SkywardResult<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> SkywardResult<Self> {
        Self::from_bytes(&std::fs::read(path)?)
    }
}
