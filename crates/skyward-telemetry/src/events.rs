//! Telemetry event types.
//!
//! Structured events emitted while a simulation runs. Each carries the
//! branch it came from and the simulation time, plus just enough data to
//! be useful for monitoring.

use serde::{Deserialize, Serialize};
use skyward_sim::FlightEvent;
use skyward_types::{SkywardError, SkywardResult};

/// An event emitted by a simulation branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Name of the emitting branch.
    pub branch: String,
    /// Simulation time (s).
    pub sim_time: f64,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    BranchStarted,

    /// A flight event about to be handled.
    FlightEvent(FlightEvent),

    /// A step finished.
    StepCompleted {
        /// Altitude above the launch site (m).
        altitude: f64,
        /// Total velocity (m/s).
        velocity: f64,
        /// Size of the step just taken (s).
        time_step: f64,
    },

    BranchFinished {
        /// Number of data samples recorded.
        samples: usize,
        /// Error message if the branch ended on a hard error.
        error: Option<String>,
    },

    /// Custom event for extensibility.
    Custom {
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl TelemetryEvent {
    pub fn new(branch: impl Into<String>, sim_time: f64, kind: EventKind) -> Self {
        Self {
            branch: branch.into(),
            sim_time,
            kind,
        }
    }

    /// A `Custom` event with `payload` encoded as JSON.
    pub fn custom(
        branch: impl Into<String>,
        sim_time: f64,
        label: impl Into<String>,
        payload: &impl Serialize,
    ) -> SkywardResult<Self> {
        let payload = serde_json::to_string(payload).map_err(|e| SkywardError::Serialization(e.to_string()))?;
        Ok(Self::new(
            branch,
            sim_time,
            EventKind::Custom {
                label: label.into(),
                payload,
            },
        ))
    }
}
