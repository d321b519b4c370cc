//! Error types for the Skyward engine.
//!
//! Configuration and I/O failures surface as [`SkywardError`]. Failures
//! raised while a branch is being simulated are [`SimulationError`]s, and
//! the fatal flight conditions that end a branch are [`AbortCause`]s.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the Skyward engine.
#[derive(Debug, Error)]
pub enum SkywardError {
    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Rocket description is malformed or inconsistent.
    #[error("Invalid rocket: {0}")]
    InvalidRocket(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A simulation branch failed.
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),
}

/// Convenience alias for `Result<T, SkywardError>`.
pub type SkywardResult<T> = Result<T, SkywardError>;

/// Failures raised inside the step loop of one branch.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum SimulationError {
    /// `pop_min` on an empty event queue.
    #[error("event queue is empty")]
    EmptyQueue,

    /// A computed quantity became NaN.
    #[error("simulation resulted in a NaN value ({0})")]
    NaN(String),

    /// Position, velocity or rotation left the representable range.
    #[error("simulation values exceeded the allowed range")]
    ValuesTooLarge,

    /// A time step was negative or NaN.
    #[error("stepping backwards in time (dt = {0})")]
    NegativeTimeStep(f64),

    /// Write attempted on a finalized flight data branch.
    #[error("flight data branch '{0}' is finalized")]
    BranchFinalized(String),

    /// The branch hit a fatal flight condition.
    #[error("simulation aborted: {0}")]
    Aborted(#[from] AbortCause),
}

/// Fatal flight conditions. Each one ends the branch that raised it
/// and leaves sibling branches untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum AbortCause {
    #[error("no stages are active")]
    NoActiveStages,

    #[error("no motors are defined in the active configuration")]
    NoMotorsDefined,

    #[error("no motor has an ignition trigger configured")]
    NoConfiguredIgnition,

    #[error("no motors fired")]
    NoMotorsFired,

    #[error("motor burnout without liftoff")]
    NoLiftoff,

    #[error("cannot compute the center of pressure")]
    NoCp,

    #[error("active stages have zero length")]
    ZeroLength,

    #[error("active stages have zero mass")]
    ZeroMass,

    #[error("tumble transition while under thrust")]
    TumbleUnderThrust,

    #[error("recovery device deployed while a motor is burning")]
    DeployUnderThrust,

    #[error("simulation cancelled")]
    Cancelled,
}
