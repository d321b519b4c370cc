//! # skyward-sim
//!
//! Discrete-event flight simulation engine.
//!
//! ## Key Types
//!
//! - [`Simulation`] — a rocket, its launch conditions, and the last run's data
//! - [`SimulationOptions`] / [`SimulationConditions`] — launch setup and shared models
//! - [`SimulationStatus`] — mutable state of one flight branch
//! - [`EventQueue`] / [`FlightEvent`] — time-ordered flight events
//! - [`SimulationStepper`] — RK4, tumble, landing and ground integration
//! - [`SimulationListener`] — hooks that observe or override the engine
//! - [`FlightData`] / [`FlightDataBranch`] — recorded time series per branch
//! - [`FlightDataSnapshot`] — binary archive of a finished run

pub mod abort;
pub mod conditions;
pub mod engine;
pub mod event;
pub mod flight_data;
pub mod listener;
pub mod simulation;
pub mod snapshot;
pub mod status;
pub mod stepper;
pub mod triggers;

pub use abort::AbortFlag;
pub use conditions::{SimulationConditions, SimulationOptions};
pub use engine::{RunnerState, SimulationRunner};
pub use event::{EventData, EventQueue, FlightEvent};
pub use flight_data::{BranchOutcome, FlightData, FlightDataBranch, FlightDataType};
pub use listener::{AccelerationData, SimulationListener};
pub use simulation::Simulation;
pub use snapshot::FlightDataSnapshot;
pub use status::SimulationStatus;
pub use stepper::{SimulationStepper, StepperKind};
