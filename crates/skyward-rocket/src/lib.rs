//! # skyward-rocket
//!
//! Static rocket description for the Skyward flight simulator.
//!
//! ## Key Types
//!
//! - [`Rocket`] — ordered stack of [`Stage`]s, stage 0 on top, with optional
//!   parallel boosters ([`ParallelMount`])
//! - [`Motor`] / [`MotorState`] — thrust curve and per-flight lifecycle
//! - [`FlightConfiguration`] — a rocket plus its set of active stages
//! - Triggers — [`IgnitionTrigger`], [`SeparationTrigger`], [`DeployTrigger`]

pub mod components;
pub mod configuration;
pub mod motor;
pub mod presets;
pub mod rocket;
pub mod stage;
pub mod triggers;

pub use components::{FinSet, MotorMount, NoseCone, NoseShape, RecoveryDevice};
pub use configuration::{FlightConfiguration, StageSet};
pub use motor::{Motor, MotorPhase, MotorState};
pub use rocket::Rocket;
pub use stage::{ParallelMount, Stage};
pub use triggers::{DeployTrigger, IgnitionTrigger, SeparationTrigger};
