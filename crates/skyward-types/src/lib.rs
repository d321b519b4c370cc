//! # skyward-types
//!
//! Shared types, identifiers, error types, and physical constants
//! for the Skyward flight simulation engine.
//!
//! This crate has no flight logic. It defines the vocabulary
//! that every other Skyward crate shares.
//!
//! ## Key Types
//!
//! - [`SkywardError`] / [`SimulationError`] / [`AbortCause`] — error taxonomy
//! - [`ComponentRef`] — reference to a rocket component by stage and index
//! - [`EventType`] — flight event kinds with their explicit tie-break priority
//! - [`Warning`] / [`WarningSet`] — deduplicated non-fatal anomalies

pub mod constants;
pub mod error;
pub mod event_type;
pub mod ids;
pub mod warning;

pub use error::{AbortCause, SimulationError, SkywardError, SkywardResult};
pub use event_type::EventType;
pub use ids::{ComponentRef, DeviceKey, MotorKey};
pub use warning::{Warning, WarningSet};

/// Vector and rotation types used across the engine (f64 precision).
pub use glam::{DQuat, DVec3};
