//! # skyward-models
//!
//! Physical models consumed by the simulation engine, each behind a narrow
//! `Send + Sync` trait so simulations can share them across threads.
//!
//! ## Key Types
//!
//! - [`AtmosphericModel`] — [`IsaAtmosphere`], [`ConstantAtmosphere`]
//! - [`WindModel`] — [`ConstantWind`], [`TurbulentWind`]
//! - [`GravityModel`] — [`ConstantGravity`], [`WgsGravity`]
//! - [`GeodeticComputation`] — Coriolis and world-coordinate bookkeeping
//! - [`AerodynamicCalculator`] — [`BarrowmanAerodynamics`]
//! - [`MassCalculator`] — [`ComponentMassCalculator`]

pub mod aero;
pub mod atmosphere;
pub mod geodetic;
pub mod gravity;
pub mod mass;
pub mod wind;

pub use aero::{
    landing_drag_coefficient, tumble_drag_coefficient, AerodynamicCalculator, AerodynamicForces,
    BarrowmanAerodynamics, FlightConditions,
};
pub use atmosphere::{AtmosphericConditions, AtmosphericModel, ConstantAtmosphere, IsaAtmosphere};
pub use geodetic::{GeodeticComputation, WorldCoordinate};
pub use gravity::{ConstantGravity, GravityModel, WgsGravity};
pub use mass::{ComponentMassCalculator, MassCalculator, RigidBody};
pub use wind::{ConstantWind, TurbulentWind, WindModel};
