//! # skyward-bench
//!
//! Benchmark suite for the Skyward simulation engine.
//!
//! Provides named flight scenarios, a parallel batch runner, and CSV
//! export of the resulting flight metrics for regression tracking.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::FlightMetrics;
pub use runner::BatchRunner;
pub use scenarios::{Scenario, ScenarioKind};
