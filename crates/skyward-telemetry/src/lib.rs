//! # skyward-telemetry
//!
//! Event bus for simulation telemetry. Branch boundaries, flight events
//! and step summaries flow from a [`TelemetryListener`] into an
//! [`EventBus`] and out to pluggable sinks (memory, logs, JSON lines).

pub mod bus;
pub mod events;
pub mod listener;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, TelemetryEvent};
pub use listener::TelemetryListener;
pub use sinks::{EventSink, JsonLinesSink, TracingSink, VecSink};
