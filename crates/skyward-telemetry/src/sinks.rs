//! Pluggable event sinks.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::events::{EventKind, TelemetryEvent};

/// Trait for event consumers.
pub trait EventSink: Send {
    fn handle(&mut self, event: &TelemetryEvent);

    /// Called when the simulation ends. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    fn name(&self) -> &str;
}

/// Collects events in memory. Clones share the same buffer, so a handle
/// kept outside the bus can inspect what the bus delivered.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<TelemetryEvent>>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events collected so far.
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &TelemetryEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// Logs events through `tracing`. Step events go to `trace`, the rest to `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &TelemetryEvent) {
        match &event.kind {
            EventKind::StepCompleted {
                altitude,
                velocity,
                time_step,
            } => tracing::trace!(
                branch = %event.branch,
                sim_time = event.sim_time,
                altitude,
                velocity,
                time_step,
                "step"
            ),
            EventKind::FlightEvent(flight_event) => tracing::info!(
                branch = %event.branch,
                sim_time = event.sim_time,
                event = %flight_event.kind,
                "flight_event"
            ),
            kind => tracing::info!(
                branch = %event.branch,
                sim_time = event.sim_time,
                event = ?kind,
                "telemetry_event"
            ),
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}

/// Writes one JSON object per line to any writer.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
    written: usize,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Lines written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn handle(&mut self, event: &TelemetryEvent) {
        let result = serde_json::to_writer(&mut self.writer, event)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"));
        match result {
            Ok(()) => self.written += 1,
            Err(e) => tracing::warn!(error = %e, "failed to write telemetry event"),
        }
    }

    fn finalize(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(error = %e, "failed to flush telemetry output");
        }
    }

    fn name(&self) -> &str {
        "json_lines_sink"
    }
}
