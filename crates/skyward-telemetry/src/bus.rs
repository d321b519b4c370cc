//! Event bus: channel-based event dispatch with pluggable sinks.
//!
//! Producers send through [`EventBus::emit`] or a cloned
//! [`EventBus::sender`]; events reach the registered sinks on
//! [`EventBus::flush`].

use std::sync::mpsc;

use crate::events::TelemetryEvent;
use crate::sinks::EventSink;

/// Broadcast event bus for simulation telemetry.
pub struct EventBus {
    sender: mpsc::Sender<TelemetryEvent>,
    receiver: mpsc::Receiver<TelemetryEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    /// Disabled bus drops events.
    enabled: bool,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            sinks: Vec::new(),
            enabled: true,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A producer handle for other threads or listeners. Events sent
    /// through it while the bus is disabled are dropped at flush.
    pub fn sender(&self) -> mpsc::Sender<TelemetryEvent> {
        self.sender.clone()
    }

    /// Emit an event. No-op while disabled.
    pub fn emit(&self, event: TelemetryEvent) {
        if !self.enabled {
            return;
        }
        // The receiver lives as long as the bus.
        let _ = self.sender.send(event);
    }

    /// Dispatches every pending event to the sinks. Returns how many
    /// events were dispatched.
    pub fn flush(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.receiver.try_recv() {
            if !self.enabled {
                continue;
            }
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
            count += 1;
        }
        count
    }

    /// Flushes, then lets every sink finish its output.
    pub fn finalize(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
