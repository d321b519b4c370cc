//! Bridge from the simulation engine into an [`EventBus`](crate::EventBus).

use std::sync::mpsc::Sender;
use std::sync::Mutex;

use skyward_sim::{FlightEvent, SimulationListener, SimulationStatus};
use skyward_types::SimulationError;

use crate::events::{EventKind, TelemetryEvent};

/// System listener forwarding branch boundaries, handled flight events
/// and, optionally, every step into a bus sender.
pub struct TelemetryListener {
    sender: Mutex<Sender<TelemetryEvent>>,
    steps: bool,
}

impl TelemetryListener {
    pub fn new(sender: Sender<TelemetryEvent>) -> Self {
        Self {
            sender: Mutex::new(sender),
            steps: false,
        }
    }

    /// Also emit a `StepCompleted` event after every step.
    pub fn with_steps(mut self) -> Self {
        self.steps = true;
        self
    }

    fn send(&self, status: &SimulationStatus, kind: EventKind) {
        let event = TelemetryEvent::new(status.flight_data().name(), status.time(), kind);
        if let Ok(sender) = self.sender.lock() {
            // A dropped bus just means nobody is listening.
            let _ = sender.send(event);
        }
    }
}

impl SimulationListener for TelemetryListener {
    fn name(&self) -> &str {
        "telemetry"
    }

    fn is_system_listener(&self) -> bool {
        true
    }

    fn start_simulation(&self, status: &mut SimulationStatus) {
        self.send(status, EventKind::BranchStarted);
    }

    fn end_simulation(&self, status: &mut SimulationStatus, error: Option<&SimulationError>) {
        let kind = EventKind::BranchFinished {
            samples: status.flight_data().len(),
            error: error.map(ToString::to_string),
        };
        self.send(status, kind);
    }

    fn post_step(&self, status: &mut SimulationStatus) {
        if self.steps {
            let kind = EventKind::StepCompleted {
                altitude: status.position().z,
                velocity: status.velocity().length(),
                time_step: status.previous_time_step(),
            };
            self.send(status, kind);
        }
    }

    fn handle_flight_event(&self, status: &mut SimulationStatus, event: &FlightEvent) -> bool {
        self.send(status, EventKind::FlightEvent(event.clone()));
        true
    }
}
