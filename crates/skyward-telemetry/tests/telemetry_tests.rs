//! Integration tests for skyward-telemetry.

use std::sync::Arc;

use skyward_rocket::presets;
use skyward_sim::{FlightEvent, Simulation, SimulationOptions};
use skyward_telemetry::{EventBus, EventKind, EventSink, JsonLinesSink, TelemetryEvent, TelemetryListener, VecSink};
use skyward_types::{EventType, Warning};

fn started(branch: &str) -> TelemetryEvent {
    TelemetryEvent::new(branch, 0.0, EventKind::BranchStarted)
}

// ─── Bus Tests ─────────────────────────────────────────────────

#[test]
fn emit_and_flush() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));

    bus.emit(started("main"));
    bus.emit(TelemetryEvent::new(
        "main",
        0.1,
        EventKind::FlightEvent(FlightEvent::new(EventType::Launch, 0.0)),
    ));
    assert!(sink.is_empty());

    assert_eq!(bus.flush(), 2);
    assert_eq!(sink.len(), 2);
    assert_eq!(sink.events()[0], started("main"));
}

#[test]
fn disabled_bus_drops_events() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));
    bus.set_enabled(false);
    assert!(!bus.is_enabled());

    bus.emit(started("main"));
    bus.sender().send(started("other")).unwrap();
    assert_eq!(bus.flush(), 0);
    assert!(sink.is_empty());
}

#[test]
fn multiple_sinks_see_every_event() {
    let mut bus = EventBus::new();
    let a = VecSink::new();
    let b = VecSink::new();
    bus.add_sink(Box::new(a.clone()));
    bus.add_sink(Box::new(b.clone()));
    assert_eq!(bus.sink_count(), 2);

    let sender = bus.sender();
    std::thread::spawn(move || {
        for _ in 0..3 {
            sender.send(started("thread")).unwrap();
        }
    })
    .join()
    .unwrap();

    bus.flush();
    assert_eq!(a.len(), 3);
    assert_eq!(b.len(), 3);
}

// ─── Sink Tests ────────────────────────────────────────────────

#[test]
fn json_lines_sink_writes_one_line_per_event() {
    let mut sink = JsonLinesSink::new(Vec::new());
    sink.handle(&started("main"));
    sink.handle(&TelemetryEvent::new(
        "main",
        2.5,
        EventKind::StepCompleted {
            altitude: 12.0,
            velocity: 30.0,
            time_step: 0.01,
        },
    ));
    sink.finalize();
    assert_eq!(sink.written(), 2);

    let output = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<_> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    let second: TelemetryEvent = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second.sim_time, 2.5);
}

#[test]
fn custom_event_carries_json_payload() {
    let event = TelemetryEvent::custom("main", 1.0, "apogee_estimate", &serde_json::json!({ "altitude": 120.5 })).unwrap();
    let EventKind::Custom { label, payload } = &event.kind else {
        panic!("expected a custom event");
    };
    assert_eq!(label, "apogee_estimate");
    let value: serde_json::Value = serde_json::from_str(payload).unwrap();
    assert_eq!(value["altitude"], 120.5);
}

// ─── Listener Tests ────────────────────────────────────────────

#[test]
fn listener_forwards_a_whole_flight() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));

    let mut sim = Simulation::from_options(Arc::new(presets::beta()), &SimulationOptions::calm()).unwrap();
    sim.add_listener(Arc::new(TelemetryListener::new(bus.sender()).with_steps()));
    sim.simulate().unwrap();
    bus.finalize();

    let events = sink.events();
    let started = events.iter().filter(|e| e.kind == EventKind::BranchStarted).count();
    let finished = events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::BranchFinished { error: None, .. }))
        .count();
    assert_eq!(started, 2);
    assert_eq!(finished, 2);
    assert!(events
        .iter()
        .any(|e| matches!(&e.kind, EventKind::FlightEvent(f) if f.kind == EventType::StageSeparation)));
    assert!(events.iter().any(|e| matches!(e.kind, EventKind::StepCompleted { .. })));
}

#[test]
fn telemetry_listener_is_not_reported() {
    let bus = EventBus::new();
    let mut sim = Simulation::from_options(Arc::new(presets::alpha()), &SimulationOptions::calm()).unwrap();
    sim.add_listener(Arc::new(TelemetryListener::new(bus.sender())));
    sim.simulate().unwrap();
    assert!(!sim.flight_data().unwrap().warnings().contains(&Warning::ListenersAffected));
}
