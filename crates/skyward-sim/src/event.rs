//! Flight events and the time-ordered event queue.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use skyward_types::{AbortCause, ComponentRef, EventType, SimulationError, Warning};

/// Payload carried by some event kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventData {
    /// Cause of a `SIM_ABORT`.
    Abort(AbortCause),
    /// Warning recorded by a `SIM_WARN`.
    Warning(Warning),
    /// Message of an `EXCEPTION`.
    Exception(String),
    /// Altitude before and after the step that queued an `ALTITUDE` event.
    Altitude { from: f64, to: f64 },
}

/// A timestamped flight event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightEvent {
    pub kind: EventType,
    pub time: f64,
    pub source: Option<ComponentRef>,
    pub data: Option<EventData>,
}

impl FlightEvent {
    pub fn new(kind: EventType, time: f64) -> Self {
        Self {
            kind,
            time,
            source: None,
            data: None,
        }
    }

    pub fn with_source(kind: EventType, time: f64, source: impl Into<ComponentRef>) -> Self {
        Self {
            kind,
            time,
            source: Some(source.into()),
            data: None,
        }
    }

    pub fn with_data(mut self, data: EventData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn abort(time: f64, cause: AbortCause) -> Self {
        Self::new(EventType::SimAbort, time).with_data(EventData::Abort(cause))
    }

    /// The abort cause of a `SIM_ABORT` event.
    pub fn abort_cause(&self) -> Option<AbortCause> {
        match self.data {
            Some(EventData::Abort(cause)) => Some(cause),
            _ => None,
        }
    }

    /// Stage of the source component, if it belongs to one.
    pub fn source_stage(&self) -> Option<usize> {
        self.source.and_then(ComponentRef::stage)
    }
}

/// Heap entry: the event plus its insertion sequence number.
#[derive(Debug, Clone)]
struct Queued {
    event: FlightEvent,
    seq: u64,
}

impl Queued {
    fn key(&self) -> (f64, u8, u64) {
        (self.event.time, self.event.kind.priority(), self.seq)
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    // Reversed so the max-heap pops the smallest (time, priority, seq).
    fn cmp(&self, other: &Self) -> Ordering {
        let (ta, pa, sa) = self.key();
        let (tb, pb, sb) = other.key();
        tb.total_cmp(&ta).then(pb.cmp(&pa)).then(sb.cmp(&sa))
    }
}

/// Min-heap of flight events ordered by `(time, priority)`, FIFO among ties.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Queued>,
    next_seq: u64,
    generation: u64,
    last_popped: Option<f64>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: FlightEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Queued { event, seq });
        self.generation += 1;
    }

    /// Removes and returns the earliest event.
    pub fn pop_min(&mut self) -> Result<FlightEvent, SimulationError> {
        let queued = self.heap.pop().ok_or(SimulationError::EmptyQueue)?;
        debug_assert!(
            self.last_popped.map_or(true, |last| queued.event.time >= last - 1e-9),
            "event queue popped {} at {} after {:?}",
            queued.event.kind,
            queued.event.time,
            self.last_popped
        );
        self.last_popped = Some(queued.event.time);
        self.generation += 1;
        Ok(queued.event)
    }

    pub fn peek_min(&self) -> Option<&FlightEvent> {
        self.heap.peek().map(|q| &q.event)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Events in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &FlightEvent> {
        self.heap.iter().map(|q| &q.event)
    }

    /// Keeps only the events matching `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&FlightEvent) -> bool) {
        self.heap.retain(|q| keep(&q.event));
        self.generation += 1;
    }

    /// Incremented by every mutating operation.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_pop_by_priority_then_fifo() {
        let mut q = EventQueue::new();
        q.push(FlightEvent::new(EventType::Altitude, 1.0));
        q.push(FlightEvent::new(EventType::LaunchRod, 1.0));
        q.push(FlightEvent::with_source(EventType::Ignition, 1.0, ComponentRef::Stage(1)));
        q.push(FlightEvent::with_source(EventType::Ignition, 1.0, ComponentRef::Stage(0)));
        let order: Vec<_> = std::iter::from_fn(|| q.pop_min().ok())
            .map(|e| (e.kind, e.source))
            .collect();
        assert_eq!(
            order,
            vec![
                (EventType::Ignition, Some(ComponentRef::Stage(1))),
                (EventType::Ignition, Some(ComponentRef::Stage(0))),
                (EventType::LaunchRod, None),
                (EventType::Altitude, None),
            ]
        );
    }

    #[test]
    fn empty_pop_is_an_error() {
        let mut q = EventQueue::new();
        assert_eq!(q.pop_min(), Err(SimulationError::EmptyQueue));
    }

    #[test]
    fn generation_tracks_mutations() {
        let mut q = EventQueue::new();
        q.push(FlightEvent::new(EventType::Launch, 0.0));
        q.push(FlightEvent::new(EventType::Apogee, 3.0));
        let g = q.generation();
        let _ = q.peek_min();
        assert_eq!(q.generation(), g);
        q.retain(|e| e.kind != EventType::Apogee);
        assert!(q.generation() > g);
        assert_eq!(q.len(), 1);
    }
}
