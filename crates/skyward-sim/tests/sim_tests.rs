//! Integration tests for skyward-sim.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use skyward_models::GravityModel;
use skyward_rocket::{presets, Rocket};
use skyward_sim::{
    AbortFlag, AccelerationData, BranchOutcome, EventQueue, FlightDataSnapshot, FlightDataType, FlightEvent,
    RunnerState, Simulation, SimulationListener, SimulationOptions, SimulationStatus,
};
use skyward_types::{AbortCause, EventType, Warning};

fn simulation(rocket: Rocket) -> Simulation {
    Simulation::from_options(Arc::new(rocket), &SimulationOptions::calm()).unwrap()
}

fn event_kinds(sim: &Simulation, branch: usize) -> Vec<EventType> {
    sim.flight_data()
        .unwrap()
        .branch(branch)
        .unwrap()
        .events()
        .iter()
        .map(|e| e.kind)
        .filter(|k| *k != EventType::SimWarn)
        .collect()
}

fn position(kinds: &[EventType], kind: EventType) -> usize {
    kinds
        .iter()
        .position(|k| *k == kind)
        .unwrap_or_else(|| panic!("{kind} missing from {kinds:?}"))
}

// ─── Event Queue Tests ─────────────────────────────────────────

#[test]
fn queue_pops_in_time_then_priority_order() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
    let mut queue = EventQueue::new();
    let mut pushed = Vec::new();
    for _ in 0..500 {
        let kind = EventType::ALL[rng.gen_range(0..EventType::ALL.len())];
        // Coarse times so ties are common.
        let time = f64::from(rng.gen_range(0..20u32)) * 0.25;
        queue.push(FlightEvent::new(kind, time));
        pushed.push((time, kind.priority()));
    }

    let mut popped = Vec::new();
    while let Ok(event) = queue.pop_min() {
        popped.push((event.time, event.kind.priority()));
    }
    pushed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    assert_eq!(popped, pushed);
}

// ─── Single-Stage Flight Tests ─────────────────────────────────

#[test]
fn single_stage_event_sequence() {
    let mut sim = simulation(presets::alpha());
    sim.simulate().unwrap();
    assert_eq!(sim.state(), RunnerState::Completed);

    let data = sim.flight_data().unwrap();
    assert_eq!(data.branch_count(), 1);
    assert_eq!(data.outcomes(), &[BranchOutcome::Completed]);

    assert_eq!(
        event_kinds(&sim, 0),
        vec![
            EventType::Launch,
            EventType::Ignition,
            EventType::Liftoff,
            EventType::LaunchRod,
            EventType::Burnout,
            EventType::EjectionCharge,
            EventType::RecoveryDeviceDeployment,
            EventType::Apogee,
            EventType::GroundHit,
            EventType::SimulationEnd,
        ]
    );
}

#[test]
fn single_stage_flight_is_plausible() {
    let mut sim = simulation(presets::alpha());
    sim.simulate().unwrap();
    let data = sim.flight_data().unwrap();

    let apogee = data.max_altitude();
    assert!(apogee > 50.0 && apogee < 1000.0, "apogee {apogee}");
    assert!(data.time_to_apogee() > 2.0);
    assert!(data.flight_time() > data.time_to_apogee());
    let main = data.branch(0).unwrap();
    assert!(main.last(FlightDataType::Altitude).abs() < 1e-6);
    assert!(data.deployment_velocity().is_finite());
}

#[test]
fn time_is_monotonic_in_every_branch() {
    let mut sim = simulation(presets::gamma());
    sim.simulate().unwrap();
    for branch in sim.flight_data().unwrap().branches() {
        let times = branch.get(FlightDataType::Time).unwrap();
        assert!(
            times.windows(2).all(|w| w[1] >= w[0]),
            "time decreases in branch {}",
            branch.name()
        );
        let events = branch.events();
        assert!(events.windows(2).all(|w| w[1].time >= w[0].time - 1e-9));
    }
}

#[test]
fn fully_disabled_rocket_aborts() {
    let mut sim = simulation(presets::alpha());
    sim.configuration_mut().set_stage_active(0, false);
    sim.simulate().unwrap();

    assert_eq!(sim.state(), RunnerState::Aborted);
    let data = sim.flight_data().unwrap();
    assert_eq!(data.branch(0).unwrap().abort_cause(), Some(AbortCause::NoActiveStages));
    assert_eq!(data.outcomes(), &[BranchOutcome::Aborted(AbortCause::NoActiveStages)]);
}

#[test]
fn cancellation_stops_the_run() {
    let mut sim = simulation(presets::alpha());
    let abort = AbortFlag::new();
    abort.request();
    sim.simulate_with_abort(&abort).unwrap();

    assert_eq!(sim.state(), RunnerState::Aborted);
    let main = sim.flight_data().unwrap().branch(0).unwrap();
    assert_eq!(main.abort_cause(), Some(AbortCause::Cancelled));
    assert!(main.first_event(EventType::GroundHit).is_none());
}

// ─── Multi-Stage Tests ─────────────────────────────────────────

#[test]
fn three_stages_make_three_branches() {
    let mut sim = simulation(presets::gamma());
    sim.simulate().unwrap();
    let data = sim.flight_data().unwrap();
    assert_eq!(data.branch_count(), 3);

    let main = event_kinds(&sim, 0);
    assert_eq!(main.iter().filter(|k| **k == EventType::StageSeparation).count(), 2);
    assert_eq!(&main[main.len() - 2..], &[EventType::GroundHit, EventType::SimulationEnd]);

    for index in 1..3 {
        let kinds = event_kinds(&sim, index);
        assert!(!kinds.contains(&EventType::StageSeparation));
        assert!(!kinds.contains(&EventType::Apogee));
        assert_eq!(
            &kinds[kinds.len() - 3..],
            &[EventType::Tumble, EventType::GroundHit, EventType::SimulationEnd],
            "{kinds:?}"
        );
    }
}

#[test]
fn strap_on_pods_make_a_branch_each() {
    let mut sim = simulation(presets::delta());
    sim.simulate().unwrap();
    let data = sim.flight_data().unwrap();
    assert_eq!(data.branch_count(), 3);
    assert!(data.outcomes().iter().all(|o| *o == BranchOutcome::Completed));

    let main = event_kinds(&sim, 0);
    assert_eq!(main.iter().filter(|k| **k == EventType::StageSeparation).count(), 2);
    assert_eq!(main.iter().filter(|k| **k == EventType::Ignition).count(), 3);
    assert!(position(&main, EventType::StageSeparation) < position(&main, EventType::Apogee));
    assert!(!data.warnings().contains(&Warning::SeparationOrder));

    let mut names: Vec<_> = data.branches()[1..].iter().map(|b| b.name().to_string()).collect();
    names.sort();
    assert_eq!(names, ["Pod A", "Pod B"]);
    for index in 1..3 {
        let kinds = event_kinds(&sim, index);
        assert_eq!(
            &kinds[kinds.len() - 3..],
            &[EventType::Tumble, EventType::GroundHit, EventType::SimulationEnd],
            "{kinds:?}"
        );
    }
}

#[test]
fn each_separation_adds_a_branch() {
    for (rocket, stages) in [
        (presets::alpha(), 1),
        (presets::beta(), 2),
        (presets::gamma(), 3),
        (presets::delta(), 3),
    ] {
        let mut sim = simulation(rocket);
        sim.simulate().unwrap();
        assert_eq!(sim.flight_data().unwrap().branch_count(), stages);
    }
}

#[test]
fn booster_branch_shares_history() {
    let mut sim = simulation(presets::beta());
    sim.simulate().unwrap();
    let data = sim.flight_data().unwrap();
    let main = data.branch(0).unwrap();
    let booster = data.branch(1).unwrap();
    assert_eq!(booster.name(), "Booster");

    let separation = main.first_event(EventType::StageSeparation).unwrap().time;
    let shared = booster.get(FlightDataType::Time).unwrap();
    assert!(shared[0] == 0.0);
    assert!(booster.value_at(FlightDataType::Altitude, separation * 0.5) > 0.0);
    assert!(
        (booster.value_at(FlightDataType::Altitude, separation * 0.5)
            - main.value_at(FlightDataType::Altitude, separation * 0.5))
        .abs()
            < 1e-9
    );
}

#[test]
fn disabled_stage_flies_like_a_removed_stage() {
    let mut disabled = simulation(presets::gamma());
    disabled.configuration_mut().set_stage_active(2, false);
    disabled.simulate().unwrap();

    let mut removed = simulation(presets::beta());
    removed.simulate().unwrap();

    let a = disabled.flight_data().unwrap();
    let b = removed.flight_data().unwrap();
    let close = |x: f64, y: f64| (x - y).abs() <= 0.05 * y.abs();
    assert!(close(a.max_altitude(), b.max_altitude()), "{} vs {}", a.max_altitude(), b.max_altitude());
    assert!(close(a.max_velocity(), b.max_velocity()));
    assert!(close(a.flight_time(), b.flight_time()));
    assert_eq!(disabled.flight_data().unwrap().branch_count(), 2);
}

#[test]
fn reenabled_stage_matches_original() {
    let mut original = simulation(presets::gamma());
    original.simulate().unwrap();

    let mut toggled = simulation(presets::gamma());
    toggled.configuration_mut().set_stage_active(1, false);
    toggled.configuration_mut().set_stage_active(1, true);
    toggled.simulate().unwrap();

    let a = original.flight_data().unwrap().max_altitude();
    let b = toggled.flight_data().unwrap().max_altitude();
    assert!((a - b).abs() <= 1e-9 * a.max(1.0));
}

// ─── Listener Tests ────────────────────────────────────────────

#[derive(Debug, Default)]
struct CountingGravity {
    calls: AtomicUsize,
}

impl GravityModel for CountingGravity {
    fn gravity_at(&self, _altitude: f64) -> f64 {
        self.calls.fetch_add(1, Ordering::Relaxed);
        9.81
    }
}

struct FixedGravity {
    system: bool,
}

impl SimulationListener for FixedGravity {
    fn is_system_listener(&self) -> bool {
        self.system
    }

    fn pre_gravity_model(&self, _status: &mut SimulationStatus) -> Option<f64> {
        Some(9.81)
    }
}

fn run_with_gravity_override(system: bool) -> (Simulation, Arc<CountingGravity>) {
    let gravity = Arc::new(CountingGravity::default());
    let mut sim = simulation(presets::alpha());
    sim.conditions_mut().gravity = gravity.clone();
    sim.add_listener(Arc::new(FixedGravity { system }));
    sim.simulate().unwrap();
    (sim, gravity)
}

#[test]
fn pre_hook_override_skips_the_model() {
    let (sim, gravity) = run_with_gravity_override(false);
    assert_eq!(gravity.calls.load(Ordering::Relaxed), 0);
    let warnings = sim.flight_data().unwrap().warnings();
    assert_eq!(warnings.count_kind("listeners_affected"), 1);
    assert!(warnings.contains(&Warning::ListenersAffected));
}

#[test]
fn system_listener_does_not_raise_a_warning() {
    let (sim, gravity) = run_with_gravity_override(true);
    assert_eq!(gravity.calls.load(Ordering::Relaxed), 0);
    assert!(!sim.flight_data().unwrap().warnings().contains(&Warning::ListenersAffected));
}

struct VetoDeployment;

impl SimulationListener for VetoDeployment {
    fn recovery_device_deployment(&self, _status: &mut SimulationStatus, _device: skyward_types::DeviceKey) -> bool {
        false
    }
}

#[test]
fn vetoed_deployment_falls_without_recovery() {
    let mut sim = simulation(presets::alpha());
    sim.add_listener(Arc::new(VetoDeployment));
    sim.simulate().unwrap();
    let kinds = event_kinds(&sim, 0);
    assert!(!kinds.contains(&EventType::RecoveryDeviceDeployment));
    assert!(kinds.contains(&EventType::GroundHit));
}

/// Adds a constant to gravity after the model.
struct HeavierGravity;

impl SimulationListener for HeavierGravity {
    fn post_gravity_model(&self, _status: &mut SimulationStatus, gravity: f64) -> f64 {
        gravity + 1.0
    }
}

/// Counts gravity hooks and remembers the last value it was handed.
#[derive(Default)]
struct GravityObserver {
    pre_calls: AtomicUsize,
    post_calls: AtomicUsize,
    seen: AtomicU64,
}

impl SimulationListener for GravityObserver {
    fn is_system_listener(&self) -> bool {
        true
    }

    fn pre_gravity_model(&self, _status: &mut SimulationStatus) -> Option<f64> {
        self.pre_calls.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn post_gravity_model(&self, _status: &mut SimulationStatus, gravity: f64) -> f64 {
        self.post_calls.fetch_add(1, Ordering::Relaxed);
        self.seen.store(gravity.to_bits(), Ordering::Relaxed);
        gravity
    }
}

#[test]
fn post_hooks_fold_in_order() {
    let gravity = Arc::new(CountingGravity::default());
    let observer = Arc::new(GravityObserver::default());
    let mut sim = simulation(presets::alpha());
    sim.conditions_mut().gravity = gravity.clone();
    sim.add_listener(Arc::new(HeavierGravity));
    sim.add_listener(observer.clone());
    sim.simulate().unwrap();

    assert!(gravity.calls.load(Ordering::Relaxed) > 0);
    assert_eq!(f64::from_bits(observer.seen.load(Ordering::Relaxed)), 9.81 + 1.0);
    assert!(sim.flight_data().unwrap().warnings().contains(&Warning::ListenersAffected));
}

#[test]
fn pre_hook_override_stops_later_listeners() {
    let observer = Arc::new(GravityObserver::default());
    let mut sim = simulation(presets::alpha());
    sim.add_listener(Arc::new(FixedGravity { system: true }));
    sim.add_listener(observer.clone());
    sim.simulate().unwrap();

    assert_eq!(observer.pre_calls.load(Ordering::Relaxed), 0);
    assert_eq!(observer.post_calls.load(Ordering::Relaxed), 0);
    assert!(sim.flight_data().unwrap().max_altitude() > 50.0);
}

/// Pins the rocket in place by overriding its acceleration.
struct Pinned;

impl SimulationListener for Pinned {
    fn pre_acceleration_calculation(&self, _status: &mut SimulationStatus) -> Option<AccelerationData> {
        Some(AccelerationData::default())
    }
}

#[test]
fn overridden_acceleration_skips_the_force_models() {
    let gravity = Arc::new(CountingGravity::default());
    let mut sim = simulation(presets::alpha());
    sim.conditions_mut().gravity = gravity.clone();
    sim.add_listener(Arc::new(Pinned));
    sim.simulate().unwrap();

    assert_eq!(gravity.calls.load(Ordering::Relaxed), 0);
    let data = sim.flight_data().unwrap();
    assert_eq!(data.outcomes(), &[BranchOutcome::Aborted(AbortCause::NoLiftoff)]);
    assert!(data.warnings().contains(&Warning::ListenersAffected));
}

/// Holds the first `skip` steps and counts step hooks.
struct StepCounter {
    skip: usize,
    pre: AtomicUsize,
    post: AtomicUsize,
}

impl StepCounter {
    fn new(skip: usize) -> Self {
        Self {
            skip,
            pre: AtomicUsize::new(0),
            post: AtomicUsize::new(0),
        }
    }
}

impl SimulationListener for StepCounter {
    fn pre_step(&self, _status: &mut SimulationStatus) -> bool {
        self.pre.fetch_add(1, Ordering::Relaxed) >= self.skip
    }

    fn post_step(&self, _status: &mut SimulationStatus) {
        self.post.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn skipped_step_still_fires_post_step() {
    let run = |skip: usize| {
        let counter = Arc::new(StepCounter::new(skip));
        let mut sim = simulation(presets::alpha());
        sim.add_listener(counter.clone());
        sim.simulate().unwrap();
        (sim, counter)
    };
    let (baseline, all_steps) = run(0);
    let (held, held_steps) = run(5);

    let pre = held_steps.pre.load(Ordering::Relaxed);
    assert_eq!(pre, held_steps.post.load(Ordering::Relaxed));
    assert_eq!(pre, all_steps.pre.load(Ordering::Relaxed) + 5);

    let a = baseline.flight_data().unwrap();
    let b = held.flight_data().unwrap();
    assert_eq!(a.branch(0).unwrap().len(), b.branch(0).unwrap().len());
    assert_eq!(a.max_altitude(), b.max_altitude());
}

/// Writes into the flight data after every step.
struct DataWriter;

impl SimulationListener for DataWriter {
    fn post_step(&self, status: &mut SimulationStatus) {
        let altitude = status.position().z;
        status
            .flight_data_mut()
            .set_value(FlightDataType::Altitude, altitude)
            .ok();
    }
}

/// Draws from the stepper's random source after every step.
struct RandomDraw;

impl SimulationListener for RandomDraw {
    fn post_step(&self, status: &mut SimulationStatus) {
        let _: f64 = status.rng().gen();
    }
}

#[test]
fn writing_flight_data_affects_the_simulation() {
    let mut sim = simulation(presets::alpha());
    sim.add_listener(Arc::new(DataWriter));
    sim.simulate().unwrap();
    assert!(sim.flight_data().unwrap().warnings().contains(&Warning::ListenersAffected));
}

#[test]
fn drawing_random_numbers_affects_the_simulation() {
    let mut sim = simulation(presets::alpha());
    sim.add_listener(Arc::new(RandomDraw));
    sim.simulate().unwrap();
    assert!(sim.flight_data().unwrap().warnings().contains(&Warning::ListenersAffected));
}

/// Tries to move the clock back after each step past one second.
struct Rewind;

impl SimulationListener for Rewind {
    fn post_step(&self, status: &mut SimulationStatus) {
        if status.time() > 1.0 {
            status.set_time(0.5);
        }
    }
}

#[test]
fn rewinding_time_is_ignored() {
    let mut sim = simulation(presets::alpha());
    sim.add_listener(Arc::new(Rewind));
    sim.simulate().unwrap();
    assert_eq!(sim.state(), RunnerState::Completed);

    let main = sim.flight_data().unwrap().branch(0).unwrap();
    let times = main.get(FlightDataType::Time).unwrap();
    assert!(times.windows(2).all(|w| w[1] >= w[0]));
    assert!(main.last_event(EventType::GroundHit).is_some());
    let warnings = sim.flight_data().unwrap().warnings();
    assert!(warnings.contains(&Warning::Other("time cannot move backwards".into())));
    assert!(warnings.contains(&Warning::ListenersAffected));
}

/// Refuses to queue apogee events.
struct VetoApogee;

impl SimulationListener for VetoApogee {
    fn add_flight_event(&self, _status: &mut SimulationStatus, event: &FlightEvent) -> bool {
        event.kind != EventType::Apogee
    }
}

#[test]
fn vetoed_event_is_never_queued() {
    let mut sim = simulation(presets::alpha());
    sim.add_listener(Arc::new(VetoApogee));
    sim.simulate().unwrap();
    let kinds = event_kinds(&sim, 0);
    assert!(!kinds.contains(&EventType::Apogee));
    assert_eq!(&kinds[kinds.len() - 2..], &[EventType::GroundHit, EventType::SimulationEnd]);
}

struct VetoIgnition;

impl SimulationListener for VetoIgnition {
    fn motor_ignition(&self, _status: &mut SimulationStatus, _motor: skyward_types::MotorKey) -> bool {
        false
    }
}

#[test]
fn vetoed_ignition_aborts_without_thrust() {
    let mut sim = simulation(presets::alpha());
    sim.add_listener(Arc::new(VetoIgnition));
    sim.simulate().unwrap();

    assert_eq!(sim.state(), RunnerState::Aborted);
    let data = sim.flight_data().unwrap();
    assert_eq!(data.outcomes(), &[BranchOutcome::Aborted(AbortCause::NoMotorsFired)]);
    assert!(!event_kinds(&sim, 0).contains(&EventType::Ignition));
}

// ─── Snapshot Tests ────────────────────────────────────────────

#[test]
fn snapshot_roundtrip() {
    let options = SimulationOptions::calm();
    let mut sim = simulation(presets::beta());
    sim.simulate().unwrap();
    let data = sim.flight_data().unwrap().clone();

    let snapshot = FlightDataSnapshot::new("Beta", options.clone(), data);
    let bytes = snapshot.to_bytes().unwrap();
    let restored = FlightDataSnapshot::from_bytes(&bytes).unwrap();

    assert_eq!(restored.rocket, "Beta");
    assert_eq!(restored.options, options);
    assert_eq!(restored.data.branch_count(), snapshot.data.branch_count());
    for (a, b) in restored.data.branches().iter().zip(snapshot.data.branches()) {
        assert_eq!(a.events(), b.events());
        assert_eq!(a.get(FlightDataType::Time), b.get(FlightDataType::Time));
    }
}

#[test]
fn garbage_snapshot_is_rejected() {
    assert!(FlightDataSnapshot::from_bytes(&[1, 2, 3]).is_err());
}
