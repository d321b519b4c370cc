//! Integration tests for skyward-types.

use skyward_types::{
    AbortCause, ComponentRef, DeviceKey, EventType, MotorKey, SimulationError, SkywardError,
    Warning, WarningSet,
};

// ─── ID Tests ──────────────────────────────────────────────────

#[test]
fn component_stage_lookup() {
    assert_eq!(ComponentRef::Rocket.stage(), None);
    assert_eq!(ComponentRef::Stage(2).stage(), Some(2));
    assert_eq!(ComponentRef::from(MotorKey::new(1, 0)).stage(), Some(1));
    assert_eq!(ComponentRef::from(DeviceKey::new(0, 3)).stage(), Some(0));
}

#[test]
fn component_refs_are_serializable() {
    let source = ComponentRef::Motor(MotorKey::new(1, 2));
    let json = serde_json::to_string(&source).unwrap();
    let recovered: ComponentRef = serde_json::from_str(&json).unwrap();
    assert_eq!(source, recovered);
}

// ─── Event Type Tests ──────────────────────────────────────────

#[test]
fn priorities_are_unique_and_ordered() {
    let priorities: Vec<u8> = EventType::ALL.iter().map(|k| k.priority()).collect();
    for pair in priorities.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn ignition_precedes_liftoff_precedes_rod() {
    assert!(EventType::Ignition.priority() < EventType::Liftoff.priority());
    assert!(EventType::Liftoff.priority() < EventType::LaunchRod.priority());
    assert!(EventType::StageSeparation.priority() < EventType::RecoveryDeviceDeployment.priority());
}

#[test]
fn event_type_display() {
    assert_eq!(EventType::RecoveryDeviceDeployment.to_string(), "RECOVERY_DEVICE_DEPLOYMENT");
    assert_eq!(EventType::LaunchRod.to_string(), "LAUNCHROD");
}

// ─── Warning Tests ─────────────────────────────────────────────

#[test]
fn duplicate_warnings_collapse() {
    let mut set = WarningSet::new();
    assert!(set.add(Warning::NoRecoveryDevice));
    assert!(!set.add(Warning::NoRecoveryDevice));
    assert_eq!(set.len(), 1);
}

#[test]
fn large_aoa_keeps_the_worst() {
    let mut set = WarningSet::new();
    set.add(Warning::LargeAoA(0.4));
    assert!(!set.add(Warning::LargeAoA(0.3)));
    assert!(set.add(Warning::LargeAoA(0.6)));
    assert_eq!(set.len(), 1);
    assert_eq!(set.get(&Warning::LargeAoA(0.0)), Some(&Warning::LargeAoA(0.6)));
}

#[test]
fn large_aoa_replaces_nan() {
    let mut set = WarningSet::new();
    set.add(Warning::LargeAoA(f64::NAN));
    assert!(set.add(Warning::LargeAoA(0.1)));
    assert_eq!(set.get(&Warning::LargeAoA(0.0)), Some(&Warning::LargeAoA(0.1)));
}

#[test]
fn high_speed_deployment_keeps_first() {
    let mut set = WarningSet::new();
    set.add(Warning::HighSpeedDeployment(25.0));
    assert!(!set.add(Warning::HighSpeedDeployment(40.0)));
    assert_eq!(
        set.get(&Warning::HighSpeedDeployment(0.0)),
        Some(&Warning::HighSpeedDeployment(25.0))
    );
}

#[test]
fn detailed_warnings_are_kept_per_detail() {
    let mut set = WarningSet::new();
    set.add(Warning::EventAfterLanding(EventType::Apogee));
    set.add(Warning::EventAfterLanding(EventType::Tumble));
    set.add(Warning::Other("a".into()));
    set.add(Warning::Other("b".into()));
    assert_eq!(set.count_kind("event_after_landing"), 2);
    assert_eq!(set.count_kind("other"), 2);
}

#[test]
fn warning_set_merge_and_filter() {
    let mut a = WarningSet::new();
    a.add(Warning::Supersonic);
    let mut b = WarningSet::new();
    b.add(Warning::Supersonic);
    b.add(Warning::OpenAirframeForward);
    a.add_all(&b);
    assert_eq!(a.len(), 2);
    a.filter_out(&Warning::OpenAirframeForward);
    assert!(!a.contains(&Warning::OpenAirframeForward));
}

#[test]
fn warning_set_serialization_roundtrip_preserves_order() {
    let mut set = WarningSet::new();
    set.add(Warning::SeparationOrder);
    set.add(Warning::LargeAoA(0.5));
    let json = serde_json::to_string(&set).unwrap();
    let recovered: WarningSet = serde_json::from_str(&json).unwrap();
    let kinds: Vec<&str> = recovered.iter().map(|w| w.kind()).collect();
    assert_eq!(kinds, vec!["separation_order", "large_aoa"]);
}

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn abort_display() {
    let err = SimulationError::Aborted(AbortCause::NoMotorsFired);
    assert!(err.to_string().contains("no motors fired"));
}

#[test]
fn simulation_error_converts() {
    let err: SkywardError = SimulationError::ValuesTooLarge.into();
    assert!(err.to_string().starts_with("Simulation error"));
}
