//! Integration tests for skyward-rocket.

use std::sync::Arc;

use skyward_rocket::{presets, DeployTrigger, FlightConfiguration, Rocket, StageSet};
use skyward_types::{ComponentRef, DeviceKey, MotorKey};

// ─── Preset Tests ──────────────────────────────────────────────

#[test]
fn presets_validate() {
    for name in presets::NAMES {
        let rocket = presets::by_name(name).unwrap();
        rocket.validate().unwrap();
    }
    assert!(presets::by_name("omega").is_none());
}

#[test]
fn gamma_has_three_stages_with_motors() {
    let rocket = presets::gamma();
    assert_eq!(rocket.stage_count(), 3);
    assert_eq!(rocket.motor_keys().len(), 3);
    assert_eq!(rocket.device_keys(), vec![DeviceKey::new(0, 0)]);
    assert!((rocket.stage_offset(2) - 0.60).abs() < 1e-12);
}

#[test]
fn delta_pods_hang_on_the_sustainer() {
    let rocket = presets::delta();
    assert_eq!(rocket.stage_count(), 3);
    assert!(!rocket.is_parallel(0));
    assert!(rocket.is_parallel(1) && rocket.is_parallel(2));
    assert_eq!(rocket.parent_stage(0), None);
    assert_eq!(rocket.parent_stage(2), Some(0));
    assert_eq!(rocket.core_stage(1), 0);
    assert_eq!(rocket.stage_below(0), None);
    assert_eq!(rocket.assembly(0), 0..3);
    assert_eq!(rocket.assembly(1), 1..2);
    assert!((rocket.stage_offset(2) - 0.25).abs() < 1e-12);
    assert!((rocket.total_length() - 0.40).abs() < 1e-12);
}

#[test]
fn serial_assembly_carries_its_boosters() {
    let rocket = presets::gamma();
    assert_eq!(rocket.parent_stage(2), Some(1));
    assert_eq!(rocket.stage_below(1), Some(2));
    assert_eq!(rocket.assembly(1), 1..3);
}

#[test]
fn misplaced_booster_is_rejected() {
    let mut rocket = presets::gamma();
    let booster = rocket.stages[2].clone().strapped_to(0, 0.1);
    rocket.stages.push(booster);
    assert!(rocket.validate().is_err());

    let mut rocket = presets::delta();
    rocket.stages[1] = rocket.stages[1].clone().strapped_to(2, 0.1);
    assert!(rocket.validate().is_err());
}

#[test]
fn c6_motor_impulse_is_plausible() {
    let motor = presets::c6_motor();
    let impulse = motor.total_impulse();
    assert!(impulse > 8.0 && impulse < 10.5, "impulse {impulse}");
    assert!((motor.burn_time() - 1.86).abs() < 1e-12);
}

// ─── TOML Tests ────────────────────────────────────────────────

#[test]
fn toml_roundtrip() {
    let rocket = presets::beta();
    let text = rocket.to_toml_string().unwrap();
    let parsed = Rocket::from_toml_str(&text).unwrap();
    assert_eq!(parsed, rocket);
}

#[test]
fn toml_with_defaults() {
    let text = r#"
        name = "Minimal"

        [[stages]]
        name = "Only"
        length = 0.3
        diameter = 0.02
        dry_mass = 0.02
        dry_cg = 0.15

        [[stages.recovery]]
        name = "Streamer"
        cd = 0.4
        area = 0.01
        deploy = { altitude = 50.0 }
    "#;
    let rocket = Rocket::from_toml_str(text).unwrap();
    let device = rocket.recovery_device(DeviceKey::new(0, 0)).unwrap();
    assert_eq!(device.deploy, DeployTrigger::Altitude(50.0));
    assert!(rocket.stages[0].motors.is_empty());
}

#[test]
fn invalid_motor_is_rejected() {
    let mut rocket = presets::alpha();
    rocket.stages[0].motors[0].motor.thrust_curve = vec![[0.0, 1.0]];
    assert!(rocket.validate().is_err());
}

// ─── Configuration Tests ───────────────────────────────────────

#[test]
fn stage_set_clearing() {
    let mut set = StageSet::all(4);
    set.clear_from(2);
    assert_eq!(set.active().collect::<Vec<_>>(), vec![0, 1]);

    let mut set = StageSet::all(4);
    set.clear_before(2);
    assert_eq!(set.active().collect::<Vec<_>>(), vec![2, 3]);
    assert!(!set.is_active(7));
}

#[test]
fn configuration_tracks_active_components() {
    let mut config = FlightConfiguration::new(Arc::new(presets::gamma()));
    assert_eq!(config.top_active_stage(), Some(0));
    assert_eq!(config.bottom_active_stage(), Some(2));
    assert!((config.length_aerodynamic() - 0.80).abs() < 1e-12);

    config.detach(1);
    assert_eq!(config.active_stages(), vec![0]);
    assert!(config.is_component_active(ComponentRef::Rocket));
    assert!(!config.is_component_active(MotorKey::new(2, 0).into()));
    assert_eq!(config.active_motor_mounts().count(), 1);
}

#[test]
fn booster_separation_keeps_the_core_flying() {
    let rocket = Arc::new(presets::delta());
    let mut main = FlightConfiguration::new(rocket.clone());
    main.detach(1);
    assert_eq!(main.active_stages(), vec![0, 2]);
    assert_eq!(main.bottom_active_stage(), Some(0));
    assert_eq!(main.active_parallel_stages().count(), 1);

    let mut pod = FlightConfiguration::new(rocket);
    pod.isolate(1);
    assert_eq!(pod.active_stages(), vec![1]);
    assert_eq!(pod.top_active_stage(), Some(1));
    assert!((pod.front_position() - 0.25).abs() < 1e-12);
    assert!((pod.length_aerodynamic() - 0.15).abs() < 1e-12);
}

#[test]
fn serial_separation_isolates_the_lower_assembly() {
    let mut booster = FlightConfiguration::new(Arc::new(presets::gamma()));
    booster.isolate(1);
    assert_eq!(booster.active_stages(), vec![1, 2]);
}

#[test]
fn configuration_without_stages_has_no_reference_area() {
    let mut config = FlightConfiguration::new(Arc::new(presets::alpha()));
    config.set_stage_active(0, false);
    assert!(!config.has_active_stages());
    assert!(!config.has_motors());
    assert_eq!(config.reference_area(), 0.0);
    assert_eq!(config.length_aerodynamic(), 0.0);
}
