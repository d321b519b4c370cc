//! Evaluation of ignition, separation and deployment triggers against a
//! flight event.

use skyward_rocket::{DeployTrigger, FlightConfiguration, IgnitionTrigger, Rocket, SeparationTrigger};
use skyward_types::EventType;

use crate::event::{EventData, FlightEvent};

/// Whether a motor in `stage` with `trigger` ignites on `event`. Parallel
/// boosters light together with their core stage.
pub fn ignites(trigger: IgnitionTrigger, stage: usize, event: &FlightEvent, configuration: &FlightConfiguration) -> bool {
    let rocket = configuration.rocket();
    let core = rocket.core_stage(stage);
    let from_below = event.source_stage().is_some() && event.source_stage() == rocket.stage_below(core);
    match trigger {
        IgnitionTrigger::Automatic => {
            if configuration.bottom_active_stage() == Some(core) {
                event.kind == EventType::Launch
            } else {
                event.kind == EventType::EjectionCharge && from_below
            }
        }
        IgnitionTrigger::Launch => event.kind == EventType::Launch,
        IgnitionTrigger::EjectionCharge => event.kind == EventType::EjectionCharge && from_below,
        IgnitionTrigger::Burnout => event.kind == EventType::Burnout && from_below,
        IgnitionTrigger::Never => false,
    }
}

/// Whether `stage` separates from the stage it hangs on when `event` is
/// handled.
pub fn separates(trigger: SeparationTrigger, stage: usize, event: &FlightEvent, rocket: &Rocket) -> bool {
    let Some(parent) = rocket.parent_stage(stage) else {
        return false;
    };
    let source = event.source_stage();
    match trigger {
        SeparationTrigger::UpperIgnition => event.kind == EventType::Ignition && source == Some(parent),
        SeparationTrigger::Ignition => event.kind == EventType::Ignition && source == Some(stage),
        SeparationTrigger::Burnout => event.kind == EventType::Burnout && source == Some(stage),
        SeparationTrigger::Ejection => event.kind == EventType::EjectionCharge && source == Some(stage),
        SeparationTrigger::Launch => event.kind == EventType::Launch,
        SeparationTrigger::Never => false,
    }
}

/// Whether a recovery device in `stage` deploys on `event`.
pub fn deploys(trigger: DeployTrigger, stage: usize, event: &FlightEvent, apogee_reached: bool, rocket: &Rocket) -> bool {
    let source = event.source_stage();
    match trigger {
        DeployTrigger::Ejection => event.kind == EventType::EjectionCharge && source == Some(stage),
        DeployTrigger::Apogee => event.kind == EventType::Apogee,
        DeployTrigger::LowerStageSeparation => {
            event.kind == EventType::StageSeparation
                && source.is_some_and(|lower| rocket.parent_stage(lower) == Some(stage))
        }
        DeployTrigger::CurrentStageSeparation => event.kind == EventType::StageSeparation && source == Some(stage),
        DeployTrigger::Altitude(altitude) => match event.data {
            Some(EventData::Altitude { from, to }) if event.kind == EventType::Altitude => {
                apogee_reached && from >= altitude && to < altitude
            }
            _ => false,
        },
        DeployTrigger::Never => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyward_rocket::presets;
    use skyward_types::{ComponentRef, MotorKey};
    use std::sync::Arc;

    #[test]
    fn automatic_ignition_follows_the_stack() {
        let config = FlightConfiguration::new(Arc::new(presets::gamma()));
        let launch = FlightEvent::new(EventType::Launch, 0.0);
        let ejection = FlightEvent::with_source(EventType::EjectionCharge, 1.9, MotorKey::new(2, 0));
        assert!(ignites(IgnitionTrigger::Automatic, 2, &launch, &config));
        assert!(!ignites(IgnitionTrigger::Automatic, 1, &launch, &config));
        assert!(ignites(IgnitionTrigger::Automatic, 1, &ejection, &config));
        assert!(!ignites(IgnitionTrigger::Automatic, 0, &ejection, &config));
    }

    #[test]
    fn pods_light_with_their_core() {
        let config = FlightConfiguration::new(Arc::new(presets::delta()));
        let launch = FlightEvent::new(EventType::Launch, 0.0);
        assert_eq!(config.bottom_active_stage(), Some(0));
        for stage in 0..3 {
            assert!(ignites(IgnitionTrigger::Automatic, stage, &launch, &config));
        }
    }

    #[test]
    fn upper_ignition_separates_the_stage_below() {
        let rocket = presets::gamma();
        let ignition = FlightEvent::with_source(EventType::Ignition, 1.9, MotorKey::new(1, 0));
        assert!(separates(SeparationTrigger::UpperIgnition, 2, &ignition, &rocket));
        assert!(!separates(SeparationTrigger::UpperIgnition, 1, &ignition, &rocket));
        assert!(!separates(SeparationTrigger::Launch, 0, &FlightEvent::new(EventType::Launch, 0.0), &rocket));
    }

    #[test]
    fn pods_separate_on_their_own_burnout() {
        let rocket = presets::delta();
        let burnout = FlightEvent::with_source(EventType::Burnout, 1.86, MotorKey::new(2, 0));
        assert!(separates(SeparationTrigger::Burnout, 2, &burnout, &rocket));
        assert!(!separates(SeparationTrigger::Burnout, 1, &burnout, &rocket));
        let core_ignition = FlightEvent::with_source(EventType::Ignition, 0.0, MotorKey::new(0, 0));
        assert!(separates(SeparationTrigger::UpperIgnition, 1, &core_ignition, &rocket));
    }

    #[test]
    fn altitude_deployment_needs_descent_through() {
        let rocket = presets::beta();
        let trigger = DeployTrigger::Altitude(50.0);
        let crossing = FlightEvent::new(EventType::Altitude, 9.0).with_data(EventData::Altitude { from: 50.5, to: 49.8 });
        assert!(deploys(trigger, 0, &crossing, true, &rocket));
        assert!(!deploys(trigger, 0, &crossing, false, &rocket));
        let separation = FlightEvent::with_source(EventType::StageSeparation, 2.0, ComponentRef::Stage(1));
        assert!(deploys(DeployTrigger::LowerStageSeparation, 0, &separation, false, &rocket));
        assert!(deploys(DeployTrigger::CurrentStageSeparation, 1, &separation, false, &rocket));
    }
}
