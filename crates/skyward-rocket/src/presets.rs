//! Ready-made rockets used by the benchmarks, the CLI and the tests.
//!
//! | Name    | Stages | Motors                |
//! |---------|--------|-----------------------|
//! | `alpha` | 1      | C6-3                  |
//! | `beta`  | 2      | C6-0 → C6-5           |
//! | `gamma` | 3      | C6-0 → C6-0 → C6-5    |
//! | `delta` | 1 + 2  | C6-5 + two C6 pods    |

use crate::components::{FinSet, MotorMount, NoseCone, NoseShape, RecoveryDevice};
use crate::motor::Motor;
use crate::rocket::Rocket;
use crate::stage::Stage;
use crate::triggers::SeparationTrigger;

/// Names accepted by [`by_name`].
pub const NAMES: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

/// An 18 mm C6 black-powder motor.
pub fn c6_motor() -> Motor {
    Motor::new(
        "C6",
        0.018,
        0.070,
        0.0241,
        0.0133,
        vec![
            [0.0, 0.0],
            [0.031, 0.946],
            [0.092, 4.826],
            [0.139, 9.936],
            [0.192, 14.09],
            [0.209, 11.446],
            [0.231, 7.381],
            [0.248, 6.151],
            [0.292, 5.489],
            [0.370, 4.921],
            [0.475, 4.448],
            [0.671, 4.258],
            [0.702, 4.542],
            [0.723, 4.164],
            [0.850, 4.448],
            [1.063, 4.353],
            [1.211, 4.353],
            [1.242, 4.069],
            [1.303, 4.258],
            [1.468, 4.353],
            [1.656, 4.448],
            [1.821, 4.448],
            [1.834, 2.933],
            [1.847, 1.325],
            [1.860, 0.0],
        ],
    )
}

fn sustainer(motor_delay: f64) -> Stage {
    Stage::new("Sustainer", 0.40, 0.025, 0.035, 0.18)
        .with_nose(NoseCone {
            length: 0.08,
            shape: NoseShape::Ogive,
        })
        .with_fins(FinSet {
            count: 3,
            root_chord: 0.06,
            tip_chord: 0.03,
            span: 0.045,
            sweep: 0.03,
            position: 0.34,
            thickness: 0.003,
        })
        .with_motor(MotorMount::new(c6_motor(), 0.33).with_ejection_delay(Some(motor_delay)))
        .with_recovery(RecoveryDevice::parachute("Parachute", 0.30, 0.8).with_mass(0.005, 0.12))
}

fn booster(name: &str) -> Stage {
    Stage::new(name, 0.20, 0.025, 0.020, 0.12)
        .with_fins(FinSet {
            count: 3,
            root_chord: 0.07,
            tip_chord: 0.035,
            span: 0.05,
            sweep: 0.035,
            position: 0.13,
            thickness: 0.003,
        })
        .with_motor(MotorMount::new(c6_motor(), 0.13).with_ejection_delay(Some(0.0)))
        .with_separation(SeparationTrigger::UpperIgnition, 0.0)
}

/// Single-stage sport rocket.
pub fn alpha() -> Rocket {
    Rocket::new("Alpha").with_stage(sustainer(3.0))
}

/// Two-stage rocket: a C6-0 booster lighting a C6-5 sustainer.
pub fn beta() -> Rocket {
    Rocket::new("Beta").with_stage(sustainer(5.0)).with_stage(booster("Booster"))
}

/// Three-stage rocket.
pub fn gamma() -> Rocket {
    Rocket::new("Gamma")
        .with_stage(sustainer(5.0))
        .with_stage(booster("Middle"))
        .with_stage(booster("Booster"))
}

fn pod(name: &str) -> Stage {
    Stage::new(name, 0.15, 0.02, 0.012, 0.08)
        .with_fins(FinSet {
            count: 2,
            root_chord: 0.05,
            tip_chord: 0.025,
            span: 0.03,
            sweep: 0.025,
            position: 0.10,
            thickness: 0.002,
        })
        .with_motor(MotorMount::new(c6_motor(), 0.08))
        .with_separation(SeparationTrigger::Burnout, 0.05)
        .strapped_to(0, 0.25)
}

/// Single-stage rocket with two strap-on pods that drop at burnout.
pub fn delta() -> Rocket {
    Rocket::new("Delta")
        .with_stage(sustainer(5.0))
        .with_stage(pod("Pod A"))
        .with_stage(pod("Pod B"))
}

/// Looks a preset up by name (case-insensitive).
pub fn by_name(name: &str) -> Option<Rocket> {
    match name.to_ascii_lowercase().as_str() {
        "alpha" => Some(alpha()),
        "beta" => Some(beta()),
        "gamma" => Some(gamma()),
        "delta" => Some(delta()),
        _ => None,
    }
}
