//! Benchmark scenarios: a preset rocket plus launch options.
//!
//! 1. **Single stage**: the one-stage sport rocket in calm air
//! 2. **Two stage**: booster and sustainer, one separation
//! 3. **Three stage**: two separations, three branches
//! 4. **Windy**: the single-stage rocket in gusty crosswind
//! 5. **Strap-on**: sustainer with two parallel pods, three branches

use serde::{Deserialize, Serialize};
use skyward_rocket::{presets, Rocket};
use skyward_sim::SimulationOptions;

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioKind {
    SingleStage,
    TwoStage,
    ThreeStage,
    Windy,
    StrapOn,
}

impl ScenarioKind {
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::SingleStage,
            ScenarioKind::TwoStage,
            ScenarioKind::ThreeStage,
            ScenarioKind::Windy,
            ScenarioKind::StrapOn,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::SingleStage => "single_stage",
            ScenarioKind::TwoStage => "two_stage",
            ScenarioKind::ThreeStage => "three_stage",
            ScenarioKind::Windy => "windy",
            ScenarioKind::StrapOn => "strap_on",
        }
    }

    /// Inverse of [`ScenarioKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.name() == name)
    }
}

/// A fully specified benchmark scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub rocket: Rocket,
    pub options: SimulationOptions,
}

impl Scenario {
    pub fn single_stage() -> Self {
        Self {
            kind: ScenarioKind::SingleStage,
            rocket: presets::alpha(),
            options: SimulationOptions::calm(),
        }
    }

    pub fn two_stage() -> Self {
        Self {
            kind: ScenarioKind::TwoStage,
            rocket: presets::beta(),
            options: SimulationOptions::calm(),
        }
    }

    pub fn three_stage() -> Self {
        Self {
            kind: ScenarioKind::ThreeStage,
            rocket: presets::gamma(),
            options: SimulationOptions::calm(),
        }
    }

    /// 5 m/s wind from the west with 20% turbulence, launched off a rod
    /// tilted 5° into the wind.
    pub fn windy() -> Self {
        Self {
            kind: ScenarioKind::Windy,
            rocket: presets::alpha(),
            options: SimulationOptions {
                wind_average: 5.0,
                wind_turbulence: 0.2,
                wind_direction: 90.0,
                launch_rod_angle: 5.0,
                launch_rod_direction: 270.0,
                ..SimulationOptions::default()
            },
        }
    }

    pub fn strap_on() -> Self {
        Self {
            kind: ScenarioKind::StrapOn,
            rocket: presets::delta(),
            options: SimulationOptions::calm(),
        }
    }

    pub fn from_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::SingleStage => Self::single_stage(),
            ScenarioKind::TwoStage => Self::two_stage(),
            ScenarioKind::ThreeStage => Self::three_stage(),
            ScenarioKind::Windy => Self::windy(),
            ScenarioKind::StrapOn => Self::strap_on(),
        }
    }

    /// Same scenario with a different random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.options.random_seed = seed;
        self
    }

    /// Same scenario with the fast integration settings.
    pub fn fast(mut self) -> Self {
        let fast = SimulationOptions::fast();
        self.options.time_step = fast.time_step;
        self.options.max_angle_step = fast.max_angle_step;
        self
    }
}
