//! Non-fatal simulation warnings.
//!
//! A [`WarningSet`] keeps at most one warning per key. When a warning with
//! an existing key arrives, the per-kind replacement rule decides whether
//! it supersedes the stored one (e.g. a larger angle of attack does).

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::event_type::EventType;

/// A non-fatal anomaly observed during a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Warning {
    /// Large angle of attack (radians).
    LargeAoA(f64),
    /// Recovery device deployed at high speed (m/s).
    HighSpeedDeployment(f64),
    /// An event arrived after the rocket had landed.
    EventAfterLanding(EventType),
    /// A listener changed the simulation.
    ListenersAffected,
    /// The rocket carries no recovery device.
    NoRecoveryDevice,
    /// The aerodynamic model is not valid above Mach 1.
    Supersonic,
    /// A recovery device deployed while still on the launch rod.
    RecoveryLaunchRod,
    /// Tumbling began while a motor was still producing thrust.
    TumbleUnderThrust,
    /// Stages separated out of order.
    SeparationOrder,
    /// A stage separated before the launch rod was cleared.
    EarlySeparation,
    /// A branch produced no flight data.
    EmptyBranch(String),
    /// The forward end of the active airframe is open.
    OpenAirframeForward,
    /// Gap between adjacent airframe components.
    AirframeGap,
    /// Overlap between adjacent airframe components.
    AirframeOverlap,
    /// Abrupt change in body diameter.
    DiameterDiscontinuity,
    /// Free-form warning.
    Other(String),
}

/// Deduplication key of a warning: its kind plus, for some kinds, a detail.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WarningKey {
    kind: &'static str,
    detail: Option<String>,
}

impl Warning {
    /// Stable kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Warning::LargeAoA(_) => "large_aoa",
            Warning::HighSpeedDeployment(_) => "high_speed_deployment",
            Warning::EventAfterLanding(_) => "event_after_landing",
            Warning::ListenersAffected => "listeners_affected",
            Warning::NoRecoveryDevice => "no_recovery_device",
            Warning::Supersonic => "supersonic",
            Warning::RecoveryLaunchRod => "recovery_launch_rod",
            Warning::TumbleUnderThrust => "tumble_under_thrust",
            Warning::SeparationOrder => "separation_order",
            Warning::EarlySeparation => "early_separation",
            Warning::EmptyBranch(_) => "empty_branch",
            Warning::OpenAirframeForward => "open_airframe_forward",
            Warning::AirframeGap => "airframe_gap",
            Warning::AirframeOverlap => "airframe_overlap",
            Warning::DiameterDiscontinuity => "diameter_discontinuity",
            Warning::Other(_) => "other",
        }
    }

    /// Key under which this warning is stored in a [`WarningSet`].
    pub fn key(&self) -> WarningKey {
        let detail = match self {
            Warning::EventAfterLanding(kind) => Some(kind.name().to_string()),
            Warning::EmptyBranch(name) => Some(name.clone()),
            Warning::Other(text) => Some(text.clone()),
            _ => None,
        };
        WarningKey {
            kind: self.kind(),
            detail,
        }
    }

    /// Whether `self` should replace `current`, which has the same key.
    pub fn replaces(&self, current: &Warning) -> bool {
        match (self, current) {
            (Warning::LargeAoA(new), Warning::LargeAoA(old)) => old.is_nan() || new > old,
            _ => false,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::LargeAoA(aoa) => {
                write!(f, "Large angle of attack encountered ({:.1}°)", aoa.to_degrees())
            }
            Warning::HighSpeedDeployment(v) => {
                write!(f, "Recovery device deployment at high speed ({v:.1} m/s)")
            }
            Warning::EventAfterLanding(kind) => write!(f, "Flight event occurred after landing: {kind}"),
            Warning::ListenersAffected => f.write_str("Listeners modified the flight simulation"),
            Warning::NoRecoveryDevice => f.write_str("No recovery device defined in the simulation"),
            Warning::Supersonic => f.write_str("Body calculations may not be accurate at supersonic speeds"),
            Warning::RecoveryLaunchRod => f.write_str("Recovery device deployed while on the launch guide"),
            Warning::TumbleUnderThrust => f.write_str("Stage began to tumble under thrust"),
            Warning::SeparationOrder => f.write_str("Stages separated in an unreasonable order"),
            Warning::EarlySeparation => f.write_str("Stages separated before clearing the launch guide"),
            Warning::EmptyBranch(name) => write!(f, "Simulation branch '{name}' contains no data"),
            Warning::OpenAirframeForward => f.write_str("Forward end of airframe is open"),
            Warning::AirframeGap => f.write_str("Gap in airframe"),
            Warning::AirframeOverlap => f.write_str("Overlapping airframe components"),
            Warning::DiameterDiscontinuity => f.write_str("Discontinuity in rocket body diameter"),
            Warning::Other(text) => f.write_str(text),
        }
    }
}

/// Ordered, deduplicated collection of warnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Warning>", into = "Vec<Warning>")]
pub struct WarningSet {
    entries: IndexMap<WarningKey, Warning>,
}

impl WarningSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning. Returns `true` if it was inserted or replaced
    /// the stored warning with the same key.
    pub fn add(&mut self, warning: Warning) -> bool {
        let key = warning.key();
        match self.entries.get_mut(&key) {
            Some(current) => {
                if warning.replaces(current) {
                    *current = warning;
                    true
                } else {
                    false
                }
            }
            None => {
                self.entries.insert(key, warning);
                true
            }
        }
    }

    /// Adds every warning of `other`.
    pub fn add_all(&mut self, other: &WarningSet) {
        for warning in other.iter() {
            self.add(warning.clone());
        }
    }

    /// The stored warning sharing `warning`'s key.
    pub fn get(&self, warning: &Warning) -> Option<&Warning> {
        self.entries.get(&warning.key())
    }

    /// Whether a warning with the same key is stored.
    pub fn contains(&self, warning: &Warning) -> bool {
        self.entries.contains_key(&warning.key())
    }

    /// Number of stored warnings of the given kind (see [`Warning::kind`]).
    pub fn count_kind(&self, kind: &str) -> usize {
        self.entries.values().filter(|w| w.kind() == kind).count()
    }

    /// Removes the warning sharing `warning`'s key.
    pub fn filter_out(&mut self, warning: &Warning) {
        self.entries.shift_remove(&warning.key());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.entries.values()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl From<Vec<Warning>> for WarningSet {
    fn from(warnings: Vec<Warning>) -> Self {
        let mut set = WarningSet::new();
        for warning in warnings {
            set.add(warning);
        }
        set
    }
}

impl From<WarningSet> for Vec<Warning> {
    fn from(set: WarningSet) -> Self {
        set.entries.into_values().collect()
    }
}

impl fmt::Display for WarningSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|w| w.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
