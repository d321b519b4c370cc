//! Flight event kinds and their scheduling priority.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a discrete flight event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Launch,
    Ignition,
    Liftoff,
    LaunchRod,
    Burnout,
    EjectionCharge,
    StageSeparation,
    Apogee,
    RecoveryDeviceDeployment,
    GroundHit,
    SimulationEnd,
    Altitude,
    Tumble,
    Exception,
    SimAbort,
    SimWarn,
}

impl EventType {
    /// Every kind, in priority order.
    pub const ALL: [EventType; 16] = [
        EventType::Launch,
        EventType::Ignition,
        EventType::Liftoff,
        EventType::LaunchRod,
        EventType::Burnout,
        EventType::EjectionCharge,
        EventType::StageSeparation,
        EventType::Apogee,
        EventType::RecoveryDeviceDeployment,
        EventType::GroundHit,
        EventType::SimulationEnd,
        EventType::Altitude,
        EventType::Tumble,
        EventType::Exception,
        EventType::SimAbort,
        EventType::SimWarn,
    ];

    /// Tie-break rank for events scheduled at the same instant. Lower pops first.
    ///
    /// Ignition precedes liftoff, liftoff precedes rod clearance, and a stage
    /// separation is handled before any deployment it triggers.
    pub fn priority(self) -> u8 {
        match self {
            EventType::Launch => 0,
            EventType::Ignition => 1,
            EventType::Liftoff => 2,
            EventType::LaunchRod => 3,
            EventType::Burnout => 4,
            EventType::EjectionCharge => 5,
            EventType::StageSeparation => 6,
            EventType::Apogee => 7,
            EventType::RecoveryDeviceDeployment => 8,
            EventType::GroundHit => 9,
            EventType::SimulationEnd => 10,
            EventType::Altitude => 11,
            EventType::Tumble => 12,
            EventType::Exception => 13,
            EventType::SimAbort => 14,
            EventType::SimWarn => 15,
        }
    }

    /// Upper-case name used in logs and CSV output.
    pub fn name(self) -> &'static str {
        match self {
            EventType::Launch => "LAUNCH",
            EventType::Ignition => "IGNITION",
            EventType::Liftoff => "LIFTOFF",
            EventType::LaunchRod => "LAUNCHROD",
            EventType::Burnout => "BURNOUT",
            EventType::EjectionCharge => "EJECTION_CHARGE",
            EventType::StageSeparation => "STAGE_SEPARATION",
            EventType::Apogee => "APOGEE",
            EventType::RecoveryDeviceDeployment => "RECOVERY_DEVICE_DEPLOYMENT",
            EventType::GroundHit => "GROUND_HIT",
            EventType::SimulationEnd => "SIMULATION_END",
            EventType::Altitude => "ALTITUDE",
            EventType::Tumble => "TUMBLE",
            EventType::Exception => "EXCEPTION",
            EventType::SimAbort => "SIM_ABORT",
            EventType::SimWarn => "SIM_WARN",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
