//! Recorded flight data: one [`FlightDataBranch`] per flight path, and the
//! [`FlightData`] result of a whole simulation.

use std::fmt::Write as _;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use skyward_types::{AbortCause, EventType, SimulationError, WarningSet};

use crate::event::FlightEvent;

/// A recorded scalar channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightDataType {
    Time,
    Altitude,
    PositionX,
    PositionY,
    LateralDistance,
    LateralDirection,
    VelocityZ,
    VelocityXY,
    VelocityTotal,
    AccelerationZ,
    AccelerationXY,
    AccelerationTotal,
    Latitude,
    Longitude,
    Gravity,
    OrientationTheta,
    OrientationPhi,
    AngleOfAttack,
    RollRate,
    PitchRate,
    YawRate,
    Mass,
    MotorMass,
    LongitudinalInertia,
    RotationalInertia,
    CgLocation,
    CpLocation,
    Stability,
    Mach,
    ReynoldsNumber,
    ReferenceLength,
    ReferenceArea,
    Thrust,
    DragForce,
    DragCoefficient,
    AxialDragCoefficient,
    FrictionDragCoefficient,
    PressureDragCoefficient,
    BaseDragCoefficient,
    NormalForceCoefficient,
    PitchMomentCoefficient,
    YawMomentCoefficient,
    SideForceCoefficient,
    RollMomentCoefficient,
    PitchDampingCoefficient,
    YawDampingCoefficient,
    CoriolisAcceleration,
    WindVelocity,
    AirTemperature,
    AirPressure,
    SpeedOfSound,
    TimeStep,
}

impl FlightDataType {
    pub fn name(self) -> &'static str {
        use FlightDataType::*;
        match self {
            Time => "Time",
            Altitude => "Altitude",
            PositionX => "Position East of launch",
            PositionY => "Position North of launch",
            LateralDistance => "Lateral distance",
            LateralDirection => "Lateral direction",
            VelocityZ => "Vertical velocity",
            VelocityXY => "Lateral velocity",
            VelocityTotal => "Total velocity",
            AccelerationZ => "Vertical acceleration",
            AccelerationXY => "Lateral acceleration",
            AccelerationTotal => "Total acceleration",
            Latitude => "Latitude",
            Longitude => "Longitude",
            Gravity => "Gravitational acceleration",
            OrientationTheta => "Vertical orientation (zenith)",
            OrientationPhi => "Lateral orientation (azimuth)",
            AngleOfAttack => "Angle of attack",
            RollRate => "Roll rate",
            PitchRate => "Pitch rate",
            YawRate => "Yaw rate",
            Mass => "Mass",
            MotorMass => "Motor mass",
            LongitudinalInertia => "Longitudinal moment of inertia",
            RotationalInertia => "Rotational moment of inertia",
            CgLocation => "CG location",
            CpLocation => "CP location",
            Stability => "Stability margin calibers",
            Mach => "Mach number",
            ReynoldsNumber => "Reynolds number",
            ReferenceLength => "Reference length",
            ReferenceArea => "Reference area",
            Thrust => "Thrust",
            DragForce => "Drag force",
            DragCoefficient => "Drag coefficient",
            AxialDragCoefficient => "Axial drag coefficient",
            FrictionDragCoefficient => "Friction drag coefficient",
            PressureDragCoefficient => "Pressure drag coefficient",
            BaseDragCoefficient => "Base drag coefficient",
            NormalForceCoefficient => "Normal force coefficient",
            PitchMomentCoefficient => "Pitch moment coefficient",
            YawMomentCoefficient => "Yaw moment coefficient",
            SideForceCoefficient => "Side force coefficient",
            RollMomentCoefficient => "Roll moment coefficient",
            PitchDampingCoefficient => "Pitch damping coefficient",
            YawDampingCoefficient => "Yaw damping coefficient",
            CoriolisAcceleration => "Coriolis acceleration",
            WindVelocity => "Wind velocity",
            AirTemperature => "Air temperature",
            AirPressure => "Air pressure",
            SpeedOfSound => "Speed of sound",
            TimeStep => "Simulation time step",
        }
    }

    pub fn unit(self) -> &'static str {
        use FlightDataType::*;
        match self {
            Time | TimeStep => "s",
            Altitude | PositionX | PositionY | LateralDistance | CgLocation | CpLocation | ReferenceLength => "m",
            VelocityZ | VelocityXY | VelocityTotal | WindVelocity | SpeedOfSound => "m/s",
            AccelerationZ | AccelerationXY | AccelerationTotal | Gravity | CoriolisAcceleration => "m/s²",
            Latitude | Longitude | LateralDirection | OrientationTheta | OrientationPhi | AngleOfAttack => "rad",
            RollRate | PitchRate | YawRate => "rad/s",
            Mass | MotorMass => "kg",
            LongitudinalInertia | RotationalInertia => "kg·m²",
            ReferenceArea => "m²",
            Thrust | DragForce => "N",
            AirTemperature => "K",
            AirPressure => "Pa",
            _ => "",
        }
    }
}

/// Time series and event log of one continuous flight path.
///
/// Append-only: [`add_point`](Self::add_point) opens a new sample and
/// [`set_value`](Self::set_value) fills channels of the latest sample.
/// After [`immute`](Self::immute) every write fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightDataBranch {
    name: String,
    samples: usize,
    channels: IndexMap<FlightDataType, Vec<f64>>,
    events: Vec<FlightEvent>,
    optimum_altitude: f64,
    time_to_optimum_altitude: f64,
    mutable: bool,
}

impl FlightDataBranch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: 0,
            channels: IndexMap::new(),
            events: Vec::new(),
            optimum_altitude: f64::NAN,
            time_to_optimum_altitude: f64::NAN,
            mutable: true,
        }
    }

    /// Copy of `parent` for a booster separating as `stage`: all samples
    /// plus the parent events raised by that stage, except separations.
    pub fn fork(&self, name: impl Into<String>, stage: usize) -> Self {
        let events = self
            .events
            .iter()
            .filter(|e| e.source_stage() == Some(stage) && e.kind != EventType::StageSeparation)
            .cloned()
            .collect();
        Self {
            name: name.into(),
            samples: self.samples,
            channels: self.channels.clone(),
            events,
            optimum_altitude: f64::NAN,
            time_to_optimum_altitude: f64::NAN,
            mutable: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }

    fn check_mutable(&self) -> Result<(), SimulationError> {
        if self.mutable {
            Ok(())
        } else {
            Err(SimulationError::BranchFinalized(self.name.clone()))
        }
    }

    /// Opens a new sample; every channel starts as NaN.
    pub fn add_point(&mut self) -> Result<(), SimulationError> {
        self.check_mutable()?;
        self.samples += 1;
        for values in self.channels.values_mut() {
            values.push(f64::NAN);
        }
        Ok(())
    }

    /// Sets `kind` in the latest sample, creating the channel if needed.
    pub fn set_value(&mut self, kind: FlightDataType, value: f64) -> Result<(), SimulationError> {
        self.check_mutable()?;
        if self.samples == 0 {
            self.add_point()?;
        }
        let samples = self.samples;
        let values = self
            .channels
            .entry(kind)
            .or_insert_with(|| vec![f64::NAN; samples]);
        if let Some(last) = values.last_mut() {
            *last = value;
        }
        Ok(())
    }

    pub fn get(&self, kind: FlightDataType) -> Option<&[f64]> {
        self.channels.get(&kind).map(Vec::as_slice)
    }

    /// Latest value of `kind`, NaN if never recorded.
    pub fn last(&self, kind: FlightDataType) -> f64 {
        self.get(kind).and_then(|v| v.last().copied()).unwrap_or(f64::NAN)
    }

    /// Smallest non-NaN value, NaN if none.
    pub fn min(&self, kind: FlightDataType) -> f64 {
        self.get(kind)
            .into_iter()
            .flatten()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::min)
            .unwrap_or(f64::NAN)
    }

    /// Largest non-NaN value, NaN if none.
    pub fn max(&self, kind: FlightDataType) -> f64 {
        self.get(kind)
            .into_iter()
            .flatten()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::max)
            .unwrap_or(f64::NAN)
    }

    /// Value of `kind` at `time`, linearly interpolated between samples.
    pub fn value_at(&self, kind: FlightDataType, time: f64) -> f64 {
        let (Some(times), Some(values)) = (self.get(FlightDataType::Time), self.get(kind)) else {
            return f64::NAN;
        };
        let upper = times.partition_point(|t| *t < time);
        if upper == 0 {
            return values.first().copied().unwrap_or(f64::NAN);
        }
        if upper >= times.len() {
            return values.last().copied().unwrap_or(f64::NAN);
        }
        let (t0, t1) = (times[upper - 1], times[upper]);
        let (v0, v1) = (values[upper - 1], values[upper]);
        if t1 - t0 <= 0.0 {
            return v1;
        }
        v0 + (v1 - v0) * (time - t0) / (t1 - t0)
    }

    /// Recorded channels in first-write order.
    pub fn types(&self) -> impl Iterator<Item = FlightDataType> + '_ {
        self.channels.keys().copied()
    }

    pub fn events(&self) -> &[FlightEvent] {
        &self.events
    }

    pub fn add_event(&mut self, event: FlightEvent) -> Result<(), SimulationError> {
        self.check_mutable()?;
        self.events.push(event);
        Ok(())
    }

    pub fn first_event(&self, kind: EventType) -> Option<&FlightEvent> {
        self.events.iter().find(|e| e.kind == kind)
    }

    pub fn last_event(&self, kind: EventType) -> Option<&FlightEvent> {
        self.events.iter().rev().find(|e| e.kind == kind)
    }

    /// Cause of the first recorded `SIM_ABORT`, if any.
    pub fn abort_cause(&self) -> Option<AbortCause> {
        self.first_event(EventType::SimAbort).and_then(FlightEvent::abort_cause)
    }

    pub fn optimum_altitude(&self) -> f64 {
        self.optimum_altitude
    }

    pub fn time_to_optimum_altitude(&self) -> f64 {
        self.time_to_optimum_altitude
    }

    pub fn set_optimum_altitude(&mut self, altitude: f64, time: f64) -> Result<(), SimulationError> {
        self.check_mutable()?;
        self.optimum_altitude = altitude;
        self.time_to_optimum_altitude = time;
        Ok(())
    }

    /// Finalizes the branch.
    pub fn immute(&mut self) {
        self.mutable = false;
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// CSV export of the given channels (all channels when empty). Events
    /// are written as leading comment lines; NaN cells are left blank.
    pub fn to_csv(&self, kinds: &[FlightDataType]) -> String {
        let kinds: Vec<FlightDataType> = if kinds.is_empty() {
            self.types().collect()
        } else {
            kinds.to_vec()
        };
        let mut out = String::new();
        let _ = writeln!(out, "# {}", self.name);
        for event in &self.events {
            let _ = writeln!(out, "# Event {} occurred at t={:.3} seconds", event.kind, event.time);
        }
        let header: Vec<String> = kinds
            .iter()
            .map(|k| match k.unit() {
                "" => k.name().to_string(),
                unit => format!("{} ({unit})", k.name()),
            })
            .collect();
        let _ = writeln!(out, "{}", header.join(","));
        for i in 0..self.samples {
            let row: Vec<String> = kinds
                .iter()
                .map(|k| match self.get(*k).and_then(|v| v.get(i)) {
                    Some(v) if !v.is_nan() => format!("{v}"),
                    _ => String::new(),
                })
                .collect();
            let _ = writeln!(out, "{}", row.join(","));
        }
        out
    }
}

/// How one branch ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BranchOutcome {
    Completed,
    Aborted(AbortCause),
    Failed(SimulationError),
}

/// Result of a simulation: one branch per flight path plus every warning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightData {
    branches: Vec<FlightDataBranch>,
    outcomes: Vec<BranchOutcome>,
    warnings: WarningSet,
}

impl FlightData {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_branch(&mut self, branch: FlightDataBranch, outcome: BranchOutcome, warnings: &WarningSet) {
        self.branches.push(branch);
        self.outcomes.push(outcome);
        self.warnings.add_all(warnings);
    }

    pub fn branches(&self) -> &[FlightDataBranch] {
        &self.branches
    }

    pub fn branch(&self, index: usize) -> Option<&FlightDataBranch> {
        self.branches.get(index)
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    pub fn outcomes(&self) -> &[BranchOutcome] {
        &self.outcomes
    }

    pub fn warnings(&self) -> &WarningSet {
        &self.warnings
    }

    fn main_value(&self, f: impl FnOnce(&FlightDataBranch) -> f64) -> f64 {
        self.branches.first().map_or(f64::NAN, f)
    }

    pub fn max_altitude(&self) -> f64 {
        self.main_value(|b| b.max(FlightDataType::Altitude))
    }

    pub fn max_velocity(&self) -> f64 {
        self.main_value(|b| b.max(FlightDataType::VelocityTotal))
    }

    pub fn max_acceleration(&self) -> f64 {
        self.main_value(|b| b.max(FlightDataType::AccelerationTotal))
    }

    /// Time of the main branch's apogee, falling back to the time of its
    /// highest sample.
    pub fn time_to_apogee(&self) -> f64 {
        self.main_value(|b| match b.first_event(EventType::Apogee) {
            Some(event) => event.time,
            None => {
                let (Some(times), Some(alts)) = (b.get(FlightDataType::Time), b.get(FlightDataType::Altitude))
                else {
                    return f64::NAN;
                };
                alts.iter()
                    .zip(times)
                    .filter(|(a, _)| !a.is_nan())
                    .max_by(|a, b| a.0.total_cmp(b.0))
                    .map_or(f64::NAN, |(_, t)| *t)
            }
        })
    }

    pub fn flight_time(&self) -> f64 {
        self.main_value(|b| match b.first_event(EventType::GroundHit) {
            Some(event) => event.time,
            None => b.last(FlightDataType::Time),
        })
    }

    pub fn ground_hit_velocity(&self) -> f64 {
        self.main_value(|b| match b.first_event(EventType::GroundHit) {
            Some(event) => b.value_at(FlightDataType::VelocityTotal, event.time),
            None => f64::NAN,
        })
    }

    pub fn deployment_velocity(&self) -> f64 {
        self.main_value(|b| match b.first_event(EventType::RecoveryDeviceDeployment) {
            Some(event) => b.value_at(FlightDataType::VelocityTotal, event.time),
            None => f64::NAN,
        })
    }

    pub fn optimum_altitude(&self) -> f64 {
        self.main_value(FlightDataBranch::optimum_altitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyward_types::ComponentRef;

    #[test]
    fn channels_created_late_are_padded() {
        let mut b = FlightDataBranch::new("main");
        b.add_point().unwrap();
        b.set_value(FlightDataType::Time, 0.0).unwrap();
        b.add_point().unwrap();
        b.set_value(FlightDataType::Time, 1.0).unwrap();
        b.set_value(FlightDataType::Thrust, 5.0).unwrap();
        let thrust = b.get(FlightDataType::Thrust).unwrap();
        assert!(thrust[0].is_nan());
        assert_eq!(thrust[1], 5.0);
        assert_eq!(b.max(FlightDataType::Thrust), 5.0);
    }

    #[test]
    fn finalized_branch_rejects_writes() {
        let mut b = FlightDataBranch::new("main");
        b.immute();
        assert_eq!(b.add_point(), Err(SimulationError::BranchFinalized("main".into())));
        assert!(b.add_event(FlightEvent::new(EventType::Launch, 0.0)).is_err());
    }

    #[test]
    fn fork_keeps_stage_events_only() {
        let mut b = FlightDataBranch::new("main");
        b.add_event(FlightEvent::new(EventType::Launch, 0.0)).unwrap();
        b.add_event(FlightEvent::with_source(EventType::Burnout, 1.0, ComponentRef::Stage(1)))
            .unwrap();
        b.add_event(FlightEvent::with_source(EventType::StageSeparation, 1.0, ComponentRef::Stage(1)))
            .unwrap();
        let fork = b.fork("booster", 1);
        assert_eq!(fork.events().len(), 1);
        assert_eq!(fork.events()[0].kind, EventType::Burnout);
    }

    #[test]
    fn interpolated_lookup() {
        let mut b = FlightDataBranch::new("main");
        for (t, v) in [(0.0, 0.0), (1.0, 10.0)] {
            b.add_point().unwrap();
            b.set_value(FlightDataType::Time, t).unwrap();
            b.set_value(FlightDataType::VelocityTotal, v).unwrap();
        }
        assert_eq!(b.value_at(FlightDataType::VelocityTotal, 0.25), 2.5);
    }

    #[test]
    fn csv_blanks_nan_cells() {
        let mut b = FlightDataBranch::new("main");
        b.add_point().unwrap();
        b.set_value(FlightDataType::Time, 0.5).unwrap();
        b.set_value(FlightDataType::Mach, f64::NAN).unwrap();
        let csv = b.to_csv(&[]);
        assert!(csv.contains("Time (s),Mach number"));
        assert!(csv.contains("0.5,\n"));
    }
}
