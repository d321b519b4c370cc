//! Which stages take part in a flight.
//!
//! A [`FlightConfiguration`] pairs a shared [`Rocket`] with a [`StageSet`]
//! of active stages. Separation detaches an assembly from the set; the
//! engine forks the configuration so each branch flies its own subset.

use std::sync::Arc;

use bitvec::order::Lsb0;
use bitvec::vec::BitVec;
use serde::{Deserialize, Serialize};
use skyward_types::{ComponentRef, DeviceKey, MotorKey};

use crate::components::{MotorMount, RecoveryDevice};
use crate::rocket::Rocket;
use crate::stage::Stage;

/// Bit set of active stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSet {
    bits: BitVec<u64, Lsb0>,
}

impl StageSet {
    /// All `count` stages active.
    pub fn all(count: usize) -> Self {
        Self {
            bits: BitVec::repeat(true, count),
        }
    }

    /// No stage active.
    pub fn none(count: usize) -> Self {
        Self {
            bits: BitVec::repeat(false, count),
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Out-of-range stages are inactive.
    pub fn is_active(&self, stage: usize) -> bool {
        self.bits.get(stage).map(|bit| *bit).unwrap_or(false)
    }

    pub fn set(&mut self, stage: usize, active: bool) {
        if stage < self.bits.len() {
            self.bits.set(stage, active);
        }
    }

    /// Deactivates stage `n` and everything below it.
    pub fn clear_from(&mut self, n: usize) {
        if n < self.bits.len() {
            self.bits[n..].fill(false);
        }
    }

    /// Deactivates every stage above stage `n`.
    pub fn clear_before(&mut self, n: usize) {
        let end = n.min(self.bits.len());
        self.bits[..end].fill(false);
    }

    pub fn set_all(&mut self) {
        self.bits.fill(true);
    }

    /// Active stage numbers in ascending order.
    pub fn active(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    pub fn count_active(&self) -> usize {
        self.bits.count_ones()
    }
}

/// A rocket together with the set of stages currently attached.
#[derive(Debug, Clone)]
pub struct FlightConfiguration {
    rocket: Arc<Rocket>,
    stages: StageSet,
}

impl FlightConfiguration {
    /// All stages active.
    pub fn new(rocket: Arc<Rocket>) -> Self {
        let stages = StageSet::all(rocket.stage_count());
        Self { rocket, stages }
    }

    pub fn rocket(&self) -> &Arc<Rocket> {
        &self.rocket
    }

    pub fn stages(&self) -> &StageSet {
        &self.stages
    }

    pub fn stage_count(&self) -> usize {
        self.rocket.stage_count()
    }

    pub fn is_stage_active(&self, stage: usize) -> bool {
        self.stages.is_active(stage)
    }

    pub fn set_stage_active(&mut self, stage: usize, active: bool) {
        self.stages.set(stage, active);
    }

    /// Drops the assembly that separates as stage `n`: a parallel booster
    /// alone, or a serial stage with everything below it. This is what the
    /// remaining rocket keeps after a separation.
    pub fn detach(&mut self, n: usize) {
        for m in self.rocket.assembly(n) {
            self.stages.set(m, false);
        }
    }

    /// Keeps only the assembly that separates as stage `n` (what the
    /// separated booster flies).
    pub fn isolate(&mut self, n: usize) {
        let assembly = self.rocket.assembly(n);
        self.stages.clear_before(assembly.start);
        self.stages.clear_from(assembly.end);
    }

    pub fn set_all_stages(&mut self) {
        self.stages.set_all();
    }

    pub fn active_stages(&self) -> Vec<usize> {
        self.stages.active().collect()
    }

    pub fn has_active_stages(&self) -> bool {
        self.stages.count_active() > 0
    }

    /// Topmost active stage (lowest number).
    pub fn top_active_stage(&self) -> Option<usize> {
        self.stages.active().next()
    }

    /// Bottom-most active serial stage. A branch flying only parallel
    /// boosters reports the last of them.
    pub fn bottom_active_stage(&self) -> Option<usize> {
        self.stages
            .active()
            .filter(|n| !self.rocket.is_parallel(*n))
            .last()
            .or_else(|| self.stages.active().last())
    }

    /// Active parallel boosters.
    pub fn active_parallel_stages(&self) -> impl Iterator<Item = (usize, &Stage)> + '_ {
        self.active_stage_iter().filter(|(_, stage)| stage.is_parallel())
    }

    /// Active stages paired with their descriptions.
    pub fn active_stage_iter(&self) -> impl Iterator<Item = (usize, &Stage)> + '_ {
        self.stages
            .active()
            .filter_map(move |n| self.rocket.stage(n).map(|stage| (n, stage)))
    }

    /// Whether the component is still attached in this configuration.
    /// The rocket itself always is.
    pub fn is_component_active(&self, component: ComponentRef) -> bool {
        match component.stage() {
            Some(n) => self.is_stage_active(n),
            None => true,
        }
    }

    pub fn active_motor_mounts(&self) -> impl Iterator<Item = (MotorKey, &MotorMount)> + '_ {
        self.active_stage_iter().flat_map(|(n, stage)| {
            stage
                .motors
                .iter()
                .enumerate()
                .map(move |(i, mount)| (MotorKey::new(n, i), mount))
        })
    }

    pub fn active_recovery_devices(&self) -> impl Iterator<Item = (DeviceKey, &RecoveryDevice)> + '_ {
        self.active_stage_iter().flat_map(|(n, stage)| {
            stage
                .recovery
                .iter()
                .enumerate()
                .map(move |(i, device)| (DeviceKey::new(n, i), device))
        })
    }

    pub fn has_motors(&self) -> bool {
        self.active_motor_mounts().next().is_some()
    }

    pub fn has_recovery_device(&self) -> bool {
        self.active_recovery_devices().next().is_some()
    }

    /// Axial position of the front of the topmost active stage.
    pub fn front_position(&self) -> f64 {
        self.top_active_stage().map_or(0.0, |n| self.rocket.stage_offset(n))
    }

    /// Distance from the front of the topmost active stage to the aftmost
    /// end of any active stage (m).
    pub fn length_aerodynamic(&self) -> f64 {
        let front = self.front_position();
        self.active_stage_iter()
            .map(|(n, s)| self.rocket.stage_offset(n) + s.length - front)
            .fold(0.0, f64::max)
    }

    /// Largest active body diameter (m).
    pub fn reference_length(&self) -> f64 {
        self.active_stage_iter().map(|(_, s)| s.diameter).fold(0.0, f64::max)
    }

    /// Frontal area of the largest active body (m²).
    pub fn reference_area(&self) -> f64 {
        let d = self.reference_length();
        std::f64::consts::PI * 0.25 * d * d
    }
}
