//! Motors and their per-flight lifecycle.
//!
//! A [`Motor`] is the static description (thrust curve and masses); a
//! [`MotorState`] tracks one mounted motor through a single flight:
//! `Preignition → Thrusting → Delaying → Spent`.

use serde::{Deserialize, Serialize};
use skyward_types::{MotorKey, SkywardError, SkywardResult};

use crate::components::MotorMount;

/// Static motor description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motor {
    /// Designation, e.g. `"C6"`.
    pub designation: String,
    /// Casing diameter (m).
    pub diameter: f64,
    /// Casing length (m).
    pub length: f64,
    /// Mass before ignition (kg).
    pub launch_mass: f64,
    /// Mass after the propellant is consumed (kg).
    pub burnout_mass: f64,
    /// `[time, thrust]` samples in seconds after ignition and newtons.
    /// Times are strictly increasing and the first sample is at `t = 0`.
    pub thrust_curve: Vec<[f64; 2]>,
}

impl Motor {
    /// Creates a motor from its thrust curve.
    pub fn new(
        designation: impl Into<String>,
        diameter: f64,
        length: f64,
        launch_mass: f64,
        burnout_mass: f64,
        thrust_curve: Vec<[f64; 2]>,
    ) -> Self {
        Self {
            designation: designation.into(),
            diameter,
            length,
            launch_mass,
            burnout_mass,
            thrust_curve,
        }
    }

    /// Time from ignition to burnout (s).
    pub fn burn_time(&self) -> f64 {
        self.thrust_curve.last().map_or(0.0, |p| p[0])
    }

    /// Sample times of the thrust curve, relative to ignition.
    pub fn time_points(&self) -> impl Iterator<Item = f64> + '_ {
        self.thrust_curve.iter().map(|p| p[0])
    }

    /// Thrust at `t` seconds after ignition, linearly interpolated.
    /// Zero before ignition and after burnout.
    pub fn thrust_at(&self, t: f64) -> f64 {
        let curve = &self.thrust_curve;
        if curve.is_empty() || t < 0.0 || t > self.burn_time() {
            return 0.0;
        }
        let upper = curve.partition_point(|p| p[0] <= t);
        if upper == 0 {
            return curve[0][1];
        }
        if upper == curve.len() {
            return curve[upper - 1][1];
        }
        let [t0, f0] = curve[upper - 1];
        let [t1, f1] = curve[upper];
        if t1 - t0 <= 0.0 {
            return f1;
        }
        f0 + (f1 - f0) * (t - t0) / (t1 - t0)
    }

    /// Impulse delivered from ignition until `t` (N·s), trapezoidal.
    pub fn impulse_until(&self, t: f64) -> f64 {
        let mut impulse = 0.0;
        for pair in self.thrust_curve.windows(2) {
            let [t0, f0] = pair[0];
            let [t1, f1] = pair[1];
            if t <= t0 {
                break;
            }
            if t >= t1 {
                impulse += 0.5 * (f0 + f1) * (t1 - t0);
            } else {
                let ft = self.thrust_at(t);
                impulse += 0.5 * (f0 + ft) * (t - t0);
                break;
            }
        }
        impulse
    }

    /// Total impulse (N·s).
    pub fn total_impulse(&self) -> f64 {
        self.impulse_until(self.burn_time())
    }

    /// Average thrust over the burn (N).
    pub fn average_thrust(&self) -> f64 {
        let burn = self.burn_time();
        if burn > 0.0 {
            self.total_impulse() / burn
        } else {
            0.0
        }
    }

    /// Motor mass at `t` seconds after ignition, falling linearly from the
    /// launch mass to the burnout mass over the burn.
    pub fn mass_at(&self, t: f64) -> f64 {
        let burn = self.burn_time();
        if t <= 0.0 || burn <= 0.0 {
            return self.launch_mass;
        }
        if t >= burn {
            return self.burnout_mass;
        }
        self.launch_mass - (self.launch_mass - self.burnout_mass) * t / burn
    }

    /// Checks the thrust curve and masses for consistency.
    pub fn validate(&self) -> SkywardResult<()> {
        let invalid = |msg: &str| {
            Err(SkywardError::InvalidRocket(format!(
                "motor {}: {msg}",
                self.designation
            )))
        };
        if self.thrust_curve.len() < 2 {
            return invalid("thrust curve needs at least two points");
        }
        if self.thrust_curve[0][0] != 0.0 {
            return invalid("thrust curve must start at t = 0");
        }
        if self.thrust_curve.windows(2).any(|p| p[1][0] <= p[0][0]) {
            return invalid("thrust curve times must be strictly increasing");
        }
        if self.thrust_curve.iter().any(|p| p[1] < 0.0 || !p[1].is_finite()) {
            return invalid("thrust must be finite and non-negative");
        }
        if self.burnout_mass < 0.0 || self.launch_mass < self.burnout_mass {
            return invalid("launch mass must be at least the burnout mass");
        }
        Ok(())
    }
}

/// Lifecycle phase of a mounted motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotorPhase {
    Preignition,
    Thrusting,
    /// Burnt out, waiting for the ejection charge.
    Delaying,
    Spent,
}

/// Per-flight state of one mounted motor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorState {
    key: MotorKey,
    phase: MotorPhase,
    ignition_time: Option<f64>,
    burnout_time: Option<f64>,
    ejection_delay: Option<f64>,
}

impl MotorState {
    /// Fresh, unignited state for the motor in `mount`.
    pub fn new(key: MotorKey, mount: &MotorMount) -> Self {
        Self {
            key,
            phase: MotorPhase::Preignition,
            ignition_time: None,
            burnout_time: None,
            ejection_delay: mount.ejection_delay,
        }
    }

    pub fn key(&self) -> MotorKey {
        self.key
    }

    pub fn phase(&self) -> MotorPhase {
        self.phase
    }

    pub fn ignition_time(&self) -> Option<f64> {
        self.ignition_time
    }

    pub fn burnout_time(&self) -> Option<f64> {
        self.burnout_time
    }

    /// Not yet ignited.
    pub fn is_ready(&self) -> bool {
        self.phase == MotorPhase::Preignition
    }

    pub fn is_burning(&self) -> bool {
        self.phase == MotorPhase::Thrusting
    }

    pub fn is_spent(&self) -> bool {
        self.phase == MotorPhase::Spent
    }

    pub fn has_ejection_charge(&self) -> bool {
        self.ejection_delay.is_some()
    }

    /// Delay between burnout and the ejection charge (s), zero if none.
    pub fn ejection_delay(&self) -> f64 {
        self.ejection_delay.unwrap_or(0.0)
    }

    pub fn ignite(&mut self, time: f64) {
        if self.phase == MotorPhase::Preignition {
            self.ignition_time = Some(time);
            self.phase = MotorPhase::Thrusting;
        }
    }

    pub fn burn_out(&mut self, time: f64) {
        if self.phase == MotorPhase::Thrusting {
            self.burnout_time = Some(time);
            self.phase = if self.has_ejection_charge() {
                MotorPhase::Delaying
            } else {
                MotorPhase::Spent
            };
        }
    }

    pub fn expend(&mut self) {
        self.phase = MotorPhase::Spent;
    }

    /// Thrust delivered at absolute simulation `time` (N).
    pub fn thrust_at(&self, motor: &Motor, time: f64) -> f64 {
        match self.ignition_time {
            Some(t0) => motor.thrust_at(time - t0),
            None => 0.0,
        }
    }

    /// Motor mass at absolute simulation `time` (kg).
    pub fn mass_at(&self, motor: &Motor, time: f64) -> f64 {
        match self.ignition_time {
            Some(t0) => motor.mass_at(time - t0),
            None => motor.launch_mass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Motor {
        Motor::new("T1", 0.018, 0.07, 0.03, 0.02, vec![[0.0, 0.0], [1.0, 10.0], [2.0, 0.0]])
    }

    #[test]
    fn interpolates_thrust() {
        let m = triangle();
        assert_eq!(m.thrust_at(0.5), 5.0);
        assert_eq!(m.thrust_at(1.0), 10.0);
        assert_eq!(m.thrust_at(1.5), 5.0);
        assert_eq!(m.thrust_at(-0.1), 0.0);
        assert_eq!(m.thrust_at(2.5), 0.0);
    }

    #[test]
    fn impulse_and_mass() {
        let m = triangle();
        assert!((m.total_impulse() - 10.0).abs() < 1e-12);
        assert!((m.mass_at(1.0) - 0.025).abs() < 1e-12);
        assert_eq!(m.mass_at(3.0), 0.02);
        assert_eq!(m.mass_at(-1.0), 0.03);
    }

    #[test]
    fn lifecycle_with_ejection_charge() {
        let mount = MotorMount::new(triangle(), 0.3).with_ejection_delay(Some(3.0));
        let mut state = MotorState::new(MotorKey::new(0, 0), &mount);
        assert!(state.is_ready());
        state.ignite(1.0);
        assert!(state.is_burning());
        assert_eq!(state.thrust_at(&mount.motor, 2.0), 10.0);
        state.burn_out(3.0);
        assert_eq!(state.phase(), MotorPhase::Delaying);
        state.expend();
        assert!(state.is_spent());
    }

    #[test]
    fn burnout_without_charge_is_spent() {
        let mount = MotorMount::new(triangle(), 0.3);
        let mut state = MotorState::new(MotorKey::new(0, 0), &mount);
        state.ignite(0.0);
        state.burn_out(2.0);
        assert!(state.is_spent());
    }
}
