//! Aerodynamic models.
//!
//! Axial positions are measured aft from the front of the topmost active
//! stage. Normal-force and moment coefficients are expressed in the
//! "theta frame": the body frame rolled so that the lateral airflow lies
//! along +x.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use skyward_rocket::FlightConfiguration;
use skyward_types::constants::{EPSILON, LARGE_AOA};
use skyward_types::{DeviceKey, Warning, WarningSet};
use tracing::trace;

use crate::atmosphere::AtmosphericConditions;

/// Flow state seen by the rocket at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightConditions {
    pub reference_length: f64,
    pub reference_area: f64,
    /// Airspeed magnitude (m/s).
    pub velocity: f64,
    pub mach: f64,
    /// Angle of attack (rad), in `[0, π]`.
    pub aoa: f64,
    /// Roll angle of the lateral airflow around the body axis (rad).
    pub theta: f64,
    pub roll_rate: f64,
    pub pitch_rate: f64,
    pub yaw_rate: f64,
    pub atmosphere: AtmosphericConditions,
}

impl FlightConditions {
    /// Conditions at rest in the standard atmosphere.
    pub fn new(reference_length: f64, reference_area: f64) -> Self {
        Self {
            reference_length,
            reference_area,
            velocity: 0.0,
            mach: 0.0,
            aoa: 0.0,
            theta: 0.0,
            roll_rate: 0.0,
            pitch_rate: 0.0,
            yaw_rate: 0.0,
            atmosphere: AtmosphericConditions::default(),
        }
    }

    /// Dynamic pressure `½ρv²` (Pa).
    pub fn dynamic_pressure(&self) -> f64 {
        0.5 * self.atmosphere.density() * self.velocity * self.velocity
    }
}

/// Coefficients produced by an [`AerodynamicCalculator`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AerodynamicForces {
    /// Centre of pressure (m from the front of the active stack).
    pub cp: f64,
    /// Normal-force slope CNα weighting the CP. Zero means no CP is known.
    pub cn_alpha: f64,
    pub cn: f64,
    pub cm: f64,
    pub cside: f64,
    pub cyaw: f64,
    pub croll: f64,
    /// Total drag coefficient along the airflow.
    pub cd: f64,
    /// Drag coefficient along the body axis.
    pub cd_axial: f64,
    pub friction_cd: f64,
    pub pressure_cd: f64,
    pub base_cd: f64,
    pub pitch_damping_moment: f64,
    pub yaw_damping_moment: f64,
}

/// Computes aerodynamic coefficients for the active configuration.
pub trait AerodynamicCalculator: Send + Sync + Debug {
    /// Full set of coefficients. Model-validity warnings go to `warnings`.
    fn forces(
        &self,
        configuration: &FlightConfiguration,
        conditions: &FlightConditions,
        warnings: &mut WarningSet,
    ) -> AerodynamicForces;

    /// Centre of pressure and its weight (CNα).
    fn cp(&self, configuration: &FlightConfiguration, conditions: &FlightConditions) -> (f64, f64);
}

/// Subsonic Barrowman method: nose cone and fin-set normal forces, skin
/// friction, pressure and base drag, and quadratic pitch damping.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarrowmanAerodynamics;

struct CpContribution {
    cn_alpha: f64,
    position: f64,
}

impl BarrowmanAerodynamics {
    pub fn new() -> Self {
        Self
    }

    fn contributions(&self, configuration: &FlightConfiguration) -> Option<Vec<CpContribution>> {
        let rocket = configuration.rocket();
        let front = configuration.front_position();
        let top = configuration.top_active_stage()?;
        // An open forward end has no meaningful CP.
        if rocket.stage(top)?.nose.is_none() {
            return None;
        }

        let reference = configuration.reference_length();
        if reference <= EPSILON {
            return None;
        }

        let mut parts = Vec::new();
        for (n, stage) in configuration.active_stage_iter() {
            let offset = rocket.stage_offset(n) - front;
            if let Some(nose) = stage.nose {
                let area_ratio = (stage.diameter / reference).powi(2);
                parts.push(CpContribution {
                    cn_alpha: 2.0 * area_ratio,
                    position: offset + nose.shape.cp_fraction() * nose.length,
                });
            }
            let radius = 0.5 * stage.diameter;
            for fins in &stage.fins {
                let (cr, ct, s) = (fins.root_chord, fins.tip_chord, fins.span);
                let lf = fins.mid_chord_length();
                let interference = 1.0 + radius / (s + radius);
                let cn_alpha = interference * (4.0 * fins.count as f64 * (s / reference).powi(2))
                    / (1.0 + (1.0 + (2.0 * lf / (cr + ct)).powi(2)).sqrt());
                let xf = fins.sweep * (cr + 2.0 * ct) / (3.0 * (cr + ct))
                    + (cr + ct - cr * ct / (cr + ct)) / 6.0;
                parts.push(CpContribution {
                    cn_alpha,
                    position: offset + fins.position + xf,
                });
            }
        }
        Some(parts)
    }

    fn friction_cd(&self, configuration: &FlightConfiguration, conditions: &FlightConditions) -> f64 {
        let area = configuration.reference_area();
        let length = configuration.length_aerodynamic();
        if area <= EPSILON || length <= EPSILON {
            return 0.0;
        }
        let nu = conditions.atmosphere.kinematic_viscosity();
        let reynolds = conditions.velocity * length / nu.max(EPSILON);
        let cf = if reynolds < 1.0e4 {
            1.48e-2
        } else {
            1.0 / (1.50 * reynolds.ln() - 5.6).powi(2)
        };
        let mut body_wet = 0.0;
        let mut fin_wet = 0.0;
        let mut fin_thickness_ratio = 0.0;
        for (_, stage) in configuration.active_stage_iter() {
            body_wet += std::f64::consts::PI * stage.diameter * stage.length;
            for fins in &stage.fins {
                let wet = 2.0 * fins.count as f64 * fins.single_fin_area();
                fin_wet += wet;
                fin_thickness_ratio += wet * fins.thickness / fins.root_chord.max(EPSILON);
            }
        }
        let fineness = length / configuration.reference_length().max(EPSILON);
        let body = cf * (1.0 + 1.0 / (2.0 * fineness)) * body_wet;
        let fin = if fin_wet > 0.0 {
            cf * (fin_wet + 2.0 * fin_thickness_ratio)
        } else {
            0.0
        };
        (body + fin) / area
    }

    fn pressure_cd(&self, configuration: &FlightConfiguration) -> f64 {
        let area = configuration.reference_area();
        if area <= EPSILON {
            return 0.0;
        }
        let mut drag_area = 0.0;
        let top = configuration.top_active_stage();
        let blunt = configuration
            .active_stage_iter()
            .filter(|(n, stage)| stage.nose.is_none() && (Some(*n) == top || stage.is_parallel()));
        for (_, stage) in blunt {
            drag_area += 0.8 * stage.frontal_area();
        }
        for (_, stage) in configuration.active_stage_iter() {
            if let Some(nose) = stage.nose {
                let fineness = nose.length / stage.diameter.max(EPSILON);
                drag_area += 0.05 / fineness.max(1.0) * stage.frontal_area();
            }
            for fins in &stage.fins {
                drag_area += 0.17 * fins.count as f64 * fins.span * fins.thickness;
            }
        }
        drag_area / area
    }

    fn base_cd(&self, configuration: &FlightConfiguration, mach: f64) -> f64 {
        let area = configuration.reference_area();
        let Some(bottom) = configuration.bottom_active_stage() else {
            return 0.0;
        };
        let Some(stage) = configuration.rocket().stage(bottom) else {
            return 0.0;
        };
        if area <= EPSILON {
            return 0.0;
        }
        let pods: f64 = configuration
            .active_parallel_stages()
            .filter(|(n, _)| *n != bottom)
            .map(|(_, pod)| pod.frontal_area())
            .sum();
        (0.12 + 0.13 * mach * mach) * (stage.frontal_area() + pods) / area
    }

    fn damping(&self, configuration: &FlightConfiguration, rate: f64, velocity: f64) -> f64 {
        let area = configuration.reference_area();
        let reference = configuration.reference_length();
        let length = configuration.length_aerodynamic();
        if area <= EPSILON || reference <= EPSILON {
            return 0.0;
        }
        let rocket = configuration.rocket();
        let front = configuration.front_position();
        let mid = 0.5 * length;
        let body = 0.275 * reference * length.powi(4) / (area * reference);
        let mut fins_term = 0.0;
        for (n, stage) in configuration.active_stage_iter() {
            let offset = rocket.stage_offset(n) - front;
            for fins in &stage.fins {
                let arm = (offset + fins.position + 0.5 * fins.root_chord - mid).abs();
                fins_term += 0.6 * (fins.count.min(4) as f64) * fins.single_fin_area() * arm.powi(3)
                    / (area * reference);
            }
        }
        let v2 = (velocity * velocity).max(1.0);
        (body + fins_term) * rate * rate.abs() / v2
    }
}

impl AerodynamicCalculator for BarrowmanAerodynamics {
    fn forces(
        &self,
        configuration: &FlightConfiguration,
        conditions: &FlightConditions,
        warnings: &mut WarningSet,
    ) -> AerodynamicForces {
        let (cp, cn_alpha) = self.cp(configuration, conditions);
        if cn_alpha <= EPSILON && configuration.has_active_stages() {
            trace!(top = ?configuration.top_active_stage(), "no normal force from the forward airframe");
            warnings.add(Warning::OpenAirframeForward);
        }
        if conditions.aoa > LARGE_AOA {
            trace!(aoa = conditions.aoa, "angle of attack beyond model range");
            warnings.add(Warning::LargeAoA(conditions.aoa));
        }
        if conditions.mach > 1.0 {
            trace!(mach = conditions.mach, "supersonic flight");
            warnings.add(Warning::Supersonic);
        }

        let reference = configuration.reference_length().max(EPSILON);
        let cn = cn_alpha * conditions.aoa.sin();
        let pitch_damping_moment = self.damping(configuration, conditions.pitch_rate, conditions.velocity);
        let yaw_damping_moment = self.damping(configuration, conditions.yaw_rate, conditions.velocity);

        let friction_cd = self.friction_cd(configuration, conditions);
        let pressure_cd = self.pressure_cd(configuration);
        let base_cd = self.base_cd(configuration, conditions.mach);
        let cd = friction_cd + pressure_cd + base_cd;

        AerodynamicForces {
            cp,
            cn_alpha,
            cn,
            cm: cn * cp / reference - pitch_damping_moment,
            cside: 0.0,
            cyaw: -yaw_damping_moment,
            croll: 0.0,
            cd,
            cd_axial: cd * conditions.aoa.cos(),
            friction_cd,
            pressure_cd,
            base_cd,
            pitch_damping_moment,
            yaw_damping_moment,
        }
    }

    fn cp(&self, configuration: &FlightConfiguration, _conditions: &FlightConditions) -> (f64, f64) {
        let Some(parts) = self.contributions(configuration) else {
            return (0.0, 0.0);
        };
        let weight: f64 = parts.iter().map(|p| p.cn_alpha).sum();
        if weight <= EPSILON {
            return (0.0, 0.0);
        }
        let moment: f64 = parts.iter().map(|p| p.cn_alpha * p.position).sum();
        (moment / weight, weight)
    }
}

const FIN_EFFICIENCY: [f64; 8] = [0.0, 0.5, 1.0, 1.41, 1.81, 1.73, 1.90, 1.85];

/// Drag coefficient of a tumbling airframe, referenced to the
/// configuration's reference area.
pub fn tumble_drag_coefficient(configuration: &FlightConfiguration) -> f64 {
    let area = configuration.reference_area();
    if area <= EPSILON {
        return 0.0;
    }
    let mut fin_term = 0.0;
    let mut body_term = 0.0;
    for (_, stage) in configuration.active_stage_iter() {
        for fins in &stage.fins {
            let n = (fins.count as usize).min(7);
            fin_term += fins.single_fin_area() * FIN_EFFICIENCY[n];
        }
        body_term += stage.length * stage.diameter;
    }
    (1.42 * fin_term + 0.56 * body_term) / area
}

/// Drag coefficient of the deployed recovery devices, referenced to the
/// configuration's reference area.
pub fn landing_drag_coefficient(configuration: &FlightConfiguration, deployed: &[DeviceKey]) -> f64 {
    let area = configuration.reference_area();
    if area <= EPSILON {
        return 0.0;
    }
    let rocket = configuration.rocket();
    let drag_area: f64 = deployed
        .iter()
        .filter(|key| configuration.is_stage_active(key.stage))
        .filter_map(|key| rocket.recovery_device(*key))
        .map(|device| device.drag_area())
        .sum();
    drag_area / area
}
