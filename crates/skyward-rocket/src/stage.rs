//! A single stage of a rocket.

use serde::{Deserialize, Serialize};
use skyward_types::{SkywardError, SkywardResult};

use crate::components::{FinSet, MotorMount, NoseCone, RecoveryDevice};
use crate::triggers::SeparationTrigger;

/// Placement of a parallel booster strapped to the side of a core stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParallelMount {
    /// Index of the core stage carrying the booster.
    pub parent: usize,
    /// Front of the booster, aft of the front of the core stage (m).
    pub position: f64,
}

/// One stage: a body tube with optional nose, fins, motors and recovery.
///
/// Serial stages stack along the rocket axis. A stage with a
/// [`ParallelMount`] is a strap-on booster that rides beside its core stage
/// and separates on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    /// Axial length including the nose cone (m).
    pub length: f64,
    /// Body diameter (m).
    pub diameter: f64,
    /// Structure mass without motors (kg).
    pub dry_mass: f64,
    /// Structure CG from the stage front (m).
    pub dry_cg: f64,
    #[serde(default)]
    pub nose: Option<NoseCone>,
    #[serde(default)]
    pub fins: Vec<FinSet>,
    #[serde(default)]
    pub motors: Vec<MotorMount>,
    #[serde(default)]
    pub recovery: Vec<RecoveryDevice>,
    #[serde(default)]
    pub parallel: Option<ParallelMount>,
    /// How this stage separates from the stage it hangs on. Unused for stage 0.
    #[serde(default)]
    pub separation: SeparationTrigger,
    #[serde(default)]
    pub separation_delay: f64,
}

impl Stage {
    pub fn new(name: impl Into<String>, length: f64, diameter: f64, dry_mass: f64, dry_cg: f64) -> Self {
        Self {
            name: name.into(),
            length,
            diameter,
            dry_mass,
            dry_cg,
            nose: None,
            fins: Vec::new(),
            motors: Vec::new(),
            recovery: Vec::new(),
            parallel: None,
            separation: SeparationTrigger::UpperIgnition,
            separation_delay: 0.0,
        }
    }

    pub fn with_nose(mut self, nose: NoseCone) -> Self {
        self.nose = Some(nose);
        self
    }

    pub fn with_fins(mut self, fins: FinSet) -> Self {
        self.fins.push(fins);
        self
    }

    pub fn with_motor(mut self, mount: MotorMount) -> Self {
        self.motors.push(mount);
        self
    }

    pub fn with_recovery(mut self, device: RecoveryDevice) -> Self {
        self.recovery.push(device);
        self
    }

    pub fn with_separation(mut self, trigger: SeparationTrigger, delay: f64) -> Self {
        self.separation = trigger;
        self.separation_delay = delay;
        self
    }

    /// Straps this stage to the side of stage `parent`, `position` metres
    /// aft of its front.
    pub fn strapped_to(mut self, parent: usize, position: f64) -> Self {
        self.parallel = Some(ParallelMount { parent, position });
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel.is_some()
    }

    /// Frontal area of the body tube (m²).
    pub fn frontal_area(&self) -> f64 {
        std::f64::consts::PI * 0.25 * self.diameter * self.diameter
    }

    pub(crate) fn validate(&self) -> SkywardResult<()> {
        let invalid = |msg: String| Err(SkywardError::InvalidRocket(format!("stage {}: {msg}", self.name)));
        if !non_negative(self.length) || !non_negative(self.diameter) {
            return invalid("length and diameter must be non-negative".into());
        }
        if !non_negative(self.dry_mass) || !non_negative(self.dry_cg) {
            return invalid("dry mass and CG must be non-negative".into());
        }
        if let Some(mount) = &self.parallel {
            if !non_negative(mount.position) {
                return invalid("parallel mount position must be non-negative".into());
            }
        }
        if let Some(nose) = &self.nose {
            if nose.length > self.length {
                return invalid(format!("nose length {} exceeds stage length {}", nose.length, self.length));
            }
        }
        for fins in &self.fins {
            if fins.count == 0 || fins.root_chord <= 0.0 || fins.span <= 0.0 {
                return invalid("fin sets need at least one fin with positive chord and span".into());
            }
        }
        for mount in &self.motors {
            mount.motor.validate()?;
        }
        for device in &self.recovery {
            if device.cd < 0.0 || device.area < 0.0 {
                return invalid(format!("recovery device {} has negative drag area", device.name));
            }
        }
        Ok(())
    }
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
