//! The whole rocket: an ordered stack of stages.

use serde::{Deserialize, Serialize};
use skyward_types::{DeviceKey, MotorKey, SkywardError, SkywardResult};

use std::ops::Range;

use crate::components::{MotorMount, RecoveryDevice};
use crate::stage::Stage;

/// A rocket description. Stage 0 is the topmost stage; axial positions
/// are measured aft from the nose tip of stage 0.
///
/// Stages are listed depth-first: each serial stage is followed by the
/// parallel boosters strapped to it, then the next serial stage. A stage
/// therefore detaches together with every stage listed after it, unless it
/// is a parallel booster, which detaches alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rocket {
    pub name: String,
    pub stages: Vec<Stage>,
}

impl Rocket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn stage(&self, n: usize) -> Option<&Stage> {
        self.stages.get(n)
    }

    pub fn is_parallel(&self, n: usize) -> bool {
        self.stages.get(n).is_some_and(Stage::is_parallel)
    }

    /// Axial position of the front of stage `n` (m). A parallel booster
    /// sits at its mount position along its core stage.
    pub fn stage_offset(&self, n: usize) -> f64 {
        match self.stages.get(n).and_then(|s| s.parallel) {
            Some(mount) => self.stage_offset(mount.parent) + mount.position,
            None => self
                .stages
                .iter()
                .take(n)
                .filter(|s| !s.is_parallel())
                .map(|s| s.length)
                .sum(),
        }
    }

    /// Length of the serial stack (m).
    pub fn total_length(&self) -> f64 {
        self.stages.iter().filter(|s| !s.is_parallel()).map(|s| s.length).sum()
    }

    /// The stage that `n` hangs on: the core of a parallel booster, or the
    /// serial stage above. `None` for stage 0.
    pub fn parent_stage(&self, n: usize) -> Option<usize> {
        let stage = self.stages.get(n)?;
        match stage.parallel {
            Some(mount) => Some(mount.parent),
            None => (0..n).rev().find(|m| !self.is_parallel(*m)),
        }
    }

    /// The next serial stage below serial stage `n`.
    pub fn stage_below(&self, n: usize) -> Option<usize> {
        if self.is_parallel(n) {
            return None;
        }
        (n + 1..self.stages.len()).find(|m| !self.is_parallel(*m))
    }

    /// The serial stage that carries `n`: itself, or the core of a parallel
    /// booster.
    pub fn core_stage(&self, n: usize) -> usize {
        self.stages
            .get(n)
            .and_then(|s| s.parallel)
            .map_or(n, |mount| mount.parent)
    }

    /// Stages that leave the rocket when stage `n` separates.
    pub fn assembly(&self, n: usize) -> Range<usize> {
        if self.is_parallel(n) {
            n..n + 1
        } else {
            n..self.stages.len()
        }
    }

    pub fn motor_mount(&self, key: MotorKey) -> Option<&MotorMount> {
        self.stages.get(key.stage)?.motors.get(key.index)
    }

    pub fn recovery_device(&self, key: DeviceKey) -> Option<&RecoveryDevice> {
        self.stages.get(key.stage)?.recovery.get(key.index)
    }

    /// Every motor mount, stage by stage.
    pub fn motor_keys(&self) -> Vec<MotorKey> {
        self.stages
            .iter()
            .enumerate()
            .flat_map(|(n, s)| (0..s.motors.len()).map(move |i| MotorKey::new(n, i)))
            .collect()
    }

    /// Every recovery device, stage by stage.
    pub fn device_keys(&self) -> Vec<DeviceKey> {
        self.stages
            .iter()
            .enumerate()
            .flat_map(|(n, s)| (0..s.recovery.len()).map(move |i| DeviceKey::new(n, i)))
            .collect()
    }

    /// Validates every stage.
    pub fn validate(&self) -> SkywardResult<()> {
        if self.name.trim().is_empty() {
            return Err(SkywardError::InvalidRocket("rocket name is empty".into()));
        }
        for (n, stage) in self.stages.iter().enumerate() {
            stage.validate()?;
            if let Some(mount) = stage.parallel {
                let core_is_serial = mount.parent < n && !self.is_parallel(mount.parent);
                // Everything between the core and this booster must be a sibling booster.
                let depth_first = (mount.parent + 1..n)
                    .all(|m| self.stages[m].parallel.is_some_and(|other| other.parent == mount.parent));
                if !core_is_serial || !depth_first {
                    return Err(SkywardError::InvalidRocket(format!(
                        "parallel booster {} must directly follow serial stage {} or its other boosters",
                        stage.name, mount.parent
                    )));
                }
            }
        }
        Ok(())
    }

    /// Parses and validates a TOML rocket description.
    pub fn from_toml_str(text: &str) -> SkywardResult<Self> {
        let rocket: Rocket = toml::from_str(text).map_err(|e| SkywardError::Serialization(e.to_string()))?;
        rocket.validate()?;
        tracing::debug!(name = %rocket.name, stages = rocket.stage_count(), "rocket loaded");
        Ok(rocket)
    }

    pub fn to_toml_string(&self) -> SkywardResult<String> {
        toml::to_string_pretty(self).map_err(|e| SkywardError::Serialization(e.to_string()))
    }
}
