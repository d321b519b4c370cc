//! Strongly-typed references to rocket components.
//!
//! Stages are numbered from the top: stage 0 is the sustainer, higher
//! numbers are boosters further down the stack.

use serde::{Deserialize, Serialize};

/// Index of a motor mount: the stage it lives in and its position within the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MotorKey {
    pub stage: usize,
    pub index: usize,
}

/// Index of a recovery device within its stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceKey {
    pub stage: usize,
    pub index: usize,
}

/// The component that caused a flight event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentRef {
    /// The rocket as a whole. Always attached.
    Rocket,
    /// A whole stage.
    Stage(usize),
    /// A motor mount.
    Motor(MotorKey),
    /// A recovery device.
    Recovery(DeviceKey),
}

impl ComponentRef {
    /// Stage number the component belongs to, or `None` for the whole rocket.
    pub fn stage(self) -> Option<usize> {
        match self {
            ComponentRef::Rocket => None,
            ComponentRef::Stage(n) => Some(n),
            ComponentRef::Motor(key) => Some(key.stage),
            ComponentRef::Recovery(key) => Some(key.stage),
        }
    }
}

impl MotorKey {
    #[inline]
    pub fn new(stage: usize, index: usize) -> Self {
        Self { stage, index }
    }
}

impl DeviceKey {
    #[inline]
    pub fn new(stage: usize, index: usize) -> Self {
        Self { stage, index }
    }
}

impl From<MotorKey> for ComponentRef {
    fn from(key: MotorKey) -> Self {
        ComponentRef::Motor(key)
    }
}

impl From<DeviceKey> for ComponentRef {
    fn from(key: DeviceKey) -> Self {
        ComponentRef::Recovery(key)
    }
}
