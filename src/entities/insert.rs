//! Block insert entity.

use serde::{Deserialize, Serialize};

use crate::types::{Handle, Vector3};

/// A block reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insert {
    pub insertion: Vector3,
    pub x_scale: f64,
    pub y_scale: f64,
    pub z_scale: f64,
    /// Rotation in radians, as read
    pub rotation: f64,
    pub extrusion: Vector3,
    /// Block header the insert instantiates
    pub block_handle: Handle,
    pub has_attributes: bool,
}

impl Default for Insert {
    fn default() -> Self {
        Self {
            insertion: Vector3::ZERO,
            x_scale: 1.0,
            y_scale: 1.0,
            z_scale: 1.0,
            rotation: 0.0,
            extrusion: Vector3::UNIT_Z,
            block_handle: Handle::NULL,
            has_attributes: false,
        }
    }
}

impl Insert {
    /// Whether the insert is uniformly scaled.
    pub fn is_uniform(&self) -> bool {
        self.x_scale == self.y_scale && self.y_scale == self.z_scale
    }
}
