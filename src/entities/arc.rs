//! Arc entity.

use serde::{Deserialize, Serialize};

use crate::types::Vector3;

use super::normalize_degrees;

/// A circular arc.
///
/// Angles are stored in radians exactly as read from the file; the
/// degree-normalized values are available through the helpers and the
/// `dxf()` view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub center: Vector3,
    pub radius: f64,
    /// Start angle in radians, as read
    pub start_angle: f64,
    /// End angle in radians, as read
    pub end_angle: f64,
    pub thickness: f64,
    pub extrusion: Vector3,
}

impl Arc {
    /// Start angle in degrees, normalized to `[0, 360)`.
    pub fn start_angle_degrees(&self) -> f64 {
        normalize_degrees(self.start_angle)
    }

    /// End angle in degrees, normalized to `[0, 360)`.
    pub fn end_angle_degrees(&self) -> f64 {
        normalize_degrees(self.end_angle)
    }
}
