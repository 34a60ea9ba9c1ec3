//! Point entity.

use serde::{Deserialize, Serialize};

use crate::types::Vector3;

/// A point, with the PDMODE display angle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub location: Vector3,
    pub thickness: f64,
    pub extrusion: Vector3,
    /// Display rotation of the point marker in radians, as read
    pub x_axis_angle: f64,
}
