//! Line entity.

use serde::{Deserialize, Serialize};

use crate::types::Vector3;

/// A line between two endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Vector3,
    pub end: Vector3,
    pub thickness: f64,
    pub extrusion: Vector3,
}

impl Line {
    /// Length of the line.
    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    /// Midpoint of the line.
    pub fn midpoint(&self) -> Vector3 {
        (self.start + self.end) * 0.5
    }
}
