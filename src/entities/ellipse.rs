//! Ellipse entity.

use serde::{Deserialize, Serialize};

use crate::types::Vector3;

/// An ellipse or elliptical arc.
///
/// The shape is defined by the center, the major-axis endpoint vector, and
/// the minor-to-major axis ratio; `start_param`/`end_param` are the
/// parametric angles in radians (0 to 2π for a full ellipse).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Vector3,
    /// Endpoint of the major axis relative to the center
    pub major_axis: Vector3,
    /// Minor-to-major axis ratio, in (0, 1]
    pub ratio: f64,
    pub start_param: f64,
    pub end_param: f64,
    pub extrusion: Vector3,
}

impl Ellipse {
    /// Length of the major radius.
    pub fn major_radius(&self) -> f64 {
        self.major_axis.length()
    }

    /// Length of the minor radius.
    pub fn minor_radius(&self) -> f64 {
        self.major_axis.length() * self.ratio
    }

    /// Whether the record covers the full ellipse.
    pub fn is_full_ellipse(&self) -> bool {
        (self.end_param - self.start_param).abs() >= 2.0 * std::f64::consts::PI - 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radii() {
        let ellipse = Ellipse {
            major_axis: Vector3::new(8.0, 0.0, 0.0),
            ratio: 0.5,
            ..Default::default()
        };
        assert_eq!(ellipse.major_radius(), 8.0);
        assert_eq!(ellipse.minor_radius(), 4.0);
    }
}
