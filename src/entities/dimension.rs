//! Dimension entities.
//!
//! Linear, radius, and diameter dimensions share a common prologue on the
//! wire; the subtype-specific definition points live in the variant.

use serde::{Deserialize, Serialize};

use crate::types::{Handle, Vector3};

/// Subtype payload of a dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DimensionSubtype {
    Linear {
        /// First extension line origin (group 13)
        first_point: Vector3,
        /// Second extension line origin (group 14)
        second_point: Vector3,
        /// Dimension line location (group 10)
        definition_point: Vector3,
        /// Dimension line rotation in radians, as read
        rotation: f64,
        /// Extension line rotation in radians, as read
        ext_line_rotation: f64,
    },
    Radius {
        /// Center of the measured curve (group 10)
        definition_point: Vector3,
        /// Point on the curve (group 15)
        chord_point: Vector3,
        leader_length: f64,
    },
    Diameter {
        /// First chord point (group 10)
        definition_point: Vector3,
        /// Opposite chord point (group 15)
        far_chord_point: Vector3,
        leader_length: f64,
    },
}

/// A dimension entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Middle point of the dimension text (group 11)
    pub text_midpoint: Vector3,
    /// Insertion point for clones of the dimension (group 12)
    pub insertion: Vector3,
    /// User-supplied text override; `None` renders the measurement
    pub text: Option<String>,
    /// Text rotation in radians, as read
    pub text_rotation: f64,
    /// Horizontal direction in radians, as read
    pub horizontal_direction: f64,
    pub attachment_point: i16,
    pub line_spacing_style: i16,
    pub line_spacing_factor: f64,
    pub actual_measurement: f64,
    pub extrusion: Vector3,
    pub style_handle: Handle,
    /// Anonymous dimension block
    pub block_handle: Handle,
    pub subtype: DimensionSubtype,
}

impl Dimension {
    /// Subtype name for diagnostics ("linear" / "radius" / "diameter").
    pub fn subtype_name(&self) -> &'static str {
        match self.subtype {
            DimensionSubtype::Linear { .. } => "linear",
            DimensionSubtype::Radius { .. } => "radius",
            DimensionSubtype::Diameter { .. } => "diameter",
        }
    }

    /// The subtype's primary definition point (group 10).
    pub fn definition_point(&self) -> Vector3 {
        match &self.subtype {
            DimensionSubtype::Linear {
                definition_point, ..
            }
            | DimensionSubtype::Radius {
                definition_point, ..
            }
            | DimensionSubtype::Diameter {
                definition_point, ..
            } => *definition_point,
        }
    }
}
