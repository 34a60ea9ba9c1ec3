//! Single-line text entity.

use serde::{Deserialize, Serialize};

use crate::types::{Handle, Vector3};

/// Horizontal text justification (DXF group 72).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextHorizontalAlignment {
    Left = 0,
    Center = 1,
    Right = 2,
    Aligned = 3,
    Middle = 4,
    Fit = 5,
}

impl Default for TextHorizontalAlignment {
    fn default() -> Self {
        TextHorizontalAlignment::Left
    }
}

impl TextHorizontalAlignment {
    pub fn from_raw(value: i16) -> Self {
        match value {
            1 => TextHorizontalAlignment::Center,
            2 => TextHorizontalAlignment::Right,
            3 => TextHorizontalAlignment::Aligned,
            4 => TextHorizontalAlignment::Middle,
            5 => TextHorizontalAlignment::Fit,
            _ => TextHorizontalAlignment::Left,
        }
    }
}

/// Vertical text justification (DXF group 73).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextVerticalAlignment {
    Baseline = 0,
    Bottom = 1,
    Middle = 2,
    Top = 3,
}

impl Default for TextVerticalAlignment {
    fn default() -> Self {
        TextVerticalAlignment::Baseline
    }
}

impl TextVerticalAlignment {
    pub fn from_raw(value: i16) -> Self {
        match value {
            1 => TextVerticalAlignment::Bottom,
            2 => TextVerticalAlignment::Middle,
            3 => TextVerticalAlignment::Top,
            _ => TextVerticalAlignment::Baseline,
        }
    }
}

/// A single-line text entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
    pub insertion: Vector3,
    /// Second alignment point; `None` when justification is left/baseline
    pub alignment: Option<Vector3>,
    pub height: f64,
    /// Rotation in radians, as read
    pub rotation: f64,
    pub width_factor: f64,
    /// Oblique (slant) angle in radians, as read
    pub oblique_angle: f64,
    pub generation_flags: i16,
    pub horizontal_alignment: TextHorizontalAlignment,
    pub vertical_alignment: TextVerticalAlignment,
    pub style_handle: Handle,
    pub extrusion: Vector3,
}
