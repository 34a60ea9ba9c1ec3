//! Multi-line text entity.

use serde::{Deserialize, Serialize};

use crate::types::{Handle, Vector3};

/// MTEXT attachment point (DXF group 71).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentPoint {
    TopLeft = 1,
    TopCenter = 2,
    TopRight = 3,
    MiddleLeft = 4,
    MiddleCenter = 5,
    MiddleRight = 6,
    BottomLeft = 7,
    BottomCenter = 8,
    BottomRight = 9,
}

impl Default for AttachmentPoint {
    fn default() -> Self {
        AttachmentPoint::TopLeft
    }
}

impl AttachmentPoint {
    pub fn from_raw(value: i16) -> Self {
        match value {
            2 => AttachmentPoint::TopCenter,
            3 => AttachmentPoint::TopRight,
            4 => AttachmentPoint::MiddleLeft,
            5 => AttachmentPoint::MiddleCenter,
            6 => AttachmentPoint::MiddleRight,
            7 => AttachmentPoint::BottomLeft,
            8 => AttachmentPoint::BottomCenter,
            9 => AttachmentPoint::BottomRight,
            _ => AttachmentPoint::TopLeft,
        }
    }
}

/// MTEXT drawing direction (DXF group 72).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawingDirection {
    LeftToRight = 1,
    TopToBottom = 3,
    ByStyle = 5,
}

impl Default for DrawingDirection {
    fn default() -> Self {
        DrawingDirection::LeftToRight
    }
}

impl DrawingDirection {
    pub fn from_raw(value: i16) -> Self {
        match value {
            3 => DrawingDirection::TopToBottom,
            5 => DrawingDirection::ByStyle,
            _ => DrawingDirection::LeftToRight,
        }
    }
}

/// A multi-line text entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MText {
    pub value: String,
    pub insertion: Vector3,
    /// Direction of the text's X axis in world coordinates
    pub x_axis: Vector3,
    /// Reference rectangle width
    pub rect_width: f64,
    /// Nominal character height
    pub height: f64,
    pub attachment: AttachmentPoint,
    pub drawing_direction: DrawingDirection,
    pub line_spacing_style: i16,
    pub line_spacing_factor: f64,
    /// Background fill flags, present from R2004 on
    pub background_flags: Option<i32>,
    pub style_handle: Handle,
    pub extrusion: Vector3,
}

impl MText {
    /// Rotation implied by the X-axis direction, in radians.
    pub fn rotation(&self) -> f64 {
        self.x_axis.y.atan2(self.x_axis.x)
    }
}
