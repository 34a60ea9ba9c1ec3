//! Color representation for entities and layers.

use serde::{Deserialize, Serialize};

/// Entity color.
///
/// DWG stores colors either as an ACI index (0 = ByBlock, 256 = ByLayer,
/// 1-255 = palette index) or, from R2004 on, as a packed true-color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    /// Color taken from the owning block reference
    ByBlock,
    /// Color taken from the entity's layer
    ByLayer,
    /// AutoCAD Color Index (1-255)
    Index(u8),
    /// 24-bit true color
    Rgb { r: u8, g: u8, b: u8 },
}

impl Color {
    /// Interpret an ACI color number (DXF group 62 convention).
    pub fn from_index(index: i16) -> Self {
        match index {
            0 => Color::ByBlock,
            256 => Color::ByLayer,
            1..=255 => Color::Index(index as u8),
            _ => Color::ByLayer,
        }
    }

    /// Create a true color from RGB components.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// The ACI index, if this is an indexed color.
    pub fn index(&self) -> Option<u8> {
        match self {
            Color::Index(i) => Some(*i),
            _ => None,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::ByLayer
    }
}
