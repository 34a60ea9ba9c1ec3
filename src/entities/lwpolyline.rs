//! Lightweight polyline entity.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::types::{Vector2, Vector3};

bitflags! {
    /// Presence and shape flags from the LWPOLYLINE header word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LwPolylineFlags: u16 {
        const HAS_EXTRUSION   = 0x0001;
        const HAS_THICKNESS   = 0x0002;
        const HAS_CONST_WIDTH = 0x0004;
        const HAS_ELEVATION   = 0x0008;
        const HAS_BULGES      = 0x0010;
        const HAS_WIDTHS      = 0x0020;
        const CLOSED          = 0x0200;
        const HAS_VERTEX_IDS  = 0x0400;
    }
}

impl Default for LwPolylineFlags {
    fn default() -> Self {
        LwPolylineFlags::empty()
    }
}

impl serde::Serialize for LwPolylineFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.bits())
    }
}

impl<'de> serde::Deserialize<'de> for LwPolylineFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u16::deserialize(deserializer).map(LwPolylineFlags::from_bits_retain)
    }
}

/// One polyline vertex assembled from the parallel field arrays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LwVertex {
    pub location: Vector2,
    pub bulge: f64,
    pub start_width: f64,
    pub end_width: f64,
}

/// A lightweight (2D) polyline.
///
/// The wire format stores points, bulges, and width pairs as parallel
/// arrays gated by the flags word; the record keeps that shape so the raw
/// surface can expose it unchanged. [`LwPolyline::vertices`] zips them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LwPolyline {
    pub flags: LwPolylineFlags,
    pub constant_width: f64,
    pub elevation: f64,
    pub thickness: f64,
    pub extrusion: Vector3,
    pub points: Vec<Vector2>,
    /// Present when `HAS_BULGES`; parallel to `points`
    pub bulges: Vec<f64>,
    /// `(start, end)` pairs, present when `HAS_WIDTHS`; parallel to `points`
    pub widths: Vec<(f64, f64)>,
}

impl LwPolyline {
    pub fn is_closed(&self) -> bool {
        self.flags.contains(LwPolylineFlags::CLOSED)
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Iterate assembled vertices, filling absent bulges with 0 and absent
    /// widths with the constant width.
    pub fn vertices(&self) -> impl Iterator<Item = LwVertex> + '_ {
        self.points.iter().enumerate().map(|(i, &location)| LwVertex {
            location,
            bulge: self.bulges.get(i).copied().unwrap_or(0.0),
            start_width: self
                .widths
                .get(i)
                .map(|w| w.0)
                .unwrap_or(self.constant_width),
            end_width: self
                .widths
                .get(i)
                .map(|w| w.1)
                .unwrap_or(self.constant_width),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices_zip() {
        let poly = LwPolyline {
            flags: LwPolylineFlags::CLOSED | LwPolylineFlags::HAS_BULGES,
            points: vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(10.0, 0.0),
                Vector2::new(10.0, 10.0),
            ],
            bulges: vec![0.0, 0.5, 0.0],
            constant_width: 0.25,
            ..Default::default()
        };
        assert!(poly.is_closed());
        let vertices: Vec<LwVertex> = poly.vertices().collect();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1].bulge, 0.5);
        assert_eq!(vertices[2].start_width, 0.25);
    }
}
