//! Normalized entity records.
//!
//! Decoding produces one [`Entity`] per drawing object: shared fields in
//! [`EntityCommon`], the type-specific payload as an [`EntityKind`] variant.
//! Records are immutable once built and store geometry exactly as read —
//! angles in radians, parameters unnormalized. The degree-normalized view
//! lives behind [`Entity::dxf`].

pub mod arc;
pub mod circle;
pub mod dimension;
pub mod ellipse;
pub mod insert;
pub mod line;
pub mod lwpolyline;
pub mod mtext;
pub mod point;
pub mod text;

pub use arc::Arc;
pub use circle::Circle;
pub use dimension::{Dimension, DimensionSubtype};
pub use ellipse::Ellipse;
pub use insert::Insert;
pub use line::Line;
pub use lwpolyline::{LwPolyline, LwPolylineFlags, LwVertex};
pub use mtext::{AttachmentPoint, DrawingDirection, MText};
pub use point::Point;
pub use text::{Text, TextHorizontalAlignment, TextVerticalAlignment};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{Color, Handle, LineWeight, Transparency, Vector2, Vector3};

/// Convert a radian value to degrees normalized into `[0, 360)`.
pub fn normalize_degrees(radians: f64) -> f64 {
    let degrees = radians.to_degrees().rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 when the input is a hair under
    // a full turn.
    if degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}

/// Which space an entity belongs to, from the entity-mode bits of the
/// common entity data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpaceKind {
    Model,
    Paper,
    /// Owned by a block definition rather than a layout
    Block,
}

impl Default for SpaceKind {
    fn default() -> Self {
        SpaceKind::Model
    }
}

impl SpaceKind {
    /// Decode the 2-bit entity mode: 2 = model space, 1 = paper space,
    /// 0/3 = owned by a block.
    pub fn from_entity_mode(mode: u8) -> Self {
        match mode {
            2 => SpaceKind::Model,
            1 => SpaceKind::Paper,
            _ => SpaceKind::Block,
        }
    }
}

/// Fields shared by every entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityCommon {
    pub handle: Handle,
    /// Layer reference; `None` when the handle was zero or unresolved
    pub layer_handle: Option<Handle>,
    /// Layer name resolved through the layer table, when available
    pub layer: Option<String>,
    pub color: Color,
    pub transparency: Transparency,
    pub linetype_scale: f64,
    pub line_weight: LineWeight,
    pub invisible: bool,
    pub space: SpaceKind,
}

impl EntityCommon {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            linetype_scale: 1.0,
            ..Default::default()
        }
    }
}

/// Type-specific payload of an entity record.
///
/// The supported set is closed; everything else decodes to `Unsupported`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Line(Line),
    Arc(Arc),
    Circle(Circle),
    Point(Point),
    Ellipse(Ellipse),
    LwPolyline(LwPolyline),
    Text(Text),
    MText(MText),
    Dimension(Dimension),
    Insert(Insert),
    Unsupported(Unsupported),
}

/// Placeholder for an entity type outside the supported set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unsupported {
    /// Raw object type code from the wire
    pub raw_type: i16,
    /// DXF class name, when the type was class-based and the class is known
    pub class_name: Option<String>,
}

/// A decoded drawing entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub common: EntityCommon,
    pub kind: EntityKind,
}

impl Entity {
    pub fn handle(&self) -> Handle {
        self.common.handle
    }

    /// The DXF type name used by the query filter.
    pub fn dxftype(&self) -> &'static str {
        match &self.kind {
            EntityKind::Line(_) => "LINE",
            EntityKind::Arc(_) => "ARC",
            EntityKind::Circle(_) => "CIRCLE",
            EntityKind::Point(_) => "POINT",
            EntityKind::Ellipse(_) => "ELLIPSE",
            EntityKind::LwPolyline(_) => "LWPOLYLINE",
            EntityKind::Text(_) => "TEXT",
            EntityKind::MText(_) => "MTEXT",
            EntityKind::Dimension(_) => "DIMENSION",
            EntityKind::Insert(_) => "INSERT",
            EntityKind::Unsupported(_) => "UNSUPPORTED",
        }
    }

    /// Field-name → value view of the record with angles in degrees,
    /// normalized to `[0, 360)`.
    pub fn dxf(&self) -> IndexMap<&'static str, DxfValue> {
        let mut map = IndexMap::new();
        match &self.kind {
            EntityKind::Line(line) => {
                map.insert("start", DxfValue::Point(line.start));
                map.insert("end", DxfValue::Point(line.end));
                map.insert("thickness", DxfValue::Double(line.thickness));
                map.insert("extrusion", DxfValue::Point(line.extrusion));
            }
            EntityKind::Arc(arc) => {
                map.insert("center", DxfValue::Point(arc.center));
                map.insert("radius", DxfValue::Double(arc.radius));
                map.insert(
                    "start_angle",
                    DxfValue::Double(normalize_degrees(arc.start_angle)),
                );
                map.insert(
                    "end_angle",
                    DxfValue::Double(normalize_degrees(arc.end_angle)),
                );
                map.insert("thickness", DxfValue::Double(arc.thickness));
                map.insert("extrusion", DxfValue::Point(arc.extrusion));
            }
            EntityKind::Circle(circle) => {
                map.insert("center", DxfValue::Point(circle.center));
                map.insert("radius", DxfValue::Double(circle.radius));
                map.insert("thickness", DxfValue::Double(circle.thickness));
                map.insert("extrusion", DxfValue::Point(circle.extrusion));
            }
            EntityKind::Point(point) => {
                map.insert("location", DxfValue::Point(point.location));
                map.insert("thickness", DxfValue::Double(point.thickness));
                map.insert("extrusion", DxfValue::Point(point.extrusion));
                map.insert(
                    "angle",
                    DxfValue::Double(normalize_degrees(point.x_axis_angle)),
                );
            }
            EntityKind::Ellipse(ellipse) => {
                map.insert("center", DxfValue::Point(ellipse.center));
                map.insert("major_axis", DxfValue::Point(ellipse.major_axis));
                map.insert("ratio", DxfValue::Double(ellipse.ratio));
                map.insert("start_param", DxfValue::Double(ellipse.start_param));
                map.insert("end_param", DxfValue::Double(ellipse.end_param));
                map.insert("extrusion", DxfValue::Point(ellipse.extrusion));
            }
            EntityKind::LwPolyline(poly) => {
                map.insert("flags", DxfValue::Int(poly.flags.bits() as i64));
                map.insert("closed", DxfValue::Bool(poly.is_closed()));
                map.insert("const_width", DxfValue::Double(poly.constant_width));
                map.insert("elevation", DxfValue::Double(poly.elevation));
                map.insert("thickness", DxfValue::Double(poly.thickness));
                map.insert("count", DxfValue::Int(poly.points.len() as i64));
                map.insert("extrusion", DxfValue::Point(poly.extrusion));
            }
            EntityKind::Text(text) => {
                map.insert("insert", DxfValue::Point(text.insertion));
                map.insert("height", DxfValue::Double(text.height));
                map.insert(
                    "rotation",
                    DxfValue::Double(normalize_degrees(text.rotation)),
                );
                map.insert("width", DxfValue::Double(text.width_factor));
                map.insert(
                    "oblique",
                    DxfValue::Double(normalize_degrees(text.oblique_angle)),
                );
                map.insert("text", DxfValue::Text(text.value.clone()));
                map.insert("halign", DxfValue::Int(text.horizontal_alignment as i64));
                map.insert("valign", DxfValue::Int(text.vertical_alignment as i64));
            }
            EntityKind::MText(mtext) => {
                map.insert("insert", DxfValue::Point(mtext.insertion));
                map.insert("char_height", DxfValue::Double(mtext.height));
                map.insert("width", DxfValue::Double(mtext.rect_width));
                map.insert("attachment_point", DxfValue::Int(mtext.attachment as i64));
                map.insert("flow_direction", DxfValue::Int(mtext.drawing_direction as i64));
                map.insert("text", DxfValue::Text(mtext.value.clone()));
                map.insert(
                    "line_spacing_factor",
                    DxfValue::Double(mtext.line_spacing_factor),
                );
            }
            EntityKind::Dimension(dim) => {
                map.insert("defpoint", DxfValue::Point(dim.definition_point()));
                map.insert("text_midpoint", DxfValue::Point(dim.text_midpoint));
                map.insert("insert", DxfValue::Point(dim.insertion));
                map.insert(
                    "text",
                    DxfValue::Text(dim.text.clone().unwrap_or_default()),
                );
                map.insert(
                    "text_rotation",
                    DxfValue::Double(normalize_degrees(dim.text_rotation)),
                );
                map.insert("dimstyle", DxfValue::Handle(dim.style_handle));
                map.insert("block", DxfValue::Handle(dim.block_handle));
            }
            EntityKind::Insert(insert) => {
                map.insert("insert", DxfValue::Point(insert.insertion));
                map.insert("xscale", DxfValue::Double(insert.x_scale));
                map.insert("yscale", DxfValue::Double(insert.y_scale));
                map.insert("zscale", DxfValue::Double(insert.z_scale));
                map.insert(
                    "rotation",
                    DxfValue::Double(normalize_degrees(insert.rotation)),
                );
                map.insert("block", DxfValue::Handle(insert.block_handle));
            }
            EntityKind::Unsupported(u) => {
                map.insert("raw_type", DxfValue::Int(u.raw_type as i64));
                if let Some(name) = &u.class_name {
                    map.insert("class_name", DxfValue::Text(name.clone()));
                }
            }
        }

        map.insert("handle", DxfValue::Handle(self.common.handle));
        if let Some(layer) = &self.common.layer {
            map.insert("layer", DxfValue::Text(layer.clone()));
        }
        map
    }
}

/// A value in the [`Entity::dxf`] attribute view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DxfValue {
    Double(f64),
    Int(i64),
    Bool(bool),
    Text(String),
    Point(Vector3),
    Point2(Vector2),
    Handle(Handle),
}

impl DxfValue {
    pub fn as_double(&self) -> Option<f64> {
        match self {
            DxfValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<Vector3> {
        match self {
            DxfValue::Point(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DxfValue::Text(v) => Some(v),
            _ => None,
        }
    }
}
