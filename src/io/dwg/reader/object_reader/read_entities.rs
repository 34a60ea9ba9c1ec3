//! Type-specific entity parsers.
//!
//! Every parser starts with the object reader positioned after the common
//! entity prologue and consumes exactly the fields of its type's published
//! table (AC1015+ forms). Trailing handles come from the handle sub-stream
//! in wire order.

use crate::entities::{
    Arc, AttachmentPoint, Circle, Dimension, DimensionSubtype, DrawingDirection, Ellipse,
    Entity, EntityKind, Insert, Line, LwPolyline, LwPolylineFlags, MText, Point, Text,
    TextHorizontalAlignment, TextVerticalAlignment,
};
use crate::error::{DwgError, Result};
use crate::types::{Handle, Vector2, Vector3};

use super::{ObjectReader, StreamSet};

impl<'a> ObjectReader<'a> {
    // -------------------------------------------------------------------
    // Basic geometry
    // -------------------------------------------------------------------

    pub(super) fn read_line(
        &mut self,
        handle: u64,
        streams: &mut StreamSet<'a>,
    ) -> Result<Entity> {
        let common = self.read_common_entity_data(handle, streams)?;

        // B: both Z coordinates are zero.
        let z_is_zero = streams.object.read_bit()?;
        let x0 = streams.object.read_raw_double()?;
        let x1 = streams.object.read_bit_double_with_default(x0)?;
        let y0 = streams.object.read_raw_double()?;
        let y1 = streams.object.read_bit_double_with_default(y0)?;

        let (start, end) = if z_is_zero {
            (Vector3::new(x0, y0, 0.0), Vector3::new(x1, y1, 0.0))
        } else {
            let z0 = streams.object.read_raw_double()?;
            let z1 = streams.object.read_bit_double_with_default(z0)?;
            (Vector3::new(x0, y0, z0), Vector3::new(x1, y1, z1))
        };

        let thickness = streams.object.read_bit_thickness()?;
        let extrusion = streams.object.read_bit_extrusion()?;

        Ok(Entity {
            common,
            kind: EntityKind::Line(Line {
                start,
                end,
                thickness,
                extrusion,
            }),
        })
    }

    pub(super) fn read_arc(
        &mut self,
        handle: u64,
        streams: &mut StreamSet<'a>,
    ) -> Result<Entity> {
        let common = self.read_common_entity_data(handle, streams)?;

        let center = streams.object.read_3bit_double()?;
        let radius = streams.object.read_bit_double()?;
        let thickness = streams.object.read_bit_thickness()?;
        let extrusion = streams.object.read_bit_extrusion()?;
        let start_angle = streams.object.read_bit_double()?;
        let end_angle = streams.object.read_bit_double()?;

        if radius < 0.0 {
            return Err(DwgError::Parse(format!("negative arc radius {radius}")));
        }

        Ok(Entity {
            common,
            kind: EntityKind::Arc(Arc {
                center,
                radius,
                start_angle,
                end_angle,
                thickness,
                extrusion,
            }),
        })
    }

    pub(super) fn read_circle(
        &mut self,
        handle: u64,
        streams: &mut StreamSet<'a>,
    ) -> Result<Entity> {
        let common = self.read_common_entity_data(handle, streams)?;

        let center = streams.object.read_3bit_double()?;
        let radius = streams.object.read_bit_double()?;
        let thickness = streams.object.read_bit_thickness()?;
        let extrusion = streams.object.read_bit_extrusion()?;

        if radius < 0.0 {
            return Err(DwgError::Parse(format!("negative circle radius {radius}")));
        }

        Ok(Entity {
            common,
            kind: EntityKind::Circle(Circle {
                center,
                radius,
                thickness,
                extrusion,
            }),
        })
    }

    pub(super) fn read_point(
        &mut self,
        handle: u64,
        streams: &mut StreamSet<'a>,
    ) -> Result<Entity> {
        let common = self.read_common_entity_data(handle, streams)?;

        let location = streams.object.read_3bit_double()?;
        let thickness = streams.object.read_bit_thickness()?;
        let extrusion = streams.object.read_bit_extrusion()?;
        let x_axis_angle = streams.object.read_bit_double()?;

        Ok(Entity {
            common,
            kind: EntityKind::Point(Point {
                location,
                thickness,
                extrusion,
                x_axis_angle,
            }),
        })
    }

    pub(super) fn read_ellipse(
        &mut self,
        handle: u64,
        streams: &mut StreamSet<'a>,
    ) -> Result<Entity> {
        let common = self.read_common_entity_data(handle, streams)?;

        let center = streams.object.read_3bit_double()?;
        let major_axis = streams.object.read_3bit_double()?;
        let extrusion = streams.object.read_3bit_double()?;
        let ratio = streams.object.read_bit_double()?;
        let start_param = streams.object.read_bit_double()?;
        let end_param = streams.object.read_bit_double()?;

        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(DwgError::Parse(format!(
                "ellipse axis ratio {ratio} outside (0, 1]"
            )));
        }

        Ok(Entity {
            common,
            kind: EntityKind::Ellipse(Ellipse {
                center,
                major_axis,
                ratio,
                start_param,
                end_param,
                extrusion,
            }),
        })
    }

    // -------------------------------------------------------------------
    // Lightweight polyline
    // -------------------------------------------------------------------

    pub(super) fn read_lwpolyline(
        &mut self,
        handle: u64,
        streams: &mut StreamSet<'a>,
    ) -> Result<Entity> {
        let common = self.read_common_entity_data(handle, streams)?;

        let flag_word = streams.object.read_bit_short()? as u16;
        let flags = LwPolylineFlags::from_bits_retain(flag_word);

        let constant_width = if flags.contains(LwPolylineFlags::HAS_CONST_WIDTH) {
            streams.object.read_bit_double()?
        } else {
            0.0
        };
        let elevation = if flags.contains(LwPolylineFlags::HAS_ELEVATION) {
            streams.object.read_bit_double()?
        } else {
            0.0
        };
        let thickness = if flags.contains(LwPolylineFlags::HAS_THICKNESS) {
            streams.object.read_bit_double()?
        } else {
            0.0
        };
        let extrusion = if flags.contains(LwPolylineFlags::HAS_EXTRUSION) {
            streams.object.read_3bit_double()?
        } else {
            Vector3::UNIT_Z
        };

        let num_points = streams.object.read_bit_long()?;
        if !(0..10_000_000).contains(&num_points) {
            return Err(DwgError::Parse(format!(
                "polyline vertex count {num_points} implies a misaligned stream"
            )));
        }
        let num_points = num_points as usize;

        let num_bulges = if flags.contains(LwPolylineFlags::HAS_BULGES) {
            streams.object.read_bit_long()? as usize
        } else {
            0
        };
        let num_vertex_ids = if self.flags().r2010_plus
            && flags.contains(LwPolylineFlags::HAS_VERTEX_IDS)
        {
            streams.object.read_bit_long()? as usize
        } else {
            0
        };
        let num_widths = if flags.contains(LwPolylineFlags::HAS_WIDTHS) {
            streams.object.read_bit_long()? as usize
        } else {
            0
        };

        // First vertex is a raw pair; the rest are DD deltas against the
        // previous vertex.
        let mut points = Vec::with_capacity(num_points);
        if num_points > 0 {
            let mut prev = streams.object.read_2raw_double()?;
            points.push(prev);
            for _ in 1..num_points {
                let x = streams.object.read_bit_double_with_default(prev.x)?;
                let y = streams.object.read_bit_double_with_default(prev.y)?;
                prev = Vector2::new(x, y);
                points.push(prev);
            }
        }

        let mut bulges = Vec::with_capacity(num_bulges);
        for _ in 0..num_bulges {
            bulges.push(streams.object.read_bit_double()?);
        }

        for _ in 0..num_vertex_ids {
            let _vertex_id = streams.object.read_bit_long()?;
        }

        let mut widths = Vec::with_capacity(num_widths);
        for _ in 0..num_widths {
            let start = streams.object.read_bit_double()?;
            let end = streams.object.read_bit_double()?;
            widths.push((start, end));
        }

        Ok(Entity {
            common,
            kind: EntityKind::LwPolyline(LwPolyline {
                flags,
                constant_width,
                elevation,
                thickness,
                extrusion,
                points,
                bulges,
                widths,
            }),
        })
    }

    // -------------------------------------------------------------------
    // Text
    // -------------------------------------------------------------------

    pub(super) fn read_text_entity(
        &mut self,
        handle: u64,
        streams: &mut StreamSet<'a>,
    ) -> Result<Entity> {
        let common = self.read_common_entity_data(handle, streams)?;

        // RC: data flags; a set bit means the field was elided.
        let data_flags = streams.object.read_raw_char()?;

        let elevation = if (data_flags & 0x01) == 0 {
            streams.object.read_raw_double()?
        } else {
            0.0
        };

        let ip = streams.object.read_2raw_double()?;
        let insertion = Vector3::new(ip.x, ip.y, elevation);

        let alignment = if (data_flags & 0x02) == 0 {
            let x = streams.object.read_bit_double_with_default(ip.x)?;
            let y = streams.object.read_bit_double_with_default(ip.y)?;
            Some(Vector3::new(x, y, elevation))
        } else {
            None
        };

        let extrusion = streams.object.read_bit_extrusion()?;
        let _thickness = streams.object.read_bit_thickness()?;

        let oblique_angle = if (data_flags & 0x04) == 0 {
            streams.object.read_raw_double()?
        } else {
            0.0
        };
        let rotation = if (data_flags & 0x08) == 0 {
            streams.object.read_raw_double()?
        } else {
            0.0
        };

        let height = streams.object.read_raw_double()?;
        let width_factor = if (data_flags & 0x10) == 0 {
            streams.object.read_raw_double()?
        } else {
            1.0
        };

        let value = streams.read_text()?;

        let generation_flags = if (data_flags & 0x20) == 0 {
            streams.object.read_bit_short()?
        } else {
            0
        };
        let horizontal = if (data_flags & 0x40) == 0 {
            streams.object.read_bit_short()?
        } else {
            0
        };
        let vertical = if (data_flags & 0x80) == 0 {
            streams.object.read_bit_short()?
        } else {
            0
        };

        let style_handle = Handle::new(streams.handle_ref()?);

        Ok(Entity {
            common,
            kind: EntityKind::Text(Text {
                value,
                insertion,
                alignment,
                height,
                rotation,
                width_factor,
                oblique_angle,
                generation_flags,
                horizontal_alignment: TextHorizontalAlignment::from_raw(horizontal),
                vertical_alignment: TextVerticalAlignment::from_raw(vertical),
                style_handle,
                extrusion,
            }),
        })
    }

    pub(super) fn read_mtext(
        &mut self,
        handle: u64,
        streams: &mut StreamSet<'a>,
    ) -> Result<Entity> {
        let flags = self.flags();
        let common = self.read_common_entity_data(handle, streams)?;

        let insertion = streams.object.read_3bit_double()?;
        let extrusion = streams.object.read_3bit_double()?;
        let x_axis = streams.object.read_3bit_double()?;
        let rect_width = streams.object.read_bit_double()?;
        if flags.r2007_plus {
            let _rect_height = streams.object.read_bit_double()?;
        }
        let height = streams.object.read_bit_double()?;
        let attachment = streams.object.read_bit_short()?;
        let drawing_dir = streams.object.read_bit_short()?;

        // Extents are regenerated on load; read and drop.
        let _extents_height = streams.object.read_bit_double()?;
        let _extents_width = streams.object.read_bit_double()?;

        let value = streams.read_text()?;

        let line_spacing_style = streams.object.read_bit_short()?;
        let line_spacing_factor = streams.object.read_bit_double()?;
        let _unknown_bit = streams.object.read_bit()?;

        let background_flags = if flags.r2004_plus {
            let bg_flags = streams.object.read_bit_long()?;
            if (bg_flags & 0x01) != 0 {
                let _bg_scale = streams.object.read_bit_double()?;
                let _bg_color = streams.read_cm_color()?;
                let _bg_transparency = streams.object.read_bit_long()?;
            }
            Some(bg_flags)
        } else {
            None
        };

        let style_handle = Handle::new(streams.handle_ref()?);

        Ok(Entity {
            common,
            kind: EntityKind::MText(MText {
                value,
                insertion,
                x_axis,
                rect_width,
                height,
                attachment: AttachmentPoint::from_raw(attachment),
                drawing_direction: DrawingDirection::from_raw(drawing_dir),
                line_spacing_style,
                line_spacing_factor,
                background_flags,
                style_handle,
                extrusion,
            }),
        })
    }

    // -------------------------------------------------------------------
    // Insert
    // -------------------------------------------------------------------

    pub(super) fn read_insert(
        &mut self,
        handle: u64,
        streams: &mut StreamSet<'a>,
    ) -> Result<Entity> {
        let flags = self.flags();
        let common = self.read_common_entity_data(handle, streams)?;

        let insertion = streams.object.read_3bit_double()?;

        // BB: scale data flags.
        let (x_scale, y_scale, z_scale) = match streams.object.read_2bits()? {
            0 => {
                let x = streams.object.read_raw_double()?;
                let y = streams.object.read_bit_double_with_default(x)?;
                let z = streams.object.read_bit_double_with_default(x)?;
                (x, y, z)
            }
            1 => {
                let y = streams.object.read_bit_double_with_default(1.0)?;
                let z = streams.object.read_bit_double_with_default(1.0)?;
                (1.0, y, z)
            }
            2 => {
                let x = streams.object.read_raw_double()?;
                (x, x, x)
            }
            _ => (1.0, 1.0, 1.0),
        };

        let rotation = streams.object.read_bit_double()?;
        let extrusion = streams.object.read_3bit_double()?;
        let has_attributes = streams.object.read_bit()?;

        let owned_count = if flags.r2004_plus && has_attributes {
            streams.object.read_bit_long()?
        } else {
            0
        };

        let block_handle = Handle::new(streams.handle_ref()?);

        if has_attributes {
            if flags.r2004_plus {
                for _ in 0..owned_count {
                    let _attribute = streams.handle_ref()?;
                }
            } else {
                let _first_attribute = streams.handle_ref()?;
                let _last_attribute = streams.handle_ref()?;
            }
            let _seqend = streams.handle_ref()?;
        }

        Ok(Entity {
            common,
            kind: EntityKind::Insert(Insert {
                insertion,
                x_scale,
                y_scale,
                z_scale,
                rotation,
                extrusion,
                block_handle,
                has_attributes,
            }),
        })
    }

    // -------------------------------------------------------------------
    // Dimensions
    // -------------------------------------------------------------------

    /// Shared dimension prologue, up to the subtype-specific points.
    fn read_dimension_common(
        &mut self,
        handle: u64,
        streams: &mut StreamSet<'a>,
    ) -> Result<(crate::entities::EntityCommon, DimensionProlog)> {
        let flags = self.flags();
        let common = self.read_common_entity_data(handle, streams)?;

        if flags.r2010_plus {
            let _version = streams.object.read_raw_char()?;
        }

        let extrusion = streams.object.read_bit_extrusion()?;
        let text_midpoint_2d = streams.object.read_2raw_double()?;
        let elevation = streams.object.read_bit_double()?;
        let _dim_flags = streams.object.read_raw_char()?;

        let user_text = streams.read_text()?;
        let text_rotation = streams.object.read_bit_double()?;
        let horizontal_direction = streams.object.read_bit_double()?;

        let _insert_scale = streams.object.read_3bit_double()?;
        let _insert_rotation = streams.object.read_bit_double()?;

        let attachment_point = streams.object.read_bit_short()?;
        let line_spacing_style = streams.object.read_bit_short()?;
        let line_spacing_factor = streams.object.read_bit_double()?;
        let actual_measurement = streams.object.read_bit_double()?;

        if flags.r2007_plus {
            let _unknown = streams.object.read_bit()?;
            let _flip_arrows = streams.object.read_bit()?;
        }

        let insertion_2d = streams.object.read_2raw_double()?;

        Ok((
            common,
            DimensionProlog {
                extrusion,
                text_midpoint: Vector3::new(text_midpoint_2d.x, text_midpoint_2d.y, elevation),
                insertion: Vector3::new(insertion_2d.x, insertion_2d.y, elevation),
                text: if user_text.is_empty() {
                    None
                } else {
                    Some(user_text)
                },
                text_rotation,
                horizontal_direction,
                attachment_point,
                line_spacing_style,
                line_spacing_factor,
                actual_measurement,
            },
        ))
    }

    fn finish_dimension(
        &mut self,
        common: crate::entities::EntityCommon,
        prolog: DimensionProlog,
        subtype: DimensionSubtype,
        streams: &mut StreamSet<'a>,
    ) -> Result<Entity> {
        // H: dimension style, H: anonymous block.
        let style_handle = Handle::new(streams.handle_ref()?);
        let block_handle = Handle::new(streams.handle_ref()?);

        Ok(Entity {
            common,
            kind: EntityKind::Dimension(Dimension {
                text_midpoint: prolog.text_midpoint,
                insertion: prolog.insertion,
                text: prolog.text,
                text_rotation: prolog.text_rotation,
                horizontal_direction: prolog.horizontal_direction,
                attachment_point: prolog.attachment_point,
                line_spacing_style: prolog.line_spacing_style,
                line_spacing_factor: prolog.line_spacing_factor,
                actual_measurement: prolog.actual_measurement,
                extrusion: prolog.extrusion,
                style_handle,
                block_handle,
                subtype,
            }),
        })
    }

    pub(super) fn read_dim_linear(
        &mut self,
        handle: u64,
        streams: &mut StreamSet<'a>,
    ) -> Result<Entity> {
        let (common, prolog) = self.read_dimension_common(handle, streams)?;

        let first_point = streams.object.read_3bit_double()?;
        let second_point = streams.object.read_3bit_double()?;
        let definition_point = streams.object.read_3bit_double()?;
        let rotation = streams.object.read_bit_double()?;
        let ext_line_rotation = streams.object.read_bit_double()?;

        self.finish_dimension(
            common,
            prolog,
            DimensionSubtype::Linear {
                first_point,
                second_point,
                definition_point,
                rotation,
                ext_line_rotation,
            },
            streams,
        )
    }

    pub(super) fn read_dim_radius(
        &mut self,
        handle: u64,
        streams: &mut StreamSet<'a>,
    ) -> Result<Entity> {
        let (common, prolog) = self.read_dimension_common(handle, streams)?;

        let definition_point = streams.object.read_3bit_double()?;
        let chord_point = streams.object.read_3bit_double()?;
        let leader_length = streams.object.read_bit_double()?;

        self.finish_dimension(
            common,
            prolog,
            DimensionSubtype::Radius {
                definition_point,
                chord_point,
                leader_length,
            },
            streams,
        )
    }

    pub(super) fn read_dim_diameter(
        &mut self,
        handle: u64,
        streams: &mut StreamSet<'a>,
    ) -> Result<Entity> {
        let (common, prolog) = self.read_dimension_common(handle, streams)?;

        let definition_point = streams.object.read_3bit_double()?;
        let far_chord_point = streams.object.read_3bit_double()?;
        let leader_length = streams.object.read_bit_double()?;

        self.finish_dimension(
            common,
            prolog,
            DimensionSubtype::Diameter {
                definition_point,
                far_chord_point,
                leader_length,
            },
            streams,
        )
    }
}

/// Fields shared by all dimension subtypes, gathered before dispatch.
struct DimensionProlog {
    extrusion: Vector3,
    text_midpoint: Vector3,
    insertion: Vector3,
    text: Option<String>,
    text_rotation: f64,
    horizontal_direction: f64,
    attachment_point: i16,
    line_spacing_style: i16,
    line_spacing_factor: f64,
    actual_measurement: f64,
}
