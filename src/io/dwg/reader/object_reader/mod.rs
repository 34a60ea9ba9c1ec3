//! Object reader — walks the object map and decodes every object in the
//! `AcDb:AcDbObjects` stream.
//!
//! For each slot the reader:
//!
//! 1. Seeks to the slot's offset and reads the MS object size (plus the MC
//!    handle-stream bit size for R2010+).
//! 2. Validates the object's trailing CRC-16.
//! 3. Sets up the object / text / handle sub-readers for the version.
//! 4. Reads the type code and dispatches to the matching entity parser,
//!    the layer-table parser, or the placeholder path.
//!
//! Entities appear in the result in object-map order, which matches
//! on-disk order.

pub mod common;
pub mod read_entities;
pub mod read_tables;

use indexmap::IndexMap;

use crate::entities::{Entity, EntityCommon, EntityKind, SpaceKind, Unsupported};
use crate::error::{DwgError, Result};
use crate::io::dwg::constants::OBJECT_CRC_SEED;
use crate::io::dwg::crc::crc8;
use crate::io::dwg::object_type::{self, codes, FIRST_CLASS_CODE};
use crate::io::dwg::reader::bit_reader::BitReader;
use crate::io::dwg::reader::classes::ClassRegistry;
use crate::io::dwg::reader::object_map::ObjectMap;
use crate::io::dwg::version_flags::VersionFlags;
use crate::notification::{Notification, NotificationType};
use crate::types::Handle;

pub use read_tables::LayerRecord;

/// Everything the object pass produced.
#[derive(Debug, Default)]
pub struct DecodedObjects {
    /// Entity records in object-map order
    pub entities: Vec<Entity>,
    /// Layer symbol table, keyed by layer handle
    pub layers: IndexMap<u64, LayerRecord>,
    /// Non-fatal diagnostics
    pub notifications: Vec<Notification>,
}

/// The three sub-readers of one object.
///
/// Before R2007 text is inline in the object data and the text reader is
/// unused; from R2007 on strings live in a dedicated sub-stream. Handles
/// always come from the handle sub-stream at the end of the object (whose
/// position is found differently per version).
pub struct StreamSet<'a> {
    pub object: BitReader<'a>,
    pub text: BitReader<'a>,
    pub handles: BitReader<'a>,
    pub has_separate_text: bool,
    /// Handle of the object being read; the reference base for the
    /// relative handle codes.
    pub current_handle: u64,
}

impl<'a> StreamSet<'a> {
    /// Read a handle reference, resolved against the current object.
    pub fn handle_ref(&mut self) -> Result<u64> {
        self.handles.handle_reference_resolved(self.current_handle)
    }

    /// Read variable text from whichever stream carries it.
    pub fn read_text(&mut self) -> Result<String> {
        if self.has_separate_text {
            self.text.read_variable_text()
        } else {
            self.object.read_variable_text()
        }
    }

    /// Read a CMC color, routing name strings to the text stream.
    pub fn read_cm_color(&mut self) -> Result<crate::types::Color> {
        let (color, name_flags) = self.object.read_cm_color()?;
        if (name_flags & 1) != 0 {
            self.read_text()?;
        }
        if (name_flags & 2) != 0 {
            self.read_text()?;
        }
        Ok(color)
    }
}

/// Reads all objects reachable from the object map.
pub struct ObjectReader<'a> {
    flags: VersionFlags,
    /// The assembled `AcDb:AcDbObjects` stream
    data: &'a [u8],
    map: &'a ObjectMap,
    classes: &'a ClassRegistry,

    /// Taint-and-continue instead of aborting on per-object errors.
    pub failsafe: bool,
    /// Keep placeholder records for unsupported entity types.
    pub keep_unsupported: bool,

    /// Bit position of the start of the current object's data.
    object_initial_pos: i64,

    result: DecodedObjects,
}

/// What one object slot decoded to.
enum DecodedItem {
    Entity(Entity),
    Layer(LayerRecord),
    Skip,
}

impl<'a> ObjectReader<'a> {
    pub fn new(
        flags: VersionFlags,
        data: &'a [u8],
        map: &'a ObjectMap,
        classes: &'a ClassRegistry,
    ) -> Self {
        Self {
            flags,
            data,
            map,
            classes,
            failsafe: true,
            keep_unsupported: true,
            object_initial_pos: 0,
            result: DecodedObjects::default(),
        }
    }

    pub(crate) fn flags(&self) -> VersionFlags {
        self.flags
    }

    /// Decode every object in map order.
    pub fn read(mut self) -> Result<DecodedObjects> {
        let slots: Vec<(u64, i64)> = self.map.iter().collect();
        for (handle, offset) in slots {
            match self.read_object_slot(handle, offset) {
                Ok(DecodedItem::Entity(entity)) => self.result.entities.push(entity),
                Ok(DecodedItem::Layer(layer)) => {
                    self.result.layers.insert(layer.handle, layer);
                }
                Ok(DecodedItem::Skip) => {}
                Err(e) => {
                    if !self.failsafe {
                        return Err(e);
                    }
                    self.notify(
                        NotificationType::Error,
                        format!("object {handle:#X} at offset {offset}: {e}"),
                    );
                }
            }
        }
        Ok(self.result)
    }

    fn notify(&mut self, kind: NotificationType, message: String) {
        self.result.notifications.push(Notification::new(kind, message));
    }

    // -------------------------------------------------------------------
    // Per-slot decode
    // -------------------------------------------------------------------

    fn read_object_slot(&mut self, handle: u64, offset: i64) -> Result<DecodedItem> {
        if offset < 0 || offset as usize >= self.data.len() {
            return Err(DwgError::Truncated(format!(
                "object {handle:#X} offset {offset} outside the objects stream"
            )));
        }

        // MS: size of the object data in bytes (CRC excluded).
        let mut prefix = BitReader::new(self.data, self.flags.version());
        prefix.set_position(offset as usize);
        let size = prefix.read_modular_short()?;
        if size <= 0 {
            return Err(DwgError::Parse(format!(
                "object {handle:#X}: non-positive size {size}"
            )));
        }
        let size_in_bits = (size as i64) * 8;

        // R2010+: MC size in bits of the trailing handle stream.
        let handle_stream_bits = if self.flags.r2010_plus {
            Some(prefix.read_modular_char()? as i64)
        } else {
            None
        };

        let data_start_bits = prefix.position_in_bits();
        self.object_initial_pos = data_start_bits;
        let object_end_bits = data_start_bits + size_in_bits;

        self.validate_object_crc(handle, offset as usize, object_end_bits);

        // Sub-readers.
        let mut streams = self.make_streams(data_start_bits, handle_stream_bits, size_in_bits)?;
        let raw_type = streams.object.read_object_type()?;

        let item = self.dispatch(handle, raw_type, &mut streams);

        match item {
            Ok(item) => {
                // A parser that consumed past the object boundary read
                // someone else's bytes; taint the object.
                if streams.object.position_in_bits() > object_end_bits {
                    let overrun = DwgError::ParserOverrun {
                        object_type: object_type::fixed_code_name(raw_type).unwrap_or("CLASS"),
                        consumed: streams.object.position_in_bits(),
                        end: object_end_bits,
                    };
                    return self.taint(handle, raw_type, overrun);
                }
                Ok(item)
            }
            Err(e) => self.taint(handle, raw_type, e),
        }
    }

    /// Taint an object: in failsafe mode record a warning and keep a
    /// placeholder so the slot stays visible; in strict mode propagate.
    fn taint(&mut self, handle: u64, raw_type: i16, error: DwgError) -> Result<DecodedItem> {
        if !self.failsafe {
            return Err(error);
        }
        self.notify(
            NotificationType::Warning,
            format!("object {handle:#X} tainted: {error}"),
        );
        if self.type_is_entity(raw_type) && self.keep_unsupported {
            Ok(DecodedItem::Entity(self.placeholder(handle, raw_type)))
        } else {
            Ok(DecodedItem::Skip)
        }
    }

    /// Validate the trailing CRC-16 over the object bytes (size prefix
    /// included). A mismatch is a warning, not a fatal error — the object
    /// itself parsed from the same bytes the CRC covers.
    fn validate_object_crc(&mut self, handle: u64, offset: usize, object_end_bits: i64) {
        let end = (object_end_bits / 8) as usize;
        if end + 2 > self.data.len() {
            self.notify(
                NotificationType::Warning,
                format!("object {handle:#X}: no room for trailing CRC"),
            );
            return;
        }
        let stored = u16::from_le_bytes([self.data[end], self.data[end + 1]]);
        let computed = crc8(OBJECT_CRC_SEED, &self.data[offset..end]);
        if stored != computed {
            self.notify(
                NotificationType::Warning,
                format!(
                    "object {handle:#X}: CRC mismatch (stored {stored:#06X}, computed {computed:#06X})"
                ),
            );
        }
    }

    /// Build the three sub-readers for one object.
    fn make_streams(
        &self,
        data_start_bits: i64,
        handle_stream_bits: Option<i64>,
        size_in_bits: i64,
    ) -> Result<StreamSet<'a>> {
        let version = self.flags.version();
        let mut object = BitReader::new(self.data, version);
        object.set_position_in_bits(data_start_bits)?;

        if let Some(handle_bits) = handle_stream_bits {
            // R2010+: the handle stream is the object's tail; the string
            // stream sits just before it behind the flag bit.
            let handle_start = data_start_bits + size_in_bits - handle_bits;
            let mut handles = BitReader::new(self.data, version);
            handles.set_position_in_bits(handle_start)?;
            let mut text = BitReader::new(self.data, version);
            text.set_position_by_flag(handle_start - 1)?;

            Ok(StreamSet {
                object,
                text,
                handles,
                has_separate_text: true,
                current_handle: 0,
            })
        } else {
            // Pre-R2010: the handle stream position comes from the RL word
            // at the start of the common data (see `update_handle_reader`).
            let handles = BitReader::new(self.data, version);
            let text = BitReader::new(self.data, version);
            Ok(StreamSet {
                object,
                text,
                handles,
                has_separate_text: false,
                current_handle: 0,
            })
        }
    }

    /// Position the handle reader (and, for R2007, the text reader) from
    /// the RL end-of-data word embedded in the object data.
    pub(super) fn update_handle_reader(&self, streams: &mut StreamSet<'a>) -> Result<()> {
        let size_bits = streams.object.read_raw_long()? as i64;
        let end_bits = size_bits + self.object_initial_pos;

        streams.handles.set_position_in_bits(end_bits)?;

        if self.flags.r2007_plus && !self.flags.r2010_plus {
            let mut text = BitReader::new(self.data, self.flags.version());
            text.set_position_by_flag(end_bits - 1)?;
            streams.text = text;
            streams.has_separate_text = true;
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------

    fn dispatch(
        &mut self,
        handle: u64,
        raw_type: i16,
        streams: &mut StreamSet<'a>,
    ) -> Result<DecodedItem> {
        let item = match raw_type {
            codes::LINE => DecodedItem::Entity(self.read_line(handle, streams)?),
            codes::ARC => DecodedItem::Entity(self.read_arc(handle, streams)?),
            codes::CIRCLE => DecodedItem::Entity(self.read_circle(handle, streams)?),
            codes::POINT => DecodedItem::Entity(self.read_point(handle, streams)?),
            codes::ELLIPSE => DecodedItem::Entity(self.read_ellipse(handle, streams)?),
            codes::LWPOLYLINE => DecodedItem::Entity(self.read_lwpolyline(handle, streams)?),
            codes::TEXT => DecodedItem::Entity(self.read_text_entity(handle, streams)?),
            codes::MTEXT => DecodedItem::Entity(self.read_mtext(handle, streams)?),
            codes::INSERT => DecodedItem::Entity(self.read_insert(handle, streams)?),
            codes::DIMENSION_LINEAR => {
                DecodedItem::Entity(self.read_dim_linear(handle, streams)?)
            }
            codes::DIMENSION_RADIUS => {
                DecodedItem::Entity(self.read_dim_radius(handle, streams)?)
            }
            codes::DIMENSION_DIAMETER => {
                DecodedItem::Entity(self.read_dim_diameter(handle, streams)?)
            }
            codes::LAYER => DecodedItem::Layer(self.read_layer(handle, streams)?),
            _ => {
                if self.type_is_entity(raw_type) {
                    if self.keep_unsupported {
                        DecodedItem::Entity(self.read_unsupported_entity(
                            handle, raw_type, streams,
                        )?)
                    } else {
                        DecodedItem::Skip
                    }
                } else {
                    // Non-graphical objects carry nothing the document
                    // model needs.
                    DecodedItem::Skip
                }
            }
        };
        Ok(item)
    }

    /// Whether a type code denotes a graphical entity.
    fn type_is_entity(&self, raw_type: i16) -> bool {
        if raw_type >= FIRST_CLASS_CODE {
            self.classes
                .get(raw_type)
                .map(|c| c.is_an_entity)
                .unwrap_or(false)
        } else {
            object_type::is_fixed_entity_code(raw_type)
        }
    }

    /// Name an unsupported type for its placeholder record.
    fn unsupported_name(&self, raw_type: i16) -> Option<String> {
        if raw_type >= FIRST_CLASS_CODE {
            self.classes.get(raw_type).map(|c| c.dxf_name.clone())
        } else {
            object_type::fixed_code_name(raw_type).map(str::to_string)
        }
    }

    /// Read an unsupported entity type: consume the common entity data for
    /// the layer and space fields, then leave the type-specific bits alone.
    fn read_unsupported_entity(
        &mut self,
        handle: u64,
        raw_type: i16,
        streams: &mut StreamSet<'a>,
    ) -> Result<Entity> {
        let common = self.read_common_entity_data(handle, streams)?;
        Ok(Entity {
            common,
            kind: EntityKind::Unsupported(Unsupported {
                raw_type,
                class_name: self.unsupported_name(raw_type),
            }),
        })
    }

    /// Bare placeholder for a tainted entity whose common data could not
    /// be read.
    fn placeholder(&self, handle: u64, raw_type: i16) -> Entity {
        Entity {
            common: EntityCommon {
                space: SpaceKind::Model,
                ..EntityCommon::new(Handle::new(handle))
            },
            kind: EntityKind::Unsupported(Unsupported {
                raw_type,
                class_name: self.unsupported_name(raw_type),
            }),
        }
    }
}
