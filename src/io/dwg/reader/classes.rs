//! `AcDb:Classes` section reader.
//!
//! Object type codes at or above 500 are class-based: the classes section
//! maps each class number to its DXF name and capability flags. The reader
//! needs this to tell class-based entities from non-graphical objects and
//! to name unsupported placeholders.

use std::collections::HashMap;

use crate::error::{DwgError, Result};
use crate::io::dwg::constants::sentinels;
use crate::io::dwg::version_flags::VersionFlags;
use crate::types::DwgVersion;

use super::bit_reader::BitReader;

/// One class definition from the classes section.
#[derive(Debug, Clone, Default)]
pub struct DwgClass {
    pub class_number: i16,
    pub proxy_flags: u16,
    pub application_name: String,
    pub cpp_class_name: String,
    pub dxf_name: String,
    pub was_zombie: bool,
    /// 0x1F2 for entity-producing classes, 0x1F3 for object-producing ones
    pub item_class_id: i16,
    pub is_an_entity: bool,
    pub instance_count: i32,
}

/// Class definitions indexed by class number.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: HashMap<i16, DwgClass>,
}

impl ClassRegistry {
    pub fn get(&self, class_number: i16) -> Option<&DwgClass> {
        self.classes.get(&class_number)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn insert(&mut self, class: DwgClass) {
        self.classes.insert(class.class_number, class);
    }
}

/// Reader for the classes section.
pub struct ClassesReader<'a> {
    data: &'a [u8],
    version: DwgVersion,
    maintenance_version: u8,
}

impl<'a> ClassesReader<'a> {
    pub fn new(version: DwgVersion, maintenance_version: u8, data: &'a [u8]) -> Self {
        Self {
            data,
            version,
            maintenance_version,
        }
    }

    pub fn read(&self) -> Result<ClassRegistry> {
        let mut registry = ClassRegistry::default();
        if self.data.is_empty() {
            return Ok(registry);
        }

        let flags = VersionFlags::new(self.version);
        let mut reader = BitReader::new(self.data, self.version);

        let sentinel = reader.read_sentinel()?;
        if sentinel != sentinels::CLASSES_START {
            return Err(DwgError::CorruptSection(
                "classes section start sentinel mismatch".into(),
            ));
        }

        // RL: size of the class data area.
        let size = reader.read_raw_long()? as i64;

        // R2010 files with a late maintenance release carry an extra RL.
        if flags.r2010_plus && self.maintenance_version > 3 {
            let _unknown = reader.read_raw_long()?;
        }

        if flags.r2007_plus {
            // RL: bit length of the class data; the string values live in
            // a sub-stream at its end, located through the flag word.
            let bit_size = reader.read_raw_long()? as i64;
            let flag_pos = reader.position_in_bits() + bit_size - 1;
            let saved = reader.position_in_bits();

            let mut text = BitReader::new(self.data, self.version);
            let string_start = text.set_position_by_flag(flag_pos)?;
            reader.set_position_in_bits(saved)?;

            // BL: 0x00, B: string stream flag.
            reader.read_bit_long()?;
            reader.read_bit()?;

            while reader.position_in_bits() < string_start {
                let class = Self::read_class(&mut reader, &mut text, flags.r2004_plus)?;
                if class.class_number < 500 {
                    break;
                }
                registry.insert(class);
            }
        } else {
            let end_section = reader.position() as i64 + size;

            if self.version == DwgVersion::AC1018 {
                // BS: maximum class number, RC 0x00, RC 0x00, B: true.
                reader.read_bit_short()?;
                reader.read_raw_char()?;
                reader.read_raw_char()?;
                reader.read_bit()?;
            }

            while (reader.position() as i64) < end_section {
                let mut text_unused = BitReader::new(&[], self.version);
                let class = Self::read_class(&mut reader, &mut text_unused, flags.r2004_plus)?;
                registry.insert(class);
            }

            // RS: CRC, then the end sentinel. Some writers pad the data
            // area, so a shifted end sentinel is tolerated.
            let crc_pos = reader.position();
            reader.set_position(crc_pos);
            let _crc = reader.read_raw_ushort()?;
            let _end_sentinel = reader.read_sentinel()?;
        }

        Ok(registry)
    }

    /// Read a single class definition.
    ///
    /// For R2007+ the text values come from the string sub-stream; earlier
    /// versions read them inline (the caller passes the main reader's data
    /// through an empty text reader in that case, and `read_class` falls
    /// back to inline reads).
    fn read_class(
        reader: &mut BitReader<'_>,
        text: &mut BitReader<'_>,
        r2004_plus: bool,
    ) -> Result<DwgClass> {
        let mut class = DwgClass {
            class_number: reader.read_bit_short()?,
            proxy_flags: reader.read_bit_short()? as u16,
            ..Default::default()
        };

        let inline_text = text.stream_length() == 0;
        class.application_name = read_text_value(reader, text, inline_text)?;
        class.cpp_class_name = read_text_value(reader, text, inline_text)?;
        class.dxf_name = read_text_value(reader, text, inline_text)?;

        class.was_zombie = reader.read_bit()?;
        class.item_class_id = reader.read_bit_short()?;
        class.is_an_entity = class.item_class_id == 0x1F2;

        if r2004_plus {
            // BL: instance count, BL: dwg version, BL: maintenance,
            // BL × 2: reserved.
            class.instance_count = reader.read_bit_long()?;
            let _dwg_version = reader.read_bit_long()?;
            let _maintenance = reader.read_bit_long()?;
            reader.read_bit_long()?;
            reader.read_bit_long()?;
        }

        Ok(class)
    }
}

/// Read a TV from the inline object data (pre-R2007) or the string
/// sub-stream (R2007+).
fn read_text_value(
    reader: &mut BitReader<'_>,
    text: &mut BitReader<'_>,
    inline: bool,
) -> Result<String> {
    if inline {
        reader.read_variable_text()
    } else {
        text.read_variable_text()
    }
}
