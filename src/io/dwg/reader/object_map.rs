//! Object map (handle → offset index) from the `AcDb:Handles` section.
//!
//! The section is a run of subsections, each at most 2032 payload bytes.
//! A subsection opens with a big-endian u16 byte count (covering the count
//! word through the trailing CRC) and closes with a big-endian CRC-16 over
//! everything before it; the run terminates at a subsection of size 2.
//! Within a subsection, `(handle, offset)` pairs are delta-encoded against
//! the running pair as unsigned / signed modular chars.

use std::collections::HashMap;

use crate::error::{DwgError, Result};
use crate::io::dwg::constants::{handle_section, OBJECT_CRC_SEED};
use crate::io::dwg::crc::crc8;
use crate::types::DwgVersion;

use super::bit_reader::BitReader;

/// Handle → offset index, preserving on-disk encounter order.
#[derive(Debug, Default)]
pub struct ObjectMap {
    entries: Vec<(u64, i64)>,
    index: HashMap<u64, usize>,
}

impl ObjectMap {
    /// Look up the stream offset for a handle.
    pub fn lookup(&self, handle: u64) -> Option<i64> {
        self.index.get(&handle).map(|&i| self.entries[i].1)
    }

    /// Iterate `(handle, offset)` pairs in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, i64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, handle: u64, offset: i64) {
        match self.index.get(&handle) {
            Some(&i) => self.entries[i].1 = offset,
            None => {
                self.index.insert(handle, self.entries.len());
                self.entries.push((handle, offset));
            }
        }
    }
}

/// Reader for the handle-map section.
pub struct ObjectMapReader<'a> {
    data: &'a [u8],
    version: DwgVersion,
}

impl<'a> ObjectMapReader<'a> {
    pub fn new(version: DwgVersion, data: &'a [u8]) -> Self {
        Self { data, version }
    }

    /// Read the whole map, validating each subsection's CRC.
    pub fn read(&self) -> Result<ObjectMap> {
        let mut map = ObjectMap::default();
        let mut reader = BitReader::new(self.data, self.version);

        loop {
            let section_start = reader.position();

            // Big-endian u16: total byte count of this subsection.
            let hi = reader.read_byte()? as i32;
            let lo = reader.read_byte()? as i32;
            let size = (hi << 8) | lo;

            if size == 2 {
                break;
            }
            if size < 2 || size - 2 > handle_section::MAX_CHUNK_SIZE + 2 {
                return Err(DwgError::CorruptHandles(format!(
                    "subsection size {size} out of range"
                )));
            }

            // The running pair resets at each subsection.
            let mut last_handle: u64 = 0;
            let mut last_offset: i64 = 0;

            let payload_end = section_start + size as usize - 2;
            while reader.position() < payload_end {
                let delta = reader.read_modular_char()?;
                last_handle = last_handle.wrapping_add(delta);
                last_offset += reader.read_signed_modular_char()?;

                // A zero handle delta marks a dead reference.
                if delta > 0 {
                    map.insert(last_handle, last_offset);
                }
            }

            // Big-endian CRC-16 over the subsection, size word included.
            let stored = ((reader.read_byte()? as u16) << 8) | reader.read_byte()? as u16;
            let computed = crc8(
                OBJECT_CRC_SEED,
                &self.data[section_start..section_start + size as usize - 2],
            );
            if stored != computed {
                return Err(DwgError::CorruptHandles(format!(
                    "subsection at {section_start}: stored CRC {stored:#06X}, computed {computed:#06X}"
                )));
            }
        }

        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encode one handle-map subsection with a valid trailing CRC.
    fn subsection(pairs: &[(u64, i64)]) -> Vec<u8> {
        let mut payload = Vec::new();
        let mut last_handle = 0u64;
        let mut last_offset = 0i64;
        for &(handle, offset) in pairs {
            push_mc(&mut payload, handle - last_handle);
            push_signed_mc(&mut payload, offset - last_offset);
            last_handle = handle;
            last_offset = offset;
        }

        let size = (payload.len() + 4) as u16;
        let mut out = vec![(size >> 8) as u8, size as u8];
        out.extend_from_slice(&payload);
        let crc = crc8(OBJECT_CRC_SEED, &out);
        out.push((crc >> 8) as u8);
        out.push(crc as u8);
        out
    }

    fn push_mc(out: &mut Vec<u8>, mut value: u64) {
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            out.push(byte);
            if value == 0 {
                break;
            }
        }
    }

    fn push_signed_mc(out: &mut Vec<u8>, value: i64) {
        let negative = value < 0;
        let mut magnitude = value.unsigned_abs();
        loop {
            if magnitude < 0x40 {
                let mut byte = magnitude as u8;
                if negative {
                    byte |= 0x40;
                }
                out.push(byte);
                return;
            }
            out.push((magnitude & 0x7F) as u8 | 0x80);
            magnitude >>= 7;
        }
    }

    fn terminator() -> Vec<u8> {
        vec![0x00, 0x02]
    }

    #[test]
    fn test_empty_map() {
        let data = terminator();
        let map = ObjectMapReader::new(DwgVersion::AC1015, &data).read().unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_delta_pairs() {
        let mut data = subsection(&[(0x10, 0x100), (0x12, 0x180), (0x20, 0x90)]);
        data.extend(terminator());
        let map = ObjectMapReader::new(DwgVersion::AC1015, &data).read().unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map.lookup(0x10), Some(0x100));
        assert_eq!(map.lookup(0x12), Some(0x180));
        assert_eq!(map.lookup(0x20), Some(0x90));
        assert_eq!(map.lookup(0x99), None);

        let order: Vec<u64> = map.iter().map(|(h, _)| h).collect();
        assert_eq!(order, vec![0x10, 0x12, 0x20]);
    }

    #[test]
    fn test_crc_mismatch() {
        let mut data = subsection(&[(0x10, 0x100)]);
        let last = data.len() - 1;
        data[last] ^= 0xFF;
        data.extend(terminator());
        let err = ObjectMapReader::new(DwgVersion::AC1015, &data)
            .read()
            .unwrap_err();
        assert!(matches!(err, DwgError::CorruptHandles(_)));
    }

    #[test]
    fn test_multiple_subsections_reset_running_pair() {
        let mut data = subsection(&[(0x10, 0x100)]);
        data.extend(subsection(&[(0x40, 0x300)]));
        data.extend(terminator());
        let map = ObjectMapReader::new(DwgVersion::AC1015, &data).read().unwrap();
        assert_eq!(map.lookup(0x10), Some(0x100));
        assert_eq!(map.lookup(0x40), Some(0x300));
    }

    #[test]
    fn test_truncated_section() {
        // Size promises more payload than present.
        let data = vec![0x00, 0x20, 0x01];
        let err = ObjectMapReader::new(DwgVersion::AC1015, &data)
            .read()
            .unwrap_err();
        assert!(matches!(err, DwgError::BitUnderflow { .. }));
    }
}
