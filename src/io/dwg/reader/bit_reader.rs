//! Bit-level stream reader for packed object data.
//!
//! DWG object data is bit-aligned, not byte-aligned. Every value is encoded
//! with one of the format's typed bit codes:
//!
//! - **B** — bit, **BB** — 2-bit code, **3B** — 3-bit code
//! - **BS** / **BL** / **BLL** — tagged short / long / long-long
//! - **BD** — tagged double, **DD** — double patched against a default
//! - **RC** / **RS** / **RL** / **RD** — raw LE values (bit-shifted)
//! - **MC** / **MS** — modular char / short (7- and 15-bit groups)
//! - **H** — handle reference, **T** / **TU** / **TV** — text
//! - **SN** — 16-byte sentinel, **CMC** / **ENC** — colors
//! - **BE** — extrusion, **BT** — thickness, **OT** — object type
//!
//! The reader keeps a `(byte position, bit shift)` cursor; byte reads
//! assemble each output byte from at most two adjacent source bytes. Reads
//! past the end of the buffer fail [`DwgError::BitUnderflow`].

use encoding_rs::Encoding;

use crate::error::{DwgError, Result};
use crate::types::{Color, DwgVersion, Transparency, Vector2, Vector3};

/// Handle reference codes 0x6/0x8/0xA/0xC encode the handle relative to the
/// object that references it; the rest are absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleCode {
    SoftOwnership,
    HardOwnership,
    SoftPointer,
    HardPointer,
    PlusOne,
    MinusOne,
    PlusOffset,
    MinusOffset,
    Undefined,
}

impl HandleCode {
    fn from_nibble(code: u8) -> Self {
        match code {
            2 => HandleCode::SoftOwnership,
            3 => HandleCode::HardOwnership,
            4 => HandleCode::SoftPointer,
            5 => HandleCode::HardPointer,
            6 => HandleCode::PlusOne,
            8 => HandleCode::MinusOne,
            0xA => HandleCode::PlusOffset,
            0xC => HandleCode::MinusOffset,
            _ => HandleCode::Undefined,
        }
    }
}

/// Bit-level reader over a borrowed byte buffer.
pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
    bit_shift: u8,
    last_byte: u8,
    version: DwgVersion,
    encoding: &'static Encoding,
    /// Set when a string-stream probe found no string data (R2007+).
    is_empty: bool,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8], version: DwgVersion) -> Self {
        Self {
            data,
            position: 0,
            bit_shift: 0,
            last_byte: 0,
            version,
            encoding: encoding_rs::WINDOWS_1252,
            is_empty: false,
        }
    }

    pub fn version(&self) -> DwgVersion {
        self.version
    }

    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = encoding;
    }

    /// Whether the string-stream probe marked this reader empty.
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn stream_length(&self) -> usize {
        self.data.len()
    }

    // ---------------------------------------------------------------
    // Cursor
    // ---------------------------------------------------------------

    /// Current byte position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Set the byte position and reset the bit shift.
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
        self.bit_shift = 0;
    }

    /// Absolute position in bits.
    pub fn position_in_bits(&self) -> i64 {
        let bits = self.position as i64 * 8;
        if self.bit_shift > 0 {
            bits + self.bit_shift as i64 - 8
        } else {
            bits
        }
    }

    /// Set the absolute position in bits.
    pub fn set_position_in_bits(&mut self, position: i64) -> Result<()> {
        self.position = (position >> 3) as usize;
        self.bit_shift = (position & 7) as u8;
        if self.bit_shift > 0 {
            self.advance_byte()?;
        }
        Ok(())
    }

    /// Skip `count` whole bytes from the current bit position.
    pub fn advance(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        if count > 1 {
            self.position = self
                .position
                .checked_add(count - 1)
                .ok_or_else(|| self.underflow())?;
        }
        self.read_byte()?;
        Ok(())
    }

    fn underflow(&self) -> DwgError {
        DwgError::BitUnderflow {
            position: self.position_in_bits(),
        }
    }

    /// Fetch the next raw byte into `last_byte`.
    fn advance_byte(&mut self) -> Result<()> {
        let byte = *self.data.get(self.position).ok_or_else(|| self.underflow())?;
        self.position += 1;
        self.last_byte = byte;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Bits and bytes
    // ---------------------------------------------------------------

    /// **B** — read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bit_shift == 0 {
            self.advance_byte()?;
            self.bit_shift = 1;
            return Ok((self.last_byte & 0x80) != 0);
        }

        let value = ((self.last_byte << self.bit_shift) & 0x80) != 0;
        self.bit_shift = (self.bit_shift + 1) & 7;
        Ok(value)
    }

    /// **BB** — read a 2-bit code.
    pub fn read_2bits(&mut self) -> Result<u8> {
        let value;
        if self.bit_shift == 0 {
            self.advance_byte()?;
            value = self.last_byte >> 6;
            self.bit_shift = 2;
        } else if self.bit_shift == 7 {
            let high = (self.last_byte << 1) & 2;
            self.advance_byte()?;
            value = high | (self.last_byte >> 7);
            self.bit_shift = 1;
        } else {
            value = (self.last_byte >> (6 - self.bit_shift)) & 3;
            self.bit_shift = (self.bit_shift + 2) & 7;
        }
        Ok(value)
    }

    /// **3B** — read a 3-bit code (most significant bit first).
    pub fn read_3bits(&mut self) -> Result<u8> {
        let b1 = self.read_bit()? as u8;
        let b2 = (b1 << 1) | self.read_bit()? as u8;
        Ok((b2 << 1) | self.read_bit()? as u8)
    }

    /// Read one byte across the current bit shift.
    pub fn read_byte(&mut self) -> Result<u8> {
        if self.bit_shift == 0 {
            self.advance_byte()?;
            return Ok(self.last_byte);
        }

        let high = (self.last_byte as u16) << self.bit_shift;
        self.advance_byte()?;
        Ok((high as u8) | (self.last_byte >> (8 - self.bit_shift)))
    }

    /// Read `length` bytes across the current bit shift.
    pub fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        // Corrupt length fields would otherwise drive absurd allocations.
        if length > 16 * 1024 * 1024 {
            return Err(DwgError::Parse(format!(
                "byte read of {length} exceeds 16 MB sanity limit"
            )));
        }

        let mut out = vec![0u8; length];
        if self.bit_shift == 0 {
            let end = self
                .position
                .checked_add(length)
                .filter(|&e| e <= self.data.len())
                .ok_or_else(|| self.underflow())?;
            out.copy_from_slice(&self.data[self.position..end]);
            self.position = end;
            if length > 0 {
                self.last_byte = out[length - 1];
            }
        } else {
            for slot in out.iter_mut() {
                *slot = self.read_byte()?;
            }
        }
        Ok(out)
    }

    // ---------------------------------------------------------------
    // Raw LE scalars (bit-shifted)
    // ---------------------------------------------------------------

    /// **RC** — raw char.
    pub fn read_raw_char(&mut self) -> Result<u8> {
        self.read_byte()
    }

    /// **RS** — raw short, little-endian.
    pub fn read_raw_short(&mut self) -> Result<i16> {
        let b0 = self.read_byte()? as u16;
        let b1 = self.read_byte()? as u16;
        Ok((b0 | (b1 << 8)) as i16)
    }

    /// **RS** — raw unsigned short, little-endian.
    pub fn read_raw_ushort(&mut self) -> Result<u16> {
        Ok(self.read_raw_short()? as u16)
    }

    /// **RL** — raw long, little-endian.
    pub fn read_raw_long(&mut self) -> Result<i32> {
        let b0 = self.read_byte()? as u32;
        let b1 = self.read_byte()? as u32;
        let b2 = self.read_byte()? as u32;
        let b3 = self.read_byte()? as u32;
        Ok((b0 | (b1 << 8) | (b2 << 16) | (b3 << 24)) as i32)
    }

    /// **RD** — raw double, little-endian IEEE 754.
    pub fn read_raw_double(&mut self) -> Result<f64> {
        let mut bytes = [0u8; 8];
        for slot in bytes.iter_mut() {
            *slot = self.read_byte()?;
        }
        Ok(f64::from_le_bytes(bytes))
    }

    /// **2RD** — two raw doubles.
    pub fn read_2raw_double(&mut self) -> Result<Vector2> {
        Ok(Vector2::new(self.read_raw_double()?, self.read_raw_double()?))
    }

    // ---------------------------------------------------------------
    // Tagged values
    // ---------------------------------------------------------------

    /// **BS** — bit short: 2-bit tag, then 16-bit raw / 8-bit raw / 0 / 256.
    pub fn read_bit_short(&mut self) -> Result<i16> {
        match self.read_2bits()? {
            0 => self.read_raw_short(),
            1 => Ok(self.read_byte()? as i16),
            2 => Ok(0),
            _ => Ok(256),
        }
    }

    /// **BL** — bit long: 2-bit tag, then 32-bit raw / 8-bit raw / 0.
    pub fn read_bit_long(&mut self) -> Result<i32> {
        match self.read_2bits()? {
            0 => self.read_raw_long(),
            1 => Ok(self.read_byte()? as i32),
            2 => Ok(0),
            _ => Err(DwgError::Parse("reserved BL tag 11".into())),
        }
    }

    /// **BLL** — bit long long: 3-bit byte count, then that many LE bytes.
    pub fn read_bit_long_long(&mut self) -> Result<i64> {
        let size = self.read_3bits()?;
        let mut value: u64 = 0;
        for i in 0..size {
            value |= (self.read_byte()? as u64) << ((i as u64) << 3);
        }
        Ok(value as i64)
    }

    /// **BD** — bit double: 2-bit tag, then 64-bit IEEE / 1.0 / 0.0.
    pub fn read_bit_double(&mut self) -> Result<f64> {
        match self.read_2bits()? {
            0 => self.read_raw_double(),
            1 => Ok(1.0),
            2 => Ok(0.0),
            _ => Err(DwgError::Parse("reserved BD tag 11".into())),
        }
    }

    /// **DD** — bit double patched against a default value.
    ///
    /// Tag 00 keeps the default; 01 patches the low 4 bytes; 10 patches
    /// bytes 4-5 then 0-3; 11 is a full raw double.
    pub fn read_bit_double_with_default(&mut self, default: f64) -> Result<f64> {
        let mut bytes = default.to_le_bytes();
        match self.read_2bits()? {
            0 => Ok(default),
            1 => {
                for slot in bytes.iter_mut().take(4) {
                    *slot = self.read_byte()?;
                }
                Ok(f64::from_le_bytes(bytes))
            }
            2 => {
                bytes[4] = self.read_byte()?;
                bytes[5] = self.read_byte()?;
                for slot in bytes.iter_mut().take(4) {
                    *slot = self.read_byte()?;
                }
                Ok(f64::from_le_bytes(bytes))
            }
            _ => self.read_raw_double(),
        }
    }

    /// **2BD** — two bit doubles.
    pub fn read_2bit_double(&mut self) -> Result<Vector2> {
        Ok(Vector2::new(self.read_bit_double()?, self.read_bit_double()?))
    }

    /// **3BD** — three bit doubles.
    pub fn read_3bit_double(&mut self) -> Result<Vector3> {
        Ok(Vector3::new(
            self.read_bit_double()?,
            self.read_bit_double()?,
            self.read_bit_double()?,
        ))
    }

    // ---------------------------------------------------------------
    // Modular values
    // ---------------------------------------------------------------

    /// **MC** — unsigned modular char: 7-bit groups, high bit continues,
    /// little-endian assembly.
    pub fn read_modular_char(&mut self) -> Result<u64> {
        let first = self.read_byte()?;
        let mut value = (first & 0x7F) as u64;

        if (first & 0x80) != 0 {
            let mut shift = 0u32;
            loop {
                shift += 7;
                let byte = self.read_byte()?;
                value |= ((byte & 0x7F) as u64) << shift;
                if (byte & 0x80) == 0 {
                    break;
                }
            }
        }
        Ok(value)
    }

    /// **MC** — signed modular char: the terminator byte carries the sign
    /// in bit 6.
    pub fn read_signed_modular_char(&mut self) -> Result<i64> {
        let first = self.read_byte()?;

        if (first & 0x80) == 0 {
            let mut value = (first & 0x3F) as i64;
            if (first & 0x40) != 0 {
                value = -value;
            }
            return Ok(value);
        }

        let mut shift = 0u32;
        let mut sum = (first & 0x7F) as i64;
        loop {
            shift += 7;
            let byte = self.read_byte()?;
            if (byte & 0x80) != 0 {
                sum |= ((byte & 0x7F) as i64) << shift;
            } else {
                let mut value = sum | (((byte & 0x3F) as i64) << shift);
                if (byte & 0x40) != 0 {
                    value = -value;
                }
                return Ok(value);
            }
        }
    }

    /// **MS** — modular short: 15-bit groups, high bit of the second byte
    /// of each pair continues.
    pub fn read_modular_short(&mut self) -> Result<i32> {
        let b1 = self.read_byte()?;
        let b2 = self.read_byte()?;

        let mut value = (b1 as i32) | (((b2 & 0x7F) as i32) << 8);
        let mut done = (b2 & 0x80) == 0;
        let mut shift = 15i32;

        while !done {
            let b1 = self.read_byte()?;
            let b2 = self.read_byte()?;
            done = (b2 & 0x80) == 0;

            value |= (b1 as i32) << shift;
            shift += 8;
            value |= ((b2 & 0x7F) as i32) << shift;
            shift += 7;
        }

        Ok(value)
    }

    // ---------------------------------------------------------------
    // Handles
    // ---------------------------------------------------------------

    /// **H** — handle reference, absolute form.
    pub fn handle_reference(&mut self) -> Result<u64> {
        self.handle_reference_resolved(0)
    }

    /// **H** — handle reference resolved against the referencing object's
    /// handle (codes 6/8/A/C are relative).
    pub fn handle_reference_resolved(&mut self, reference: u64) -> Result<u64> {
        let (handle, _) = self.handle_reference_typed(reference)?;
        Ok(handle)
    }

    /// **H** — handle reference with its code.
    ///
    /// Wire form: `|CODE (4 bits)|COUNTER (4 bits)|value bytes|` with the
    /// value interpreted big-endian.
    pub fn handle_reference_typed(&mut self, reference: u64) -> Result<(u64, HandleCode)> {
        let form = self.read_byte()?;
        let code = form >> 4;
        let counter = (form & 0x0F) as usize;
        let kind = HandleCode::from_nibble(code);

        let value = match code {
            0..=5 => self.read_handle_value(counter)?,
            0x6 => reference.wrapping_add(1),
            0x8 => reference.wrapping_sub(1),
            0xA => {
                let offset = self.read_handle_value(counter)?;
                reference.wrapping_add(offset)
            }
            0xC => {
                let offset = self.read_handle_value(counter)?;
                reference.wrapping_sub(offset)
            }
            _ => {
                return Err(DwgError::Parse(format!(
                    "invalid handle reference code {code}"
                )));
            }
        };

        Ok((value, kind))
    }

    /// Read a handle's big-endian value bytes.
    fn read_handle_value(&mut self, length: usize) -> Result<u64> {
        if length > 8 {
            return Err(DwgError::Parse(format!(
                "handle byte count {length} exceeds maximum of 8"
            )));
        }
        let mut value = 0u64;
        for _ in 0..length {
            value = (value << 8) | self.read_byte()? as u64;
        }
        Ok(value)
    }

    // ---------------------------------------------------------------
    // Text
    // ---------------------------------------------------------------

    /// **TV** — variable text: **T** (BS length + code-page bytes) before
    /// AC1021, **TU** (BS length + UTF-16LE code units) from AC1021 on.
    pub fn read_variable_text(&mut self) -> Result<String> {
        if self.version >= DwgVersion::AC1021 {
            let length = self.read_bit_short()?;
            if length <= 0 {
                return Ok(String::new());
            }
            let bytes = self.read_bytes((length as usize) << 1)?;
            let (decoded, _, _) = encoding_rs::UTF_16LE.decode(&bytes);
            Ok(decoded.replace('\0', ""))
        } else {
            let length = self.read_bit_short()?;
            if length <= 0 {
                return Ok(String::new());
            }
            let bytes = self.read_bytes(length as usize)?;
            let (decoded, _, _) = self.encoding.decode(&bytes);
            Ok(decoded.replace('\0', ""))
        }
    }

    // ---------------------------------------------------------------
    // Sentinel
    // ---------------------------------------------------------------

    /// **SN** — 16-byte sentinel.
    pub fn read_sentinel(&mut self) -> Result<[u8; 16]> {
        let bytes = self.read_bytes(16)?;
        let mut sentinel = [0u8; 16];
        sentinel.copy_from_slice(&bytes);
        Ok(sentinel)
    }

    // ---------------------------------------------------------------
    // Colors
    // ---------------------------------------------------------------

    /// **CMC** — table-record color: BS index before AC1018, BS + BL + a
    /// name-flags byte from AC1018 on.
    ///
    /// Returns the color and the name-flags byte; bit 0 means a color name
    /// string follows in the text stream, bit 1 a book name. The caller
    /// consumes those strings from whichever stream carries text for the
    /// current version.
    pub fn read_cm_color(&mut self) -> Result<(Color, u8)> {
        if self.version >= DwgVersion::AC1018 {
            let _index = self.read_bit_short()?;
            let rgb = self.read_bit_long()? as u32;
            let bytes = rgb.to_le_bytes();

            let color = if rgb == 0xC000_0000 {
                Color::ByLayer
            } else if (rgb & 0x0100_0000) != 0 {
                Color::Index(bytes[0])
            } else {
                Color::from_rgb(bytes[2], bytes[1], bytes[0])
            };

            let flags = self.read_byte()?;
            Ok((color, flags))
        } else {
            Ok((Color::from_index(self.read_bit_short()?), 0))
        }
    }

    /// **ENC** — entity color with transparency and color-handle flag.
    pub fn read_en_color(&mut self) -> Result<(Color, Transparency, bool)> {
        if self.version >= DwgVersion::AC1018 {
            let word = self.read_bit_short()? as u16;
            if word == 0 {
                return Ok((Color::ByBlock, Transparency::OPAQUE, false));
            }

            let flags = word & 0xFF00;
            let mut transparency = Transparency::ByLayer;
            let mut has_color_handle = false;

            let color = if (flags & 0x4000) != 0 {
                // AcDbColor reference follows in the handle stream
                has_color_handle = true;
                Color::ByBlock
            } else if (flags & 0x8000) != 0 {
                let rgb = self.read_bit_long()? as u32;
                let bytes = rgb.to_le_bytes();
                Color::from_rgb(bytes[2], bytes[1], bytes[0])
            } else {
                Color::from_index((word & 0x0FFF) as i16)
            };

            if (flags & 0x2000) != 0 {
                transparency = Transparency::from_alpha_value(self.read_bit_long()? as u32);
            }

            Ok((color, transparency, has_color_handle))
        } else {
            let index = self.read_bit_short()?;
            Ok((Color::from_index(index), Transparency::ByLayer, false))
        }
    }

    // ---------------------------------------------------------------
    // Special types
    // ---------------------------------------------------------------

    /// **OT** — object type code: BS before AC1024, 2-bit pair form after.
    pub fn read_object_type(&mut self) -> Result<i16> {
        if self.version >= DwgVersion::AC1024 {
            match self.read_2bits()? {
                0 => Ok(self.read_byte()? as i16),
                1 => Ok(0x1F0 + self.read_byte()? as i16),
                _ => self.read_raw_short(),
            }
        } else {
            self.read_bit_short()
        }
    }

    /// **BE** — bit extrusion: flag bit set means (0, 0, 1).
    pub fn read_bit_extrusion(&mut self) -> Result<Vector3> {
        if self.read_bit()? {
            Ok(Vector3::UNIT_Z)
        } else {
            self.read_3bit_double()
        }
    }

    /// **BT** — bit thickness: flag bit set means 0.0.
    pub fn read_bit_thickness(&mut self) -> Result<f64> {
        if self.read_bit()? {
            Ok(0.0)
        } else {
            self.read_bit_double()
        }
    }

    // ---------------------------------------------------------------
    // String stream location (R2007+)
    // ---------------------------------------------------------------

    /// Position this reader at the start of the string sub-stream whose end
    /// bit is `end_position`, following the flag-word scheme: a set flag
    /// bit precedes a 16-bit size, with bit 0x8000 escaping to a 32-bit
    /// split size.
    ///
    /// Returns the string stream's start position in bits. When the flag
    /// bit is clear the reader is marked empty and parked at the end.
    pub fn set_position_by_flag(&mut self, end_position: i64) -> Result<i64> {
        self.set_position_in_bits(end_position)?;

        if self.read_bit()? {
            let mut length = end_position - 16;
            self.set_position_in_bits(length)?;
            let mut size = self.read_raw_ushort()? as i64;

            if (size & 0x8000) != 0 {
                length -= 16;
                self.set_position_in_bits(length)?;
                size &= 0x7FFF;
                let hi = self.read_raw_ushort()? as i64;
                size += (hi & 0xFFFF) << 15;
            }

            let start = length - size;
            self.set_position_in_bits(start)?;
            Ok(start)
        } else {
            self.is_empty = true;
            let end = self.data.len();
            self.set_position(end);
            Ok(end_position)
        }
    }
}
