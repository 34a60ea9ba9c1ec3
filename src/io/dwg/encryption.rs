//! Decryption routines for AC18+ file structures.
//!
//! Two mechanisms:
//!
//! 1. **LCG XOR keystream** — the 0x6C-byte metadata block at offset 0x80
//!    is XORed with a byte stream derived from a linear congruential
//!    generator (state × 0x343FD + 0x269EC3, output = state >> 16).
//! 2. **Position-based XOR mask** — every data page header (8 × i32) is
//!    XORed with `0x4164536B ^ page_file_position`.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use super::constants::ac18;

/// XOR a buffer in place with the header-metadata LCG keystream.
///
/// The keystream is symmetric, so the same call encrypts and decrypts.
pub fn apply_metadata_keystream(data: &mut [u8]) {
    let mut state: i32 = 1;
    for byte in data.iter_mut() {
        state = state.wrapping_mul(0x343FD).wrapping_add(0x269EC3);
        *byte ^= (state >> 16) as u8;
    }
}

/// Decrypted AC18+ data section page header fields.
///
/// Each data page in the file starts with this 32-byte encrypted header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Section page type — `0x4163043B` for normal data sections.
    pub page_type: i32,
    /// Section number within the descriptor.
    pub section_number: i32,
    /// Compressed data size in bytes.
    pub compressed_size: i32,
    /// Decompressed (page) size in bytes.
    pub page_size: i32,
    /// Start offset in the decompressed buffer.
    pub start_offset: i32,
    /// Checksum over the header bytes, seeded with the data checksum.
    pub header_checksum: i32,
    /// Checksum over the compressed data bytes, seeded with 0.
    pub data_checksum: i32,
    /// Reserved, written as 0.
    pub unknown: i32,
}

/// Decrypt an AC18+ data section page header.
///
/// `stream_position` is the absolute file offset where the 32-byte header
/// starts; it feeds the XOR mask, so the same header bytes at different
/// positions decrypt differently.
pub fn decrypt_page_header(data: &[u8; 32], stream_position: u64) -> PageHeader {
    let mask = (ac18::DECRYPTION_MASK ^ (stream_position as u32)) as i32;
    let mut cursor = Cursor::new(&data[..]);
    let mut field = || cursor.read_i32::<LittleEndian>().unwrap_or(0) ^ mask;

    PageHeader {
        page_type: field(),
        section_number: field(),
        compressed_size: field(),
        page_size: field(),
        start_offset: field(),
        header_checksum: field(),
        data_checksum: field(),
        unknown: field(),
    }
}
