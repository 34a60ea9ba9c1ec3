//! LZ77 decompression for paged DWG sections.
//!
//! The format uses two LZ77 variants:
//! - **AC18** — R2004, R2010, and R2013 data pages.
//! - **AC21** — R2007 only, with a different opcode table.
//!
//! Both decompressors write into an exactly-preallocated output buffer of
//! the size declared in the page header; any write past that end, or any
//! read past the compressed input, fails `CorruptStream`.

pub mod lz77_ac18;
pub mod lz77_ac21;

pub use lz77_ac18::decompress_ac18;
pub use lz77_ac21::decompress_ac21;

use crate::error::{DwgError, Result};

/// Read one byte of compressed input, failing `CorruptStream` at the end.
#[inline]
pub(crate) fn next_byte(src: &[u8], index: &mut usize) -> Result<u8> {
    let byte = *src
        .get(*index)
        .ok_or_else(|| DwgError::CorruptStream("compressed input exhausted".into()))?;
    *index += 1;
    Ok(byte)
}
