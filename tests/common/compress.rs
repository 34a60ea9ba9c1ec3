//! Minimal LZ77 AC18 encoder for test fixtures.
//!
//! Emits a single literal run plus the terminator — valid (if incompressible)
//! AC18 streams that exercise the decompressor's literal and extension-byte
//! paths on read-back. The opcode grammar cannot express literal runs
//! shorter than 4 bytes, so callers pad their inputs accordingly.

#![allow(dead_code)]

/// Encode `data` as one literal run followed by the stream terminator.
pub fn lz77_ac18_store(data: &[u8]) -> Vec<u8> {
    assert!(
        data.len() >= 4,
        "AC18 literal runs cannot encode fewer than 4 bytes (got {})",
        data.len()
    );

    let mut out = Vec::with_capacity(data.len() + 8);
    let run = data.len() - 3;

    if run <= 0x0F {
        // The run fits the opcode's low nibble.
        out.push(run as u8);
    } else {
        // Nibble 0 spills the run length into extension bytes: each 0x00
        // adds 0xFF, the closing byte adds 0x0F + itself.
        out.push(0x00);
        let mut rest = run - 0x0F;
        while rest > 0xFF {
            out.push(0x00);
            rest -= 0xFF;
        }
        out.push(rest as u8);
    }

    out.extend_from_slice(data);
    out.push(0x11);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_run_header() {
        let encoded = lz77_ac18_store(b"ABCD");
        assert_eq!(encoded[0], 0x01);
        assert_eq!(*encoded.last().unwrap(), 0x11);
    }

    #[test]
    fn test_long_run_uses_extension() {
        let data = vec![0x55u8; 100];
        let encoded = lz77_ac18_store(&data);
        assert_eq!(encoded[0], 0x00);
    }
}
