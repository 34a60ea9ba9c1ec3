//! Reed-Solomon byte de-interleaving for AC21 (R2007) files.
//!
//! The "Reed-Solomon" coding in R2007 headers carries no error correction
//! in practice; decoding reduces to de-interleaving bytes distributed
//! across `factor` tracks of `block_size` data bytes each.

/// De-interleave a Reed-Solomon encoded byte array.
///
/// For the R2007 file header metadata block: `factor = 3`,
/// `block_size = 239`, output = 717 bytes.
pub fn rs_decode(encoded: &[u8], output_size: usize, factor: usize, block_size: usize) -> Vec<u8> {
    let mut buffer = vec![0u8; output_size];
    let mut index = 0usize;
    let mut remaining = output_size;

    for track in 0..factor {
        let size = remaining.min(block_size);
        remaining -= size;

        let mut cindex = track;
        for _ in 0..size {
            if cindex < encoded.len() {
                buffer[index] = encoded[cindex];
            }
            index += 1;
            cindex += factor;
        }
    }

    buffer
}
