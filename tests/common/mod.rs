//! Shared test support: bit-level writer, the store-mode LZ77 encoder,
//! and whole-file DWG image builders.

pub mod bit_writer;
pub mod builders;
pub mod compress;
