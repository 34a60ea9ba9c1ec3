//! # dwgread
//!
//! A pure Rust, read-only decoder for the binary DWG CAD format,
//! releases R2000 (AC1015) through R2013 (AC1027).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! let doc = dwgread::read("drawing.dwg")?;
//!
//! for entity in doc.modelspace().query("LINE ARC") {
//!     println!("{} {}", entity.dxftype(), entity.handle());
//! }
//! # Ok::<(), dwgread::DwgError>(())
//! ```
//!
//! ## Architecture
//!
//! - `io::dwg` — the wire-format machinery: bit-level readers, the two
//!   LZ77 codecs, CRC/checksum validation, file header and section maps,
//!   the object map, and the per-entity parsers.
//! - `entities` — immutable normalized records with angles stored as read
//!   (radians); the degree-normalized view is `Entity::dxf()`.
//! - `document` — entities grouped by layout with a lazy type-filter
//!   query preserving source order.
//! - `raw` — per-entity decode functions returning raw records.
//! - `convert` — the optional external downgrade shim for R2013 files.

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod convert;
pub mod document;
pub mod entities;
pub mod error;
pub mod io;
pub mod notification;
pub mod raw;
pub mod types;

use std::path::Path;

// Re-export commonly used types
pub use document::{DwgDocument, Layout, Query};
pub use entities::{Entity, EntityKind};
pub use error::{DwgError, Result};
pub use io::dwg::reader::{DwgFileReader, DwgReaderConfiguration};
pub use types::{Color, DwgVersion, Handle, LineWeight, Transparency, Vector2, Vector3};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Decode a DWG file into a document. The main entry point.
pub fn read<P: AsRef<Path>>(path: P) -> Result<DwgDocument> {
    DwgFileReader::from_file(path)?.read()
}

/// Decode a DWG byte buffer into a document.
pub fn read_bytes(data: Vec<u8>) -> Result<DwgDocument> {
    DwgFileReader::from_bytes(data)?.read()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_read_rejects_garbage() {
        let err = read_bytes(vec![0u8; 64]).unwrap_err();
        assert!(matches!(err, DwgError::UnsupportedVersion(_)));
    }
}
