//! Raw per-entity decode surface for tooling and diagnostics.
//!
//! These functions run a full decode but hand back `(handle, record)`
//! pairs with the values exactly as read from the file — angles in
//! radians, nothing normalized — bypassing the layout grouping of the
//! document model.

use std::path::Path;

use crate::entities::{Arc, EntityKind, Insert, Line, LwPolyline};
use crate::error::Result;
use crate::io::dwg::reader::DwgFileReader;
use crate::types::Handle;

/// Decode all LINE entities from a DWG file.
pub fn decode_line_entities<P: AsRef<Path>>(path: P) -> Result<Vec<(Handle, Line)>> {
    let document = DwgFileReader::from_file(path)?.read()?;
    Ok(document
        .entities()
        .filter_map(|e| match &e.kind {
            EntityKind::Line(line) => Some((e.handle(), line.clone())),
            _ => None,
        })
        .collect())
}

/// Decode all ARC entities from a DWG file. Angles stay in radians.
pub fn decode_arc_entities<P: AsRef<Path>>(path: P) -> Result<Vec<(Handle, Arc)>> {
    let document = DwgFileReader::from_file(path)?.read()?;
    Ok(document
        .entities()
        .filter_map(|e| match &e.kind {
            EntityKind::Arc(arc) => Some((e.handle(), arc.clone())),
            _ => None,
        })
        .collect())
}

/// Decode all LWPOLYLINE entities from a DWG file, keeping the parallel
/// point/bulge/width arrays of the wire format.
pub fn decode_lwpolyline_entities<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<(Handle, LwPolyline)>> {
    let document = DwgFileReader::from_file(path)?.read()?;
    Ok(document
        .entities()
        .filter_map(|e| match &e.kind {
            EntityKind::LwPolyline(poly) => Some((e.handle(), poly.clone())),
            _ => None,
        })
        .collect())
}

/// Decode all INSERT entities from a DWG file.
pub fn decode_insert_entities<P: AsRef<Path>>(path: P) -> Result<Vec<(Handle, Insert)>> {
    let document = DwgFileReader::from_file(path)?.read()?;
    Ok(document
        .entities()
        .filter_map(|e| match &e.kind {
            EntityKind::Insert(insert) => Some((e.handle(), insert.clone())),
            _ => None,
        })
        .collect())
}
