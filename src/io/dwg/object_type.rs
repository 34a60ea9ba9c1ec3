//! Object type codes.
//!
//! Every object in the `AcDb:AcDbObjects` stream opens with a type code.
//! Codes below 500 are fixed by the format; 500 and above index the class
//! definitions from `AcDb:Classes`.

/// Fixed type codes the dispatcher routes to full parsers.
pub mod codes {
    pub const TEXT: i16 = 0x01;
    pub const INSERT: i16 = 0x07;
    pub const DIMENSION_LINEAR: i16 = 0x15;
    pub const DIMENSION_RADIUS: i16 = 0x19;
    pub const DIMENSION_DIAMETER: i16 = 0x1A;
    pub const ARC: i16 = 0x11;
    pub const CIRCLE: i16 = 0x12;
    pub const LINE: i16 = 0x13;
    pub const POINT: i16 = 0x1B;
    pub const ELLIPSE: i16 = 0x23;
    pub const MTEXT: i16 = 0x2C;
    pub const LWPOLYLINE: i16 = 0x4D;
    pub const LAYER: i16 = 0x33;
}

/// First class-based type code.
pub const FIRST_CLASS_CODE: i16 = 500;

/// Whether a fixed type code denotes a graphical entity (as opposed to a
/// table entry, control object, or non-graphical object).
pub fn is_fixed_entity_code(code: i16) -> bool {
    matches!(code,
        0x01..=0x08          // text, attrib, attdef, block, endblk, seqend, insert, minsert
        | 0x0A..=0x29        // vertices, polylines, arcs through xline
        | 0x2B..=0x2F        // ole frame, mtext, leader, tolerance, mline
        | 0x4A               // ole2frame
        | 0x4D | 0x4E        // lwpolyline, hatch
        | 0x1F2              // proxy entity
    )
}

/// Name of a fixed type code, for placeholders and diagnostics.
pub fn fixed_code_name(code: i16) -> Option<&'static str> {
    let name = match code {
        0x01 => "TEXT",
        0x02 => "ATTRIB",
        0x03 => "ATTDEF",
        0x04 => "BLOCK",
        0x05 => "ENDBLK",
        0x06 => "SEQEND",
        0x07 => "INSERT",
        0x08 => "MINSERT",
        0x0A => "VERTEX_2D",
        0x0B => "VERTEX_3D",
        0x0C => "VERTEX_MESH",
        0x0D => "VERTEX_PFACE",
        0x0E => "VERTEX_PFACE_FACE",
        0x0F => "POLYLINE_2D",
        0x10 => "POLYLINE_3D",
        0x11 => "ARC",
        0x12 => "CIRCLE",
        0x13 => "LINE",
        0x14 => "DIMENSION_ORDINATE",
        0x15 => "DIMENSION_LINEAR",
        0x16 => "DIMENSION_ALIGNED",
        0x17 => "DIMENSION_ANG_3PT",
        0x18 => "DIMENSION_ANG_2LN",
        0x19 => "DIMENSION_RADIUS",
        0x1A => "DIMENSION_DIAMETER",
        0x1B => "POINT",
        0x1C => "3DFACE",
        0x1D => "POLYLINE_PFACE",
        0x1E => "POLYLINE_MESH",
        0x1F => "SOLID",
        0x20 => "TRACE",
        0x21 => "SHAPE",
        0x22 => "VIEWPORT",
        0x23 => "ELLIPSE",
        0x24 => "SPLINE",
        0x25 => "REGION",
        0x26 => "3DSOLID",
        0x27 => "BODY",
        0x28 => "RAY",
        0x29 => "XLINE",
        0x2A => "DICTIONARY",
        0x2B => "OLEFRAME",
        0x2C => "MTEXT",
        0x2D => "LEADER",
        0x2E => "TOLERANCE",
        0x2F => "MLINE",
        0x30 => "BLOCK_CONTROL",
        0x31 => "BLOCK_HEADER",
        0x32 => "LAYER_CONTROL",
        0x33 => "LAYER",
        0x34 => "STYLE_CONTROL",
        0x35 => "STYLE",
        0x38 => "LTYPE_CONTROL",
        0x39 => "LTYPE",
        0x3C => "VIEW_CONTROL",
        0x3D => "VIEW",
        0x3E => "UCS_CONTROL",
        0x3F => "UCS",
        0x40 => "VPORT_CONTROL",
        0x41 => "VPORT",
        0x42 => "APPID_CONTROL",
        0x43 => "APPID",
        0x44 => "DIMSTYLE_CONTROL",
        0x45 => "DIMSTYLE",
        0x48 => "GROUP",
        0x49 => "MLINESTYLE",
        0x4A => "OLE2FRAME",
        0x4C => "LONG_TRANSACTION",
        0x4D => "LWPOLYLINE",
        0x4E => "HATCH",
        0x4F => "XRECORD",
        0x50 => "ACDBPLACEHOLDER",
        0x51 => "VBA_PROJECT",
        0x52 => "LAYOUT",
        0x1F2 => "ACAD_PROXY_ENTITY",
        0x1F3 => "ACAD_PROXY_OBJECT",
        _ => return None,
    };
    Some(name)
}
