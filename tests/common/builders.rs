//! Whole-file DWG image builders for the end-to-end tests.
//!
//! Two shapes are produced: the AC1015 locator layout (sections at fixed
//! file offsets, objects scattered in the raw file) and the AC1018 paged
//! layout (page map, section map, encrypted page headers, checksums,
//! optional LZ77 payloads). Object payloads are built bit-for-bit the way
//! the reader consumes them.

#![allow(dead_code)]

use dwgread::io::dwg::constants::OBJECT_CRC_SEED;
use dwgread::io::dwg::crc::{crc8, section_page_checksum};
use dwgread::DwgVersion;

use super::bit_writer::BitWriter;
use super::compress::lz77_ac18_store;

// ---------------------------------------------------------------------------
// Object encoding
// ---------------------------------------------------------------------------

/// Assemble one object: MS size prefix, type code, the RL end-of-data
/// word, body bits, handle-stream bits, and the trailing CRC-16.
///
/// This is the pre-R2010 object shape (the end-of-data RL embedded in the
/// object data), which covers the AC1015 and AC1018 test files.
pub fn finish_object(
    version: DwgVersion,
    type_code: i16,
    body: &BitWriter,
    handles: &BitWriter,
) -> Vec<u8> {
    let mut head = BitWriter::new(version);
    head.write_ot(type_code);

    // RL counts bits from the start of the object data to the start of
    // the handle stream.
    let end_of_data = head.bit_len() + 32 + body.bit_len();
    head.write_rl(end_of_data as i32);
    head.append(body);
    head.append(handles);

    let data = head.into_bytes();

    let mut size_prefix = BitWriter::new(version);
    size_prefix.write_ms(data.len() as i32);
    let mut object = size_prefix.into_bytes();
    object.extend_from_slice(&data);

    let crc = crc8(OBJECT_CRC_SEED, &object);
    object.extend_from_slice(&crc.to_le_bytes());
    object
}

/// Write the common entity prologue into `body` and the matching common
/// handle references into `handles`.
///
/// Entity mode 2 puts the entity in model space, 1 in paper space.
pub fn write_common_entity(
    body: &mut BitWriter,
    handles: &mut BitWriter,
    own_handle: u64,
    layer_handle: u64,
    mode: u8,
) {
    let version = body.version();
    let r2004_plus = version >= DwgVersion::AC1018;
    let r2007_plus = version >= DwgVersion::AC1021;
    let r2010_plus = version >= DwgVersion::AC1024;
    let r2013_plus = version >= DwgVersion::AC1027;

    // H own handle, empty EED, no proxy graphics.
    body.write_h(0, own_handle);
    body.write_bs(0);
    body.write_bit(false);

    body.write_2bits(mode);

    // No reactors; xdict declared missing where the flag exists.
    body.write_bl(0);
    if r2004_plus {
        body.write_bit(true);
    }
    if r2013_plus {
        body.write_bit(false);
    }
    if !r2004_plus {
        // No prev/next entity links.
        body.write_bit(true);
    }

    // ByLayer color, unit linetype scale.
    body.write_bs(256);
    body.write_bd(1.0);

    // Linetype / material / plot-style flag pairs, all "by layer".
    body.write_2bits(0);
    if r2007_plus {
        body.write_2bits(0);
        body.write_rc(0);
    }
    body.write_2bits(0);
    if r2010_plus {
        body.write_bit(false);
        body.write_bit(false);
        body.write_bit(false);
    }

    // Visible, ByLayer lineweight.
    body.write_bs(0);
    body.write_rc(0x1D);

    // Handle stream: xdict (pre-R2004 always reads one), then the layer.
    if !r2004_plus {
        handles.write_h(3, 0);
    }
    handles.write_h(5, layer_handle);
}

// Entity body builders. Each returns the complete object bytes.

pub fn line_object(
    version: DwgVersion,
    handle: u64,
    layer: u64,
    start: (f64, f64),
    end: (f64, f64),
) -> Vec<u8> {
    let mut body = BitWriter::new(version);
    let mut handles = BitWriter::new(version);
    write_common_entity(&mut body, &mut handles, handle, layer, 2);

    body.write_bit(true); // both Z are zero
    body.write_rd(start.0);
    body.write_dd(end.0, start.0);
    body.write_rd(start.1);
    body.write_dd(end.1, start.1);
    body.write_bt(0.0);
    body.write_be(0.0, 0.0, 1.0);

    finish_object(version, 0x13, &body, &handles)
}

pub fn arc_object(
    version: DwgVersion,
    handle: u64,
    layer: u64,
    center: (f64, f64, f64),
    radius: f64,
    start_angle: f64,
    end_angle: f64,
) -> Vec<u8> {
    let mut body = BitWriter::new(version);
    let mut handles = BitWriter::new(version);
    write_common_entity(&mut body, &mut handles, handle, layer, 2);

    body.write_3bd(center.0, center.1, center.2);
    body.write_bd(radius);
    body.write_bt(0.0);
    body.write_be(0.0, 0.0, 1.0);
    body.write_bd(start_angle);
    body.write_bd(end_angle);

    finish_object(version, 0x11, &body, &handles)
}

pub fn circle_object(
    version: DwgVersion,
    handle: u64,
    layer: u64,
    center: (f64, f64, f64),
    radius: f64,
) -> Vec<u8> {
    let mut body = BitWriter::new(version);
    let mut handles = BitWriter::new(version);
    write_common_entity(&mut body, &mut handles, handle, layer, 2);

    body.write_3bd(center.0, center.1, center.2);
    body.write_bd(radius);
    body.write_bt(0.0);
    body.write_be(0.0, 0.0, 1.0);

    finish_object(version, 0x12, &body, &handles)
}

pub fn point_object(
    version: DwgVersion,
    handle: u64,
    layer: u64,
    location: (f64, f64, f64),
) -> Vec<u8> {
    let mut body = BitWriter::new(version);
    let mut handles = BitWriter::new(version);
    write_common_entity(&mut body, &mut handles, handle, layer, 2);

    body.write_3bd(location.0, location.1, location.2);
    body.write_bt(0.0);
    body.write_be(0.0, 0.0, 1.0);
    body.write_bd(0.0);

    finish_object(version, 0x1B, &body, &handles)
}

pub fn ellipse_object(
    version: DwgVersion,
    handle: u64,
    layer: u64,
    center: (f64, f64, f64),
    major_axis: (f64, f64, f64),
    ratio: f64,
) -> Vec<u8> {
    let mut body = BitWriter::new(version);
    let mut handles = BitWriter::new(version);
    write_common_entity(&mut body, &mut handles, handle, layer, 2);

    body.write_3bd(center.0, center.1, center.2);
    body.write_3bd(major_axis.0, major_axis.1, major_axis.2);
    body.write_3bd(0.0, 0.0, 1.0);
    body.write_bd(ratio);
    body.write_bd(0.0);
    body.write_bd(std::f64::consts::TAU);

    finish_object(version, 0x23, &body, &handles)
}

/// LWPOLYLINE with optional bulges; `closed` sets the 0x200 flag.
pub fn lwpolyline_object(
    version: DwgVersion,
    handle: u64,
    layer: u64,
    points: &[(f64, f64)],
    bulges: Option<&[f64]>,
    closed: bool,
) -> Vec<u8> {
    let mut body = BitWriter::new(version);
    let mut handles = BitWriter::new(version);
    write_common_entity(&mut body, &mut handles, handle, layer, 2);

    let mut flags: i16 = 0;
    if bulges.is_some() {
        flags |= 0x10;
    }
    if closed {
        flags |= 0x200;
    }
    body.write_bs(flags);

    body.write_bl(points.len() as i32);
    if let Some(bulges) = bulges {
        body.write_bl(bulges.len() as i32);
    }

    // First vertex raw, the rest as DD deltas.
    let mut prev = points[0];
    body.write_2rd(prev.0, prev.1);
    for &p in &points[1..] {
        body.write_dd(p.0, prev.0);
        body.write_dd(p.1, prev.1);
        prev = p;
    }
    if let Some(bulges) = bulges {
        for &b in bulges {
            body.write_bd(b);
        }
    }

    finish_object(version, 0x4D, &body, &handles)
}

pub fn text_object(
    version: DwgVersion,
    handle: u64,
    layer: u64,
    insertion: (f64, f64),
    height: f64,
    value: &str,
    style_handle: u64,
) -> Vec<u8> {
    let mut body = BitWriter::new(version);
    let mut handles = BitWriter::new(version);
    write_common_entity(&mut body, &mut handles, handle, layer, 2);

    // All optional text fields elided.
    body.write_rc(0xFF);
    body.write_2rd(insertion.0, insertion.1);
    body.write_be(0.0, 0.0, 1.0);
    body.write_bt(0.0);
    body.write_rd(height);
    body.write_tv(value);

    handles.write_h(5, style_handle);
    finish_object(version, 0x01, &body, &handles)
}

pub fn mtext_object(
    version: DwgVersion,
    handle: u64,
    layer: u64,
    insertion: (f64, f64, f64),
    width: f64,
    height: f64,
    value: &str,
    style_handle: u64,
) -> Vec<u8> {
    let r2004_plus = version >= DwgVersion::AC1018;
    let r2007_plus = version >= DwgVersion::AC1021;

    let mut body = BitWriter::new(version);
    let mut handles = BitWriter::new(version);
    write_common_entity(&mut body, &mut handles, handle, layer, 2);

    body.write_3bd(insertion.0, insertion.1, insertion.2);
    body.write_3bd(0.0, 0.0, 1.0);
    body.write_3bd(1.0, 0.0, 0.0);
    body.write_bd(width);
    if r2007_plus {
        body.write_bd(0.0);
    }
    body.write_bd(height);
    body.write_bs(1); // top-left
    body.write_bs(1); // left-to-right
    body.write_bd(0.0); // extents height
    body.write_bd(0.0); // extents width
    body.write_tv(value);
    body.write_bs(1); // line spacing style
    body.write_bd(1.0); // line spacing factor
    body.write_bit(false);
    if r2004_plus {
        body.write_bl(0); // background flags
    }

    handles.write_h(5, style_handle);
    finish_object(version, 0x2C, &body, &handles)
}

pub fn insert_object(
    version: DwgVersion,
    handle: u64,
    layer: u64,
    insertion: (f64, f64, f64),
    block_handle: u64,
) -> Vec<u8> {
    let mut body = BitWriter::new(version);
    let mut handles = BitWriter::new(version);
    write_common_entity(&mut body, &mut handles, handle, layer, 2);

    body.write_3bd(insertion.0, insertion.1, insertion.2);
    body.write_2bits(0b11); // unit scales
    body.write_bd(0.0); // rotation
    body.write_3bd(0.0, 0.0, 1.0);
    body.write_bit(false); // no attributes

    handles.write_h(5, block_handle);
    finish_object(version, 0x07, &body, &handles)
}

pub fn dim_linear_object(
    version: DwgVersion,
    handle: u64,
    layer: u64,
    first: (f64, f64, f64),
    second: (f64, f64, f64),
    defpoint: (f64, f64, f64),
    style_handle: u64,
    block_handle: u64,
) -> Vec<u8> {
    let r2007_plus = version >= DwgVersion::AC1021;
    let r2010_plus = version >= DwgVersion::AC1024;

    let mut body = BitWriter::new(version);
    let mut handles = BitWriter::new(version);
    write_common_entity(&mut body, &mut handles, handle, layer, 2);

    if r2010_plus {
        body.write_rc(0);
    }
    body.write_be(0.0, 0.0, 1.0);
    body.write_2rd(5.0, 1.0); // text midpoint
    body.write_bd(0.0); // elevation
    body.write_rc(0); // dimension flags
    body.write_tv(""); // measured text
    body.write_bd(0.0); // text rotation
    body.write_bd(0.0); // horizontal direction
    body.write_3bd(1.0, 1.0, 1.0); // insert scale
    body.write_bd(0.0); // insert rotation
    body.write_bs(5); // attachment point
    body.write_bs(1); // line spacing style
    body.write_bd(1.0); // line spacing factor
    body.write_bd(10.0); // actual measurement
    if r2007_plus {
        body.write_bit(false);
        body.write_bit(false);
    }
    body.write_2rd(0.0, 0.0); // insertion point

    body.write_3bd(first.0, first.1, first.2);
    body.write_3bd(second.0, second.1, second.2);
    body.write_3bd(defpoint.0, defpoint.1, defpoint.2);
    body.write_bd(0.0); // dimension rotation
    body.write_bd(0.0); // extension line rotation

    handles.write_h(5, style_handle);
    handles.write_h(5, block_handle);
    finish_object(version, 0x15, &body, &handles)
}

/// An entity type outside the supported set (SPLINE); the reader keeps a
/// placeholder after consuming only the common prologue.
pub fn spline_object(version: DwgVersion, handle: u64, layer: u64) -> Vec<u8> {
    let mut body = BitWriter::new(version);
    let mut handles = BitWriter::new(version);
    write_common_entity(&mut body, &mut handles, handle, layer, 2);

    // A few opaque fields the reader never touches.
    body.write_bs(1);
    body.write_bl(3);
    body.write_bd(2.5);

    finish_object(version, 0x24, &body, &handles)
}

/// A LAYER table entry, so entities can resolve their layer names.
pub fn layer_object(version: DwgVersion, handle: u64, name: &str, owner: u64) -> Vec<u8> {
    let r2004_plus = version >= DwgVersion::AC1018;
    let r2007_plus = version >= DwgVersion::AC1021;
    let r2013_plus = version >= DwgVersion::AC1027;

    let mut body = BitWriter::new(version);
    let mut handles = BitWriter::new(version);

    // Common non-entity prologue.
    body.write_h(0, handle);
    body.write_bs(0); // EED
    body.write_bl(0); // reactors
    if r2004_plus {
        body.write_bit(true); // xdict missing
    }
    if r2013_plus {
        body.write_bit(false);
    }
    handles.write_h(4, owner);
    if !r2004_plus {
        handles.write_h(3, 0); // xdict
    }

    // Layer fields.
    body.write_tv(name);
    if r2007_plus {
        body.write_bs(0);
    } else {
        body.write_bit(false);
        body.write_bs(0);
        body.write_bit(false);
    }
    body.write_bs(0x10); // plottable, on, thawed
    if r2004_plus {
        // CMC: BS index, BL packed value (indexed form), RC name flags.
        body.write_bs(0);
        body.write_bl(0x0100_0007);
        body.write_rc(0);
    } else {
        body.write_bs(7);
    }

    handles.write_h(5, 0); // xref block
    handles.write_h(5, 0); // plot style
    if r2007_plus {
        handles.write_h(5, 0); // material
    }
    handles.write_h(5, 0x15); // linetype

    finish_object(version, 0x33, &body, &handles)
}

// ---------------------------------------------------------------------------
// Handle map encoding
// ---------------------------------------------------------------------------

/// Encode `(handle, offset)` pairs as one delta-run subsection with its
/// trailing CRC, plus the size-2 terminator.
pub fn handle_map_section(pairs: &[(u64, i64)]) -> Vec<u8> {
    let mut out = handle_map_subsection(pairs);
    out.extend_from_slice(&[0x00, 0x02]);
    out
}

pub fn handle_map_subsection(pairs: &[(u64, i64)]) -> Vec<u8> {
    let mut payload = BitWriter::new(DwgVersion::AC1015);
    let mut last_handle = 0u64;
    let mut last_offset = 0i64;
    for &(handle, offset) in pairs {
        payload.write_mc(handle - last_handle);
        payload.write_signed_mc(offset - last_offset);
        last_handle = handle;
        last_offset = offset;
    }
    let payload = payload.into_bytes();

    let size = (payload.len() + 4) as u16;
    let mut out = vec![(size >> 8) as u8, size as u8];
    out.extend_from_slice(&payload);
    let crc = crc8(OBJECT_CRC_SEED, &out);
    out.push((crc >> 8) as u8);
    out.push(crc as u8);
    out
}

// ---------------------------------------------------------------------------
// Classes section encoding
// ---------------------------------------------------------------------------

const CLASSES_START_SENTINEL: [u8; 16] = [
    0x8D, 0xA1, 0xC4, 0xB8, 0xC4, 0xA9, 0xF8, 0xC5, 0xC0, 0xDC, 0xF4, 0x5F, 0xE7, 0xCF, 0xB6,
    0x8A,
];
const CLASSES_END_SENTINEL: [u8; 16] = [
    0x72, 0x5E, 0x3B, 0x47, 0x3B, 0x56, 0x07, 0x3A, 0x3F, 0x23, 0x0B, 0xA0, 0x18, 0x30, 0x49,
    0x75,
];

/// An empty classes section for the given version.
pub fn empty_classes_section(version: DwgVersion) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&CLASSES_START_SENTINEL);

    let body = if version == DwgVersion::AC1018 {
        // BS max class number, two RC zeros, one B.
        let mut w = BitWriter::new(version);
        w.write_bs(0);
        w.write_rc(0);
        w.write_rc(0);
        w.write_bit(true);
        w.into_bytes()
    } else {
        Vec::new()
    };

    out.extend_from_slice(&(body.len() as i32).to_le_bytes());
    out.extend_from_slice(&body);
    out.extend_from_slice(&[0x00, 0x00]); // CRC word
    out.extend_from_slice(&CLASSES_END_SENTINEL);
    out
}

// ---------------------------------------------------------------------------
// AC1015 file image
// ---------------------------------------------------------------------------

const FILE_HEADER_END_SENTINEL: [u8; 16] = [
    0x95, 0xA0, 0x4E, 0x28, 0x99, 0x82, 0x1A, 0xE5, 0x5E, 0x41, 0xE0, 0x5F, 0x9D, 0x3A, 0x4D,
    0x00,
];

/// Build a complete AC1015 file containing the given objects.
///
/// `objects` supplies `(handle, object_bytes)` pairs; the builder lays the
/// objects out after the header, then writes the classes and handle-map
/// sections and the locator table pointing at all of them.
pub fn build_ac1015_file(objects: &[(u64, Vec<u8>)]) -> Vec<u8> {
    let version = DwgVersion::AC1015;

    // Locator table: record 0 (header variables, empty), 1 (classes),
    // 2 (handles). 6 + 7 + 4 + 2 + 2 + 4 + 3*9 + 2 + 16 bytes.
    let header_len = 6 + 7 + 4 + 2 + 2 + 4 + 3 * 9 + 2 + 16;

    // Objects first, recording absolute offsets for the handle map.
    let mut object_blob = Vec::new();
    let mut pairs = Vec::new();
    for (handle, bytes) in objects {
        pairs.push((*handle, (header_len + object_blob.len()) as i64));
        object_blob.extend_from_slice(bytes);
    }

    let classes = empty_classes_section(version);
    let handles = handle_map_section(&pairs);

    let classes_seeker = header_len + object_blob.len();
    let handles_seeker = classes_seeker + classes.len();

    let mut file = Vec::with_capacity(handles_seeker + handles.len());
    file.extend_from_slice(b"AC1015");
    file.extend_from_slice(&[0u8; 7]); // padding, maintenance release 0
    file.extend_from_slice(&0i32.to_le_bytes()); // preview seeker
    file.extend_from_slice(&[0u8; 2]); // writer version bytes
    file.extend_from_slice(&0x1Eu16.to_le_bytes()); // code page
    file.extend_from_slice(&3i32.to_le_bytes()); // locator record count

    let records: [(u8, i32, i32); 3] = [
        (0, 0, 0),
        (1, classes_seeker as i32, classes.len() as i32),
        (2, handles_seeker as i32, handles.len() as i32),
    ];
    for (number, seeker, size) in records {
        file.push(number);
        file.extend_from_slice(&seeker.to_le_bytes());
        file.extend_from_slice(&size.to_le_bytes());
    }

    file.extend_from_slice(&[0u8; 2]); // header CRC word
    file.extend_from_slice(&FILE_HEADER_END_SENTINEL);
    assert_eq!(file.len(), header_len);

    file.extend_from_slice(&object_blob);
    file.extend_from_slice(&classes);
    file.extend_from_slice(&handles);
    file
}

// ---------------------------------------------------------------------------
// AC1018 file image
// ---------------------------------------------------------------------------

const PAGE_TYPE_DATA: i32 = 0x4163043B;
const PAGE_TYPE_PAGE_MAP: i32 = 0x41630E3B;
const PAGE_TYPE_SECTION_MAP: i32 = 0x4163003B;
const DECRYPTION_MASK: u32 = 0x4164536B;

/// Build a complete AC1018 paged file.
///
/// The `AcDb:AcDbObjects` stream is split into pages of at most
/// `page_size` decompressed bytes; when `compressed` is set every data
/// page payload goes through the LZ77 store encoding, exercising the
/// decompressor on read-back.
pub fn build_ac1018_file(
    objects: &[(u64, Vec<u8>)],
    page_size: usize,
    compressed: bool,
) -> Vec<u8> {
    build_ac1018_file_with(objects, page_size, compressed, |_| {})
}

/// Same as [`build_ac1018_file`] with a corruption hook applied to the
/// finished data pages before final assembly.
pub fn build_ac1018_file_with(
    objects: &[(u64, Vec<u8>)],
    page_size: usize,
    compressed: bool,
    corrupt: impl FnOnce(&mut Vec<DataPage>),
) -> Vec<u8> {
    let version = DwgVersion::AC1018;

    // Objects stream with offsets relative to the assembled section.
    let mut objects_stream = Vec::new();
    let mut pairs = Vec::new();
    for (handle, bytes) in objects {
        pairs.push((*handle, objects_stream.len() as i64));
        objects_stream.extend_from_slice(bytes);
    }

    let mut classes_stream = empty_classes_section(version);
    let mut handles_stream = handle_map_section(&pairs);

    // The store encoder cannot express literal runs under 4 bytes; pad the
    // stream tails so no final page chunk is that small. The readers stop
    // at their own terminators, so trailing zeros are inert.
    for stream in [&mut objects_stream, &mut classes_stream, &mut handles_stream] {
        while matches!(stream.len() % page_size.max(1), 1..=3) {
            stream.push(0);
        }
    }

    // Carve the streams into data pages. Section ids: 1 = header vars
    // (empty), 2 = classes, 3 = handles, 4 = objects.
    let mut data_pages: Vec<DataPage> = Vec::new();
    let mut sections: Vec<SectionSpec> = Vec::new();
    for (id, name, stream) in [
        (2i32, "AcDb:Classes", &classes_stream),
        (3i32, "AcDb:Handles", &handles_stream),
        (4i32, "AcDb:AcDbObjects", &objects_stream),
    ] {
        let mut spec = SectionSpec {
            name: name.to_string(),
            total_size: stream.len() as u64,
            max_page_size: page_size as u64,
            compressed,
            page_indices: Vec::new(),
        };
        let mut offset = 0u64;
        for chunk in stream.chunks(page_size.max(1)) {
            let payload = if compressed {
                lz77_ac18_store(chunk)
            } else {
                chunk.to_vec()
            };
            spec.page_indices.push(data_pages.len());
            data_pages.push(DataPage {
                section_id: id,
                payload,
                decompressed_len: chunk.len(),
                start_offset: offset,
                corrupt_checksum: false,
            });
            offset += chunk.len() as u64;
        }
        sections.push(spec);
    }
    // The header-variables section: present in the map, zero pages.
    sections.push(SectionSpec {
        name: "AcDb:Header".to_string(),
        total_size: 0,
        max_page_size: page_size as u64,
        compressed,
        page_indices: Vec::new(),
    });

    corrupt(&mut data_pages);

    assemble_ac1018(&sections, &data_pages, page_size, compressed)
}

pub struct DataPage {
    pub section_id: i32,
    pub payload: Vec<u8>,
    pub decompressed_len: usize,
    pub start_offset: u64,
    /// Store a deliberately wrong data checksum for this page.
    pub corrupt_checksum: bool,
}

struct SectionSpec {
    name: String,
    total_size: u64,
    max_page_size: u64,
    compressed: bool,
    page_indices: Vec<usize>,
}

fn assemble_ac1018(
    sections: &[SectionSpec],
    data_pages: &[DataPage],
    page_size: usize,
    compressed: bool,
) -> Vec<u8> {
    // Physical layout from 0x100: data pages, then the section map page,
    // then the page map page. Page numbers are 1-based in layout order.
    let data_page_sizes: Vec<usize> = data_pages.iter().map(|p| 32 + p.payload.len()).collect();

    // Section map payload.
    let mut section_map = Vec::new();
    section_map.extend_from_slice(&(sections.len() as i32).to_le_bytes());
    section_map.extend_from_slice(&0x02i32.to_le_bytes());
    section_map.extend_from_slice(&0x7400i32.to_le_bytes());
    section_map.extend_from_slice(&0i32.to_le_bytes());
    section_map.extend_from_slice(&(sections.len() as i32).to_le_bytes());

    for (section_index, spec) in sections.iter().enumerate() {
        section_map.extend_from_slice(&spec.total_size.to_le_bytes());
        section_map.extend_from_slice(&(spec.page_indices.len() as i32).to_le_bytes());
        section_map.extend_from_slice(&(spec.max_page_size as i32).to_le_bytes());
        section_map.extend_from_slice(&0i32.to_le_bytes());
        let code: i32 = if spec.compressed { 2 } else { 1 };
        section_map.extend_from_slice(&code.to_le_bytes());
        section_map.extend_from_slice(&(section_index as i32 + 1).to_le_bytes());
        section_map.extend_from_slice(&0i32.to_le_bytes()); // not encrypted

        let mut name_buf = [0u8; 64];
        let name_bytes = spec.name.as_bytes();
        name_buf[..name_bytes.len()].copy_from_slice(name_bytes);
        section_map.extend_from_slice(&name_buf);

        for &page_index in &spec.page_indices {
            let page = &data_pages[page_index];
            let page_number = (page_index + 1) as i32;
            section_map.extend_from_slice(&page_number.to_le_bytes());
            section_map.extend_from_slice(&(page.payload.len() as i32).to_le_bytes());
            section_map.extend_from_slice(&page.start_offset.to_le_bytes());
        }
    }

    let section_map_page_number = (data_pages.len() + 1) as i32;
    let page_map_page_number = (data_pages.len() + 2) as i32;
    let section_map_page_size = 20 + section_map.len();

    // Page map payload: every page in physical order.
    let mut page_map = Vec::new();
    for (i, size) in data_page_sizes.iter().enumerate() {
        page_map.extend_from_slice(&((i + 1) as i32).to_le_bytes());
        page_map.extend_from_slice(&(*size as i32).to_le_bytes());
    }
    page_map.extend_from_slice(&section_map_page_number.to_le_bytes());
    page_map.extend_from_slice(&(section_map_page_size as i32).to_le_bytes());
    let page_map_page_size = 20 + page_map.len() + 8;
    page_map.extend_from_slice(&page_map_page_number.to_le_bytes());
    page_map.extend_from_slice(&(page_map_page_size as i32).to_le_bytes());

    // Physical assembly.
    let mut file = vec![0u8; 0x100];
    file[..6].copy_from_slice(b"AC1018");
    // Preamble fields the reader touches: maintenance byte at 0x0B and
    // the code page at 0x13 — zeros decode fine, set the code page only.
    file[0x13] = 0x1E;

    let mut body = Vec::new();
    for page in data_pages {
        let position = (0x100 + body.len()) as u64;
        let mut data_checksum = section_page_checksum(0, &page.payload) as i32;
        if page.corrupt_checksum {
            data_checksum ^= 0x1;
        }
        let header = encrypt_page_header(
            PAGE_TYPE_DATA,
            page.section_id,
            page.payload.len() as i32,
            if compressed {
                page.decompressed_len as i32
            } else {
                page.payload.len() as i32
            },
            page.start_offset as i32,
            data_checksum,
            position,
        );
        body.extend_from_slice(&header);
        body.extend_from_slice(&page.payload);
    }

    let section_map_addr = 0x100 + body.len() as u64;
    body.extend_from_slice(&map_page(PAGE_TYPE_SECTION_MAP, &section_map));
    let page_map_addr = 0x100 + body.len() as u64;
    body.extend_from_slice(&map_page(PAGE_TYPE_PAGE_MAP, &page_map));

    // Verify the page map's running-seeker model matches the layout.
    debug_assert_eq!(
        section_map_addr,
        0x100 + data_page_sizes.iter().sum::<usize>() as u64
    );

    // Encrypted metadata block at 0x80.
    let mut meta = [0u8; 0x6C];
    meta[..12].copy_from_slice(b"AcFssFcAJMB\0");
    let section_amount = (sections.len() as u32).to_le_bytes();
    meta[64..68].copy_from_slice(&section_amount);
    let page_map_field = (page_map_addr - 0x100).to_le_bytes();
    meta[84..92].copy_from_slice(&page_map_field);
    let section_map_id = (section_map_page_number as u32).to_le_bytes();
    meta[92..96].copy_from_slice(&section_map_id);
    apply_keystream(&mut meta);
    file[0x80..0x80 + 0x6C].copy_from_slice(&meta);

    file.extend_from_slice(&body);
    file
}

fn map_page(page_type: i32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(20 + payload.len());
    out.extend_from_slice(&page_type.to_le_bytes());
    out.extend_from_slice(&(payload.len() as i32).to_le_bytes()); // decompressed
    out.extend_from_slice(&(payload.len() as i32).to_le_bytes()); // compressed
    out.extend_from_slice(&1i32.to_le_bytes()); // stored raw
    out.extend_from_slice(&0i32.to_le_bytes()); // checksum
    out.extend_from_slice(payload);
    out
}

fn encrypt_page_header(
    page_type: i32,
    section_number: i32,
    compressed_size: i32,
    page_size: i32,
    start_offset: i32,
    data_checksum: i32,
    position: u64,
) -> [u8; 32] {
    let mask = (DECRYPTION_MASK ^ position as u32) as i32;
    let fields = [
        page_type,
        section_number,
        compressed_size,
        page_size,
        start_offset,
        0, // header checksum: not validated by the reader
        data_checksum,
        0,
    ];
    let mut out = [0u8; 32];
    for (i, field) in fields.iter().enumerate() {
        out[i * 4..i * 4 + 4].copy_from_slice(&(field ^ mask).to_le_bytes());
    }
    out
}

fn apply_keystream(data: &mut [u8]) {
    let mut state: i32 = 1;
    for byte in data.iter_mut() {
        state = state.wrapping_mul(0x343FD).wrapping_add(0x269EC3);
        *byte ^= (state >> 16) as u8;
    }
}
