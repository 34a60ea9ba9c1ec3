//! DWG reader orchestrator — the main entry point for decoding DWG files.
//!
//! The decode pipeline:
//!
//! 1. Read the 6-byte magic and dispatch on the version.
//! 2. Parse the file header — the AC1015 locator table, the AC1018-family
//!    encrypted metadata plus page/section maps, or the AC1021
//!    Reed-Solomon metadata plus page/section maps.
//! 3. Assemble the logical section streams (decrypting page headers,
//!    validating page checksums, decompressing payloads).
//! 4. Read the class registry and the object map.
//! 5. Walk the object map, decoding every object.
//! 6. Freeze the results into a [`DwgDocument`].

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::document::DwgDocument;
use crate::error::{DwgError, Result};
use crate::io::dwg::compression::{decompress_ac18, decompress_ac21};
use crate::io::dwg::constants::{ac18, ac21, section_names, sentinels};
use crate::io::dwg::crc::section_page_checksum;
use crate::io::dwg::encryption::{apply_metadata_keystream, decrypt_page_header};
use crate::io::dwg::file_header::{
    Ac21Metadata, FileHeader, FileHeaderAc15, FileHeaderAc18, LocalSectionPage,
    SectionDescriptor, SectionLocatorRecord,
};
use crate::io::dwg::reed_solomon::rs_decode;
use crate::io::dwg::reader::classes::ClassesReader;
use crate::io::dwg::reader::object_map::ObjectMapReader;
use crate::io::dwg::reader::object_reader::ObjectReader;
use crate::io::dwg::version_flags::VersionFlags;
use crate::types::DwgVersion;

/// Configuration options for the DWG reader.
#[derive(Debug, Clone)]
pub struct DwgReaderConfiguration {
    /// When `true` (the default), per-object parse failures taint the
    /// object and decoding continues; when `false` the first failure
    /// aborts the decode.
    pub failsafe: bool,

    /// Keep placeholder records for entity types outside the supported
    /// set. When `false` they are dropped from the document.
    pub keep_unsupported: bool,
}

impl Default for DwgReaderConfiguration {
    fn default() -> Self {
        Self {
            failsafe: true,
            keep_unsupported: true,
        }
    }
}

/// DWG file reader.
#[derive(Debug)]
pub struct DwgFileReader {
    data: Vec<u8>,
    version: DwgVersion,
    config: DwgReaderConfiguration,
}

impl DwgFileReader {
    /// Open a DWG file by path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    /// Create a reader over an in-memory byte buffer.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if data.len() < 6 {
            return Err(DwgError::Truncated(
                "file shorter than the 6-byte version magic".into(),
            ));
        }
        let magic = String::from_utf8_lossy(&data[..6]).into_owned();
        let version = DwgVersion::from_magic(&data[..6])
            .ok_or(DwgError::UnsupportedVersion(magic))?;

        Ok(Self {
            data,
            version,
            config: DwgReaderConfiguration::default(),
        })
    }

    pub fn with_config(mut self, config: DwgReaderConfiguration) -> Self {
        self.config = config;
        self
    }

    pub fn version(&self) -> DwgVersion {
        self.version
    }

    /// Decode the whole file into a document.
    pub fn read(self) -> Result<DwgDocument> {
        let header = self.read_file_header()?;

        // All required section streams. The header-variables stream is
        // assembled for its checksum validation even though no variable in
        // it feeds the document model.
        if matches!(header, FileHeader::Ac18(_)) {
            let _header_vars = self.section_stream(&header, section_names::HEADER)?;
        }
        let classes_data = self.section_stream(&header, section_names::CLASSES)?;
        let handles_data = self.section_stream(&header, section_names::HANDLES)?;

        // For AC1015 the object map carries absolute file offsets; the
        // whole file is the objects stream. From AC1018 on the offsets
        // index the assembled AcDb:AcDbObjects stream.
        match &header {
            FileHeader::Ac15(_) => {
                self.read_objects(&header, &classes_data, &handles_data, &self.data)
            }
            FileHeader::Ac18(_) => {
                let objects = self.section_stream(&header, section_names::ACDB_OBJECTS)?;
                self.read_objects(&header, &classes_data, &handles_data, &objects)
            }
        }
    }

    fn read_objects(
        &self,
        header: &FileHeader,
        classes_data: &[u8],
        handles_data: &[u8],
        objects_data: &[u8],
    ) -> Result<DwgDocument> {
        let maintenance = match header {
            FileHeader::Ac15(h) => h.maintenance_version,
            FileHeader::Ac18(h) => h.maintenance_version,
        };

        let classes = ClassesReader::new(self.version, maintenance, classes_data).read()?;
        let map = ObjectMapReader::new(self.version, handles_data).read()?;

        let mut object_reader = ObjectReader::new(
            VersionFlags::new(self.version),
            objects_data,
            &map,
            &classes,
        );
        object_reader.failsafe = self.config.failsafe;
        object_reader.keep_unsupported = self.config.keep_unsupported;

        let decoded = object_reader.read()?;
        Ok(DwgDocument::from_decoded(self.version, decoded))
    }

    // -------------------------------------------------------------------
    // File header
    // -------------------------------------------------------------------

    fn read_file_header(&self) -> Result<FileHeader> {
        match self.version {
            DwgVersion::AC1015 => self.read_file_header_ac15().map(FileHeader::Ac15),
            DwgVersion::AC1018 | DwgVersion::AC1024 | DwgVersion::AC1027 => {
                self.read_file_header_ac18().map(FileHeader::Ac18)
            }
            DwgVersion::AC1021 => self.read_file_header_ac21().map(FileHeader::Ac18),
        }
    }

    fn cursor_at(&self, offset: u64) -> Result<Cursor<&[u8]>> {
        if offset as usize > self.data.len() {
            return Err(DwgError::Truncated(format!(
                "seek to {offset} past end of file ({} bytes)",
                self.data.len()
            )));
        }
        let mut cursor = Cursor::new(self.data.as_slice());
        cursor.set_position(offset);
        Ok(cursor)
    }

    /// AC1015: fixed-offset preamble and the section locator table.
    fn read_file_header_ac15(&self) -> Result<FileHeaderAc15> {
        let mut c = self.cursor_at(6)?;

        // 0x06: six zero bytes, with the maintenance release at 0x0B.
        let mut padding = [0u8; 7];
        c.read_exact(&mut padding)?;
        let maintenance_version = padding[5];

        // 0x0D: preview image seeker.
        let preview_address = c.read_i32::<LittleEndian>()? as i64;

        // 0x11: writer version and release bytes.
        let mut _release = [0u8; 2];
        c.read_exact(&mut _release)?;

        // 0x13: drawing code page.
        let codepage = c.read_u16::<LittleEndian>()?;

        // 0x15: section locator table.
        let record_count = c.read_i32::<LittleEndian>()?;
        if !(0..=16).contains(&record_count) {
            return Err(DwgError::Parse(format!(
                "implausible locator record count {record_count}"
            )));
        }

        let mut records = HashMap::new();
        for _ in 0..record_count {
            let number = c.read_u8()? as i32;
            let seeker = c.read_i32::<LittleEndian>()? as i64;
            let size = c.read_i32::<LittleEndian>()? as i64;
            records.insert(
                number as usize,
                SectionLocatorRecord::new(number, seeker, size),
            );
        }

        // CRC word, then the end sentinel.
        let _crc = c.read_u16::<LittleEndian>()?;
        let mut sentinel = [0u8; 16];
        c.read_exact(&mut sentinel)?;
        if sentinel[..6] != sentinels::FILE_HEADER_END_AC15[..6] {
            return Err(DwgError::Parse(
                "file header end sentinel mismatch".into(),
            ));
        }

        Ok(FileHeaderAc15 {
            version: self.version,
            maintenance_version,
            preview_address,
            codepage,
            records,
        })
    }

    /// AC1018 family: preamble, encrypted metadata, page map, section map.
    fn read_file_header_ac18(&self) -> Result<FileHeaderAc18> {
        let mut header = self.read_paged_preamble()?;

        // The 0x6C-byte metadata block at 0x80, behind the LCG keystream.
        let mut c = self.cursor_at(0x80)?;
        let mut block = [0u8; ac18::ENCRYPTED_HEADER_SIZE];
        c.read_exact(&mut block)?;
        apply_metadata_keystream(&mut block);

        let mut m = Cursor::new(&block[..]);
        let mut file_id = [0u8; 12];
        m.read_exact(&mut file_id)?;
        let _x00 = m.read_i32::<LittleEndian>()?;
        let _x04 = m.read_i32::<LittleEndian>()?;
        let _x08 = m.read_i32::<LittleEndian>()?;
        let _root_tree_node_gap = m.read_i32::<LittleEndian>()?;
        let _left_gap = m.read_i32::<LittleEndian>()?;
        let _right_gap = m.read_i32::<LittleEndian>()?;
        let _unknown1 = m.read_i32::<LittleEndian>()?;
        let _last_page_id = m.read_i32::<LittleEndian>()?;
        let _last_section_addr = m.read_u64::<LittleEndian>()?;
        let _second_header_addr = m.read_u64::<LittleEndian>()?;
        let _gap_amount = m.read_u32::<LittleEndian>()?;
        header.section_amount = m.read_u32::<LittleEndian>()?;
        let _x20 = m.read_u32::<LittleEndian>()?;
        let _x80 = m.read_u32::<LittleEndian>()?;
        let _x40 = m.read_u32::<LittleEndian>()?;
        let _section_page_map_id = m.read_u32::<LittleEndian>()?;
        header.page_map_address =
            m.read_u64::<LittleEndian>()? + ac18::DATA_PAGE_BASE_OFFSET;
        header.section_map_id = m.read_u32::<LittleEndian>()?;
        let _section_array_page_size = m.read_u32::<LittleEndian>()?;
        let _gap_array_size = m.read_u32::<LittleEndian>()?;
        header.crc_seed = m.read_u32::<LittleEndian>()?;

        self.read_page_map_ac18(&mut header)?;
        self.read_section_map_ac18(&mut header)?;

        Ok(header)
    }

    /// The preamble fields shared by all paged layouts (0x06..0x30).
    fn read_paged_preamble(&self) -> Result<FileHeaderAc18> {
        let mut c = self.cursor_at(6)?;

        let mut skip = [0u8; 5];
        c.read_exact(&mut skip)?;
        let maintenance_version = c.read_u8()?;
        let _byte_0x0c = c.read_u8()?;
        let preview_address = c.read_i32::<LittleEndian>()? as i64;
        let _dwg_version = c.read_u8()?;
        let _app_release = c.read_u8()?;
        let codepage = c.read_u16::<LittleEndian>()?;
        let mut filler = [0u8; 3];
        c.read_exact(&mut filler)?;
        let security_type = c.read_i32::<LittleEndian>()?;
        let _unknown = c.read_i32::<LittleEndian>()?;
        let summary_info_address = c.read_i32::<LittleEndian>()? as i64;
        let _vba_project_address = c.read_i32::<LittleEndian>()?;

        let mut header = FileHeaderAc18::new(self.version);
        header.maintenance_version = maintenance_version;
        header.preview_address = preview_address;
        header.codepage = codepage;
        header.security_type = security_type;
        header.summary_info_address = summary_info_address;
        Ok(header)
    }

    /// Read and decode a map page (page map or section map) with the plain
    /// 20-byte header used by AC1018-family files.
    fn read_map_page_ac18(&self, address: u64) -> Result<Vec<u8>> {
        let mut c = self.cursor_at(address)?;
        let _page_type = c.read_i32::<LittleEndian>()?;
        let decompressed_size = c.read_i32::<LittleEndian>()?;
        let compressed_size = c.read_i32::<LittleEndian>()?;
        let compression_type = c.read_i32::<LittleEndian>()?;
        let _checksum = c.read_i32::<LittleEndian>()?;

        if compressed_size <= 0 || decompressed_size <= 0 {
            return Ok(Vec::new());
        }

        let mut payload = vec![0u8; compressed_size as usize];
        c.read_exact(&mut payload).map_err(|_| {
            DwgError::Truncated(format!("map page at {address} truncated"))
        })?;

        if compression_type == 2 {
            decompress_ac18(&payload, decompressed_size as usize)
        } else {
            Ok(payload)
        }
    }

    /// Page map: `(page_number, size)` runs with a running seeker.
    fn read_page_map_ac18(&self, header: &mut FileHeaderAc18) -> Result<()> {
        let data = self.read_map_page_ac18(header.page_map_address)?;
        let mut c = Cursor::new(&data);
        let mut seeker = ac18::DATA_PAGE_BASE_OFFSET as i64;

        while (c.position() as usize) + 8 <= data.len() {
            let page_number = c.read_i32::<LittleEndian>()?;
            let size = c.read_i32::<LittleEndian>()? as i64;

            if page_number >= 0 {
                header.records.insert(
                    page_number as usize,
                    SectionLocatorRecord::new(page_number, seeker, size),
                );
            } else {
                // Negative page numbers are gap records with four extra
                // tree-layout words.
                for _ in 0..4 {
                    let _ = c.read_i32::<LittleEndian>();
                }
            }
            seeker += size;
        }
        Ok(())
    }

    /// Section map: named descriptors with per-page local maps.
    fn read_section_map_ac18(&self, header: &mut FileHeaderAc18) -> Result<()> {
        let record = header
            .records
            .get(&(header.section_map_id as usize))
            .copied()
            .ok_or_else(|| {
                DwgError::CorruptSection(format!(
                    "section map page {} absent from the page map",
                    header.section_map_id
                ))
            })?;

        let data = self.read_map_page_ac18(record.seeker as u64)?;
        let mut c = Cursor::new(&data);

        let num_descriptions = c.read_i32::<LittleEndian>()?;
        let _x04 = c.read_i32::<LittleEndian>()?;
        let _x08 = c.read_i32::<LittleEndian>()?;
        let _x0c = c.read_i32::<LittleEndian>()?;
        let _x10 = c.read_i32::<LittleEndian>()?;

        for _ in 0..num_descriptions {
            let total_size = c.read_u64::<LittleEndian>()?;
            let page_count = c.read_i32::<LittleEndian>()?;
            let max_decompressed_size = c.read_i32::<LittleEndian>()? as u64;
            let _unknown = c.read_i32::<LittleEndian>()?;
            let compressed_code = c.read_i32::<LittleEndian>()?;
            let section_id = c.read_i32::<LittleEndian>()?;
            let encrypted = c.read_i32::<LittleEndian>()?;

            let mut name_buf = [0u8; 64];
            c.read_exact(&mut name_buf)?;
            let name = name_buf
                .split(|&b| b == 0)
                .next()
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default();

            let mut descriptor = SectionDescriptor::new(&name);
            descriptor.compressed_size = total_size;
            descriptor.page_count = page_count;
            descriptor.decompressed_size = max_decompressed_size;
            descriptor.compressed_code = compressed_code;
            descriptor.section_id = section_id;
            descriptor.encrypted = encrypted;

            for _ in 0..page_count {
                let page_number = c.read_i32::<LittleEndian>()?;
                let page_data_size = c.read_i32::<LittleEndian>()? as u64;
                let offset = c.read_u64::<LittleEndian>()?;

                let mut page = LocalSectionPage {
                    page_number,
                    compressed_size: page_data_size,
                    offset,
                    decompressed_size: max_decompressed_size,
                    seeker: 0,
                };
                if let Some(rec) = header.records.get(&(page_number as usize)) {
                    page.seeker = rec.seeker as u64;
                }
                descriptor.pages.push(page);
            }

            // The last page only fills the remainder of the section.
            if max_decompressed_size > 0 {
                let tail = total_size % max_decompressed_size;
                if tail > 0 {
                    if let Some(last) = descriptor.pages.last_mut() {
                        last.decompressed_size = tail;
                    }
                }
            }

            if !name.is_empty() {
                header.add_descriptor(descriptor);
            }
        }

        Ok(())
    }

    /// AC1021: Reed-Solomon metadata, then page and section maps in their
    /// u64 encoding. The result converges on the shared paged header.
    fn read_file_header_ac21(&self) -> Result<FileHeaderAc18> {
        let mut header = self.read_paged_preamble()?;

        let mut c = self.cursor_at(0x80)?;
        let mut rs_block = vec![0u8; ac21::RS_ENCODED_BLOCK_SIZE];
        c.read_exact(&mut rs_block)?;

        let decoded = rs_decode(&rs_block, 3 * ac21::RS_BLOCK_SIZE, 3, ac21::RS_BLOCK_SIZE);
        if decoded.len() < 32 {
            return Err(DwgError::Parse(
                "R2007 metadata block too short after RS decode".into(),
            ));
        }

        // 32-byte wrapper: CRC, key, compressed CRC, compressed length,
        // secondary length; then the LZ77 compressed metadata record.
        let compressed_len = {
            let mut w = Cursor::new(&decoded[24..28]);
            w.read_i32::<LittleEndian>()?
        };

        let metadata_raw = if compressed_len > 0
            && 32 + compressed_len as usize <= decoded.len()
        {
            decompress_ac21(
                &decoded[32..32 + compressed_len as usize],
                ac21::DECOMPRESSED_HEADER_SIZE,
            )?
        } else {
            let end = (32 + ac21::DECOMPRESSED_HEADER_SIZE).min(decoded.len());
            decoded[32..end].to_vec()
        };
        if metadata_raw.len() < ac21::DECOMPRESSED_HEADER_SIZE {
            return Err(DwgError::Parse(
                "R2007 metadata record too short".into(),
            ));
        }

        let meta = Self::parse_ac21_metadata(&metadata_raw)?;
        self.read_page_map_ac21(&mut header, &meta)?;
        self.read_section_map_ac21(&mut header, &meta)?;

        Ok(header)
    }

    /// Pick out the useful u64 fields of the 0x110-byte metadata record.
    fn parse_ac21_metadata(data: &[u8]) -> Result<Ac21Metadata> {
        let field = |offset: usize| -> u64 {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&data[offset..offset + 8]);
            u64::from_le_bytes(bytes)
        };

        Ok(Ac21Metadata {
            pages_map_offset: field(0x38),
            pages_map_size_compressed: field(0x48),
            pages_map_size_uncompressed: field(0x50),
            pages_amount: field(0x58),
            pages_map_id: field(0x70),
            sections_amount: field(0xA8),
            sections_map_id: field(0xC0),
        })
    }

    /// Read and decode an AC1021 map page (plain 20-byte header, AC21
    /// compression).
    fn read_map_page_ac21(&self, address: u64) -> Result<Vec<u8>> {
        let mut c = self.cursor_at(address)?;
        let _page_type = c.read_i32::<LittleEndian>()?;
        let decompressed_size = c.read_i32::<LittleEndian>()?;
        let compressed_size = c.read_i32::<LittleEndian>()?;
        let compression_type = c.read_i32::<LittleEndian>()?;
        let _checksum = c.read_i32::<LittleEndian>()?;

        if compressed_size <= 0 || decompressed_size <= 0 {
            return Ok(Vec::new());
        }

        let mut payload = vec![0u8; compressed_size as usize];
        c.read_exact(&mut payload).map_err(|_| {
            DwgError::Truncated(format!("map page at {address} truncated"))
        })?;

        if compression_type == 2 {
            decompress_ac21(&payload, decompressed_size as usize)
        } else {
            Ok(payload)
        }
    }

    fn read_page_map_ac21(
        &self,
        header: &mut FileHeaderAc18,
        meta: &Ac21Metadata,
    ) -> Result<()> {
        let data = self.read_map_page_ac21(meta.pages_map_offset)?;
        let mut c = Cursor::new(&data);
        let mut seeker = ac21::DATA_PAGE_BASE_OFFSET as i64;

        while (c.position() as usize) + 8 <= data.len() {
            let page_number = c.read_i32::<LittleEndian>()?;
            let size = c.read_i32::<LittleEndian>()? as i64;
            if page_number >= 0 {
                header.records.insert(
                    page_number as usize,
                    SectionLocatorRecord::new(page_number, seeker, size),
                );
            }
            seeker += size;
        }
        Ok(())
    }

    fn read_section_map_ac21(
        &self,
        header: &mut FileHeaderAc18,
        meta: &Ac21Metadata,
    ) -> Result<()> {
        let record = header
            .records
            .get(&(meta.sections_map_id as usize))
            .copied()
            .ok_or_else(|| {
                DwgError::CorruptSection(format!(
                    "R2007 section map page {} absent from the page map",
                    meta.sections_map_id
                ))
            })?;

        let data = self.read_map_page_ac21(record.seeker as u64)?;
        let mut c = Cursor::new(&data);

        while (c.position() as usize) + 0x40 <= data.len() {
            let total_size = c.read_u64::<LittleEndian>()?;
            let max_decompressed_size = c.read_u64::<LittleEndian>()?;
            let _encrypted = c.read_u64::<LittleEndian>()?;
            let _hash_code = c.read_u64::<LittleEndian>()?;
            let name_length = c.read_u64::<LittleEndian>()?;
            let _unknown = c.read_u64::<LittleEndian>()?;
            let encoding = c.read_u64::<LittleEndian>()?;
            let page_count = c.read_u64::<LittleEndian>()? as usize;

            let name = if name_length > 0 {
                let byte_count = (name_length as usize) * 2;
                if (c.position() as usize) + byte_count > data.len() {
                    break;
                }
                let mut name_bytes = vec![0u8; byte_count];
                c.read_exact(&mut name_bytes)?;
                let units: Vec<u16> = name_bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units).replace('\0', "")
            } else {
                String::new()
            };

            let mut descriptor = SectionDescriptor::new(&name);
            descriptor.compressed_size = total_size;
            descriptor.page_count = page_count as i32;
            descriptor.decompressed_size = max_decompressed_size;
            descriptor.compressed_code = encoding as i32;

            for _ in 0..page_count {
                if (c.position() as usize) + 56 > data.len() {
                    break;
                }
                let offset = c.read_u64::<LittleEndian>()?;
                let _size = c.read_u64::<LittleEndian>()?;
                let page_number = c.read_u64::<LittleEndian>()? as i32;
                let decompressed_size = c.read_u64::<LittleEndian>()?;
                let compressed_size = c.read_u64::<LittleEndian>()?;
                let _checksum = c.read_u64::<LittleEndian>()?;
                let _crc = c.read_u64::<LittleEndian>()?;

                let mut page = LocalSectionPage {
                    page_number,
                    compressed_size,
                    offset,
                    decompressed_size,
                    seeker: 0,
                };
                if let Some(rec) = header.records.get(&(page_number as usize)) {
                    page.seeker = rec.seeker as u64;
                }
                descriptor.pages.push(page);
            }

            if !name.is_empty() {
                header.add_descriptor(descriptor);
            }
        }

        Ok(())
    }

    // -------------------------------------------------------------------
    // Section stream assembly
    // -------------------------------------------------------------------

    /// Assemble the named logical section into one contiguous buffer.
    fn section_stream(&self, header: &FileHeader, name: &str) -> Result<Vec<u8>> {
        match header {
            FileHeader::Ac15(h) => self.section_stream_ac15(h, name),
            FileHeader::Ac18(h) => {
                if self.version == DwgVersion::AC1021 {
                    self.section_stream_ac21(h, name)
                } else {
                    self.section_stream_ac18(h, name)
                }
            }
        }
    }

    /// AC1015 sections are contiguous byte ranges from the locator table.
    fn section_stream_ac15(&self, header: &FileHeaderAc15, name: &str) -> Result<Vec<u8>> {
        let index = section_names::ac15_locator_index(name).ok_or_else(|| {
            DwgError::Parse(format!("section '{name}' has no locator slot"))
        })?;
        let record = header.records.get(&index).ok_or_else(|| {
            DwgError::Truncated(format!("locator record {index} for '{name}' missing"))
        })?;

        if !record.is_valid() {
            return Ok(Vec::new());
        }
        let start = record.seeker as usize;
        let end = start + record.size as usize;
        if end > self.data.len() {
            return Err(DwgError::Truncated(format!(
                "section '{name}' runs to {end}, file is {} bytes",
                self.data.len()
            )));
        }
        Ok(self.data[start..end].to_vec())
    }

    /// AC1018-family sections: per page, decrypt the 32-byte header,
    /// validate the data checksum, then decompress or copy.
    fn section_stream_ac18(&self, header: &FileHeaderAc18, name: &str) -> Result<Vec<u8>> {
        let descriptor = header.descriptors.get(name).ok_or_else(|| {
            DwgError::CorruptSection(format!("section '{name}' absent from the section map"))
        })?;

        let mut assembled = Vec::new();
        for page in &descriptor.pages {
            let mut c = self.cursor_at(page.seeker)?;
            let mut header_bytes = [0u8; 32];
            c.read_exact(&mut header_bytes).map_err(|_| {
                DwgError::Truncated(format!("page header at {} truncated", page.seeker))
            })?;

            let page_header = decrypt_page_header(&header_bytes, page.seeker);
            if page_header.page_type != ac18::PAGE_TYPE_DATA {
                return Err(DwgError::CorruptSection(format!(
                    "page at {} of '{name}' has type {:#X}",
                    page.seeker, page_header.page_type
                )));
            }

            let compressed_size = page_header.compressed_size.max(0) as usize;
            let page_size = page_header.page_size.max(0) as usize;
            if compressed_size == 0 || page_size == 0 {
                continue;
            }

            let mut payload = vec![0u8; compressed_size];
            c.read_exact(&mut payload).map_err(|_| {
                DwgError::Truncated(format!(
                    "page data at {} of '{name}' truncated",
                    page.seeker
                ))
            })?;

            let computed = section_page_checksum(0, &payload);
            if computed != page_header.data_checksum as u32 {
                return Err(DwgError::CorruptSection(format!(
                    "page at {} of '{name}': checksum {computed:#010X} does not match stored {:#010X}",
                    page.seeker, page_header.data_checksum as u32
                )));
            }

            if descriptor.is_compressed() {
                assembled.extend_from_slice(&decompress_ac18(&payload, page_size)?);
            } else {
                assembled.extend_from_slice(&payload);
            }
        }

        Ok(assembled)
    }

    /// AC1021 sections: masked page headers and the AC21 codec.
    fn section_stream_ac21(&self, header: &FileHeaderAc18, name: &str) -> Result<Vec<u8>> {
        let descriptor = header.descriptors.get(name).ok_or_else(|| {
            DwgError::CorruptSection(format!("section '{name}' absent from the section map"))
        })?;

        let mut assembled = Vec::new();
        for page in &descriptor.pages {
            let mut c = self.cursor_at(page.seeker)?;
            let mut header_bytes = [0u8; 32];
            c.read_exact(&mut header_bytes).map_err(|_| {
                DwgError::Truncated(format!("page header at {} truncated", page.seeker))
            })?;

            // The header is masked with `0x4164536B ^ page position`.
            let mask = (ac21::PAGE_HEADER_MASK ^ page.seeker as u32).to_le_bytes();
            for (i, byte) in header_bytes.iter_mut().enumerate() {
                *byte ^= mask[i % 4];
            }

            let mut h = Cursor::new(&header_bytes[..]);
            let _page_type = h.read_i32::<LittleEndian>()?;
            let _section_id = h.read_i32::<LittleEndian>()?;
            let compressed_size = h.read_i32::<LittleEndian>()?.max(0) as usize;
            let _page_size = h.read_i32::<LittleEndian>()?;
            let _start_offset = h.read_i64::<LittleEndian>()?;

            let decompressed_size = page.decompressed_size as usize;
            if compressed_size == 0 || decompressed_size == 0 {
                continue;
            }

            let mut payload = vec![0u8; compressed_size];
            c.read_exact(&mut payload).map_err(|_| {
                DwgError::Truncated(format!(
                    "page data at {} of '{name}' truncated",
                    page.seeker
                ))
            })?;

            if compressed_size != decompressed_size {
                assembled.extend_from_slice(&decompress_ac21(&payload, decompressed_size)?);
            } else {
                assembled.extend_from_slice(&payload);
            }
        }

        Ok(assembled)
    }
}
