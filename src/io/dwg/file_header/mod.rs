//! DWG file header structures.
//!
//! The file header carries the version tag plus whatever is needed to find
//! the sections: a fixed locator table for AC1015, a page/section map for
//! AC1018-family files, and Reed-Solomon wrapped metadata for AC1021.

mod section_descriptor;
mod section_locator;

pub use section_descriptor::{LocalSectionPage, SectionDescriptor};
pub use section_locator::SectionLocatorRecord;

use std::collections::HashMap;

use crate::types::DwgVersion;

/// Parsed file header, version-dispatched.
#[derive(Debug, Clone)]
pub enum FileHeader {
    /// R2000: fixed section locator table
    Ac15(FileHeaderAc15),
    /// R2004/R2010/R2013 and R2007: paged layout
    Ac18(FileHeaderAc18),
}

impl FileHeader {
    pub fn version(&self) -> DwgVersion {
        match self {
            FileHeader::Ac15(h) => h.version,
            FileHeader::Ac18(h) => h.version,
        }
    }
}

/// R2000 file header: preamble fields plus the locator table.
#[derive(Debug, Clone)]
pub struct FileHeaderAc15 {
    pub version: DwgVersion,
    pub maintenance_version: u8,
    pub preview_address: i64,
    pub codepage: u16,
    /// Locator records by section number
    pub records: HashMap<usize, SectionLocatorRecord>,
}

impl FileHeaderAc15 {
    pub fn new(version: DwgVersion) -> Self {
        Self {
            version,
            maintenance_version: 0,
            preview_address: -1,
            codepage: 0,
            records: HashMap::new(),
        }
    }
}

/// Paged file header shared by the AC1018 family and AC1021.
///
/// AC1021 reuses the same page/section map model with different on-disk
/// encoding; after header parsing both converge on this structure.
#[derive(Debug, Clone)]
pub struct FileHeaderAc18 {
    pub version: DwgVersion,
    pub maintenance_version: u8,
    pub preview_address: i64,
    pub codepage: u16,
    pub security_type: i32,
    pub summary_info_address: i64,

    /// Page map id of the section map page
    pub section_map_id: u32,
    /// Absolute file address of the page map page
    pub page_map_address: u64,
    /// Number of sections announced by the metadata block
    pub section_amount: u32,
    /// CRC seed from the metadata block
    pub crc_seed: u32,

    /// Page map: page number → locator record
    pub records: HashMap<usize, SectionLocatorRecord>,
    /// Section map: section name → descriptor
    pub descriptors: HashMap<String, SectionDescriptor>,
}

impl FileHeaderAc18 {
    pub fn new(version: DwgVersion) -> Self {
        Self {
            version,
            maintenance_version: 0,
            preview_address: -1,
            codepage: 0,
            security_type: 0,
            summary_info_address: 0,
            section_map_id: 0,
            page_map_address: 0,
            section_amount: 0,
            crc_seed: 0,
            records: HashMap::new(),
            descriptors: HashMap::new(),
        }
    }

    pub fn add_descriptor(&mut self, descriptor: SectionDescriptor) {
        self.descriptors.insert(descriptor.name.clone(), descriptor);
    }
}

/// The fields of the R2007 compressed metadata record this reader uses.
///
/// The on-disk record is 34 little-endian u64 values; only the page-map
/// and section-map coordinates matter for decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ac21Metadata {
    pub pages_map_offset: u64,
    pub pages_map_size_compressed: u64,
    pub pages_map_size_uncompressed: u64,
    pub pages_amount: u64,
    pub sections_amount: u64,
    pub sections_map_id: u64,
    pub pages_map_id: u64,
}
