//! AC18+ section descriptors and their per-page maps.

/// One page of a logical section.
///
/// `page_number` indexes into the page map records; `seeker` is resolved
/// from there to the page's absolute file position.
#[derive(Debug, Clone, Default)]
pub struct LocalSectionPage {
    /// Page number (index into the page map records)
    pub page_number: i32,
    /// Compressed size of this page's payload
    pub compressed_size: u64,
    /// Logical offset of this page's data within the assembled section
    pub offset: u64,
    /// Decompressed size of this page's payload
    pub decompressed_size: u64,
    /// Absolute file position of the page (from the page map)
    pub seeker: u64,
}

/// A named logical section of an AC18+ file.
#[derive(Debug, Clone, Default)]
pub struct SectionDescriptor {
    /// Conventional section name, e.g. `AcDb:AcDbObjects`
    pub name: String,
    /// Total compressed data size across all pages
    pub compressed_size: u64,
    /// Number of pages
    pub page_count: i32,
    /// Maximum decompressed size of one page (normally 0x7400)
    pub decompressed_size: u64,
    /// 1 = stored raw, 2 = LZ77 compressed
    pub compressed_code: i32,
    /// Section id
    pub section_id: i32,
    /// 0 = plain, 1 = encrypted, 2 = unknown
    pub encrypted: i32,
    /// Per-page map in logical order
    pub pages: Vec<LocalSectionPage>,
}

impl SectionDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Whether the section payload is LZ77 compressed.
    pub fn is_compressed(&self) -> bool {
        self.compressed_code == 2
    }

    /// Total decompressed size of the assembled section.
    pub fn total_decompressed_size(&self) -> u64 {
        self.pages.iter().map(|p| p.decompressed_size).sum()
    }
}
