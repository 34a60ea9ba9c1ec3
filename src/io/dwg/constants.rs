//! Constants, sentinel bytes, and magic numbers for the DWG file format.

/// Logical section names as they appear in the AC18+ section map.
pub mod section_names {
    /// All entities, table entries, and objects
    pub const ACDB_OBJECTS: &str = "AcDb:AcDbObjects";
    /// System variables (header variables)
    pub const HEADER: &str = "AcDb:Header";
    /// DXF class definitions
    pub const CLASSES: &str = "AcDb:Classes";
    /// Object map (handle → stream offset)
    pub const HANDLES: &str = "AcDb:Handles";

    /// AC15 section locator index for a section name.
    ///
    /// Returns `None` for sections not present in the fixed locator table.
    pub fn ac15_locator_index(name: &str) -> Option<usize> {
        match name {
            HEADER => Some(0),
            CLASSES => Some(1),
            HANDLES => Some(2),
            _ => None,
        }
    }
}

/// Sentinel bytes for section boundaries (16-byte markers).
pub mod sentinels {
    /// AcDb:Classes section start sentinel
    pub const CLASSES_START: [u8; 16] = [
        0x8D, 0xA1, 0xC4, 0xB8, 0xC4, 0xA9, 0xF8, 0xC5, 0xC0, 0xDC, 0xF4, 0x5F, 0xE7, 0xCF,
        0xB6, 0x8A,
    ];
    /// AcDb:Classes section end sentinel
    pub const CLASSES_END: [u8; 16] = [
        0x72, 0x5E, 0x3B, 0x47, 0x3B, 0x56, 0x07, 0x3A, 0x3F, 0x23, 0x0B, 0xA0, 0x18, 0x30,
        0x49, 0x75,
    ];
    /// File header end sentinel (AC15 only); the locator table is followed
    /// by a CRC word and these 16 bytes.
    pub const FILE_HEADER_END_AC15: [u8; 16] = [
        0x95, 0xA0, 0x4E, 0x28, 0x99, 0x82, 0x1A, 0xE5, 0x5E, 0x41, 0xE0, 0x5F, 0x9D, 0x3A,
        0x4D, 0x00,
    ];
}

/// AC18-family (R2004/R2010/R2013) file format constants.
pub mod ac18 {
    /// Size of the encrypted header metadata block at offset 0x80
    pub const ENCRYPTED_HEADER_SIZE: usize = 0x6C;
    /// XOR mask base for data page header decryption
    pub const DECRYPTION_MASK: u32 = 0x4164536B;
    /// Maximum decompressed page payload size (29696 bytes)
    pub const MAX_PAGE_SIZE: usize = 0x7400;
    /// Data page type marker
    pub const PAGE_TYPE_DATA: i32 = 0x4163043B;
    /// Page map page type marker
    pub const PAGE_TYPE_PAGE_MAP: i32 = 0x41630E3B;
    /// Section map page type marker
    pub const PAGE_TYPE_SECTION_MAP: i32 = 0x4163003B;
    /// Base file offset where data pages begin (page map seekers add this)
    pub const DATA_PAGE_BASE_OFFSET: u64 = 0x100;
}

/// AC21 (R2007) file format constants.
pub mod ac21 {
    /// Base file offset where data pages begin
    pub const DATA_PAGE_BASE_OFFSET: u64 = 0x480;
    /// Size of the Reed-Solomon encoded metadata block at offset 0x80
    pub const RS_ENCODED_BLOCK_SIZE: usize = 0x400;
    /// Size of the decompressed header metadata record
    pub const DECOMPRESSED_HEADER_SIZE: usize = 0x110;
    /// Reed-Solomon data block size for the header metadata
    pub const RS_BLOCK_SIZE: usize = 239;
    /// XOR mask base for page header unmasking
    pub const PAGE_HEADER_MASK: u32 = 0x4164536B;
}

/// Handle/object map section constants.
pub mod handle_section {
    /// Maximum payload size of one handle-map subsection
    pub const MAX_CHUNK_SIZE: i32 = 2032;
}

/// Seed for the object and handle-map CRC-16 runs.
pub const OBJECT_CRC_SEED: u16 = 0xC0C1;
