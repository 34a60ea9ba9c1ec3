//! Pre-computed version gates for section and object readers.

use crate::types::DwgVersion;

/// Version-conditional gates, computed once per reader.
///
/// The crate floor is AC1015 (R2000), so "R2000+" branches are
/// unconditional and carry no flag here.
#[derive(Debug, Clone, Copy)]
pub struct VersionFlags {
    version: DwgVersion,

    /// R2004+ (AC1018 and later)
    pub r2004_plus: bool,
    /// R2007+ (AC1021 and later)
    pub r2007_plus: bool,
    /// R2010+ (AC1024 and later)
    pub r2010_plus: bool,
    /// R2013+ (AC1027 and later)
    pub r2013_plus: bool,
}

impl VersionFlags {
    pub fn new(version: DwgVersion) -> Self {
        Self {
            r2004_plus: version >= DwgVersion::AC1018,
            r2007_plus: version >= DwgVersion::AC1021,
            r2010_plus: version >= DwgVersion::AC1024,
            r2013_plus: version >= DwgVersion::AC1027,
            version,
        }
    }

    pub fn version(&self) -> DwgVersion {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_ac1015() {
        let f = VersionFlags::new(DwgVersion::AC1015);
        assert!(!f.r2004_plus);
        assert!(!f.r2007_plus);
        assert!(!f.r2010_plus);
        assert!(!f.r2013_plus);
    }

    #[test]
    fn test_flags_ac1021() {
        let f = VersionFlags::new(DwgVersion::AC1021);
        assert!(f.r2004_plus);
        assert!(f.r2007_plus);
        assert!(!f.r2010_plus);
    }

    #[test]
    fn test_flags_ac1027() {
        let f = VersionFlags::new(DwgVersion::AC1027);
        assert!(f.r2004_plus && f.r2007_plus && f.r2010_plus && f.r2013_plus);
    }
}
