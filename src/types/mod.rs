//! Shared value types: version tags, handles, vectors, colors.

pub mod color;
pub mod handle;
pub mod line_weight;
pub mod transparency;
pub mod vector;

pub use color::Color;
pub use handle::Handle;
pub use line_weight::LineWeight;
pub use transparency::Transparency;
pub use vector::{Vector2, Vector3};

use serde::{Deserialize, Serialize};
use std::fmt;

/// DWG release tag, drawn from the 6-byte magic at offset 0.
///
/// Only binary DWG releases R2000 through R2013 are supported. The ordering
/// of the variants matches the chronological ordering of the releases, so
/// `version >= DwgVersion::AC1018` reads as "R2004 or later".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DwgVersion {
    /// R2000 (and R2000i / R2002)
    AC1015,
    /// R2004 (and R2005 / R2006)
    AC1018,
    /// R2007 (and R2008 / R2009)
    AC1021,
    /// R2010 (and R2011 / R2012)
    AC1024,
    /// R2013 (and R2014 / R2015 / R2016 / R2017)
    AC1027,
}

impl DwgVersion {
    /// Parse a version from the 6-byte magic string.
    pub fn parse(magic: &str) -> Option<Self> {
        match magic {
            "AC1015" => Some(DwgVersion::AC1015),
            "AC1018" => Some(DwgVersion::AC1018),
            "AC1021" => Some(DwgVersion::AC1021),
            "AC1024" => Some(DwgVersion::AC1024),
            "AC1027" => Some(DwgVersion::AC1027),
            _ => None,
        }
    }

    /// Parse a version from the first six bytes of a file.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 6 {
            return None;
        }
        std::str::from_utf8(&bytes[..6]).ok().and_then(Self::parse)
    }

    /// The 6-byte version code as written in the file.
    pub fn as_str(&self) -> &'static str {
        match self {
            DwgVersion::AC1015 => "AC1015",
            DwgVersion::AC1018 => "AC1018",
            DwgVersion::AC1021 => "AC1021",
            DwgVersion::AC1024 => "AC1024",
            DwgVersion::AC1027 => "AC1027",
        }
    }

    /// Human-readable release name (e.g. "R2000").
    pub fn release_name(&self) -> &'static str {
        match self {
            DwgVersion::AC1015 => "R2000",
            DwgVersion::AC1018 => "R2004",
            DwgVersion::AC1021 => "R2007",
            DwgVersion::AC1024 => "R2010",
            DwgVersion::AC1027 => "R2013",
        }
    }
}

impl fmt::Display for DwgVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_versions() {
        assert_eq!(DwgVersion::parse("AC1015"), Some(DwgVersion::AC1015));
        assert_eq!(DwgVersion::parse("AC1027"), Some(DwgVersion::AC1027));
        assert_eq!(DwgVersion::parse("AC1032"), None);
        assert_eq!(DwgVersion::parse("AC1009"), None);
    }

    #[test]
    fn test_from_magic() {
        assert_eq!(
            DwgVersion::from_magic(b"AC1018\x00\x00"),
            Some(DwgVersion::AC1018)
        );
        assert_eq!(DwgVersion::from_magic(b"AC10"), None);
        assert_eq!(DwgVersion::from_magic(b"\xFF\xFF\xFF\xFF\xFF\xFF"), None);
    }

    #[test]
    fn test_version_ordering() {
        assert!(DwgVersion::AC1015 < DwgVersion::AC1018);
        assert!(DwgVersion::AC1021 >= DwgVersion::AC1018);
        assert!(DwgVersion::AC1027 > DwgVersion::AC1024);
    }

    #[test]
    fn test_release_names() {
        assert_eq!(DwgVersion::AC1015.release_name(), "R2000");
        assert_eq!(DwgVersion::AC1021.release_name(), "R2007");
    }
}
