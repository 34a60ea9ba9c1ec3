//! Error types for the DWG reader.

use std::io;
use thiserror::Error;

/// Main error type for DWG decoding operations.
#[derive(Debug, Error)]
pub enum DwgError {
    /// IO error occurred during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The 6-byte magic does not name a supported DWG release
    #[error("Unsupported DWG version: {0:?}")]
    UnsupportedVersion(String),

    /// A byte-level read ran past the end of the source data
    #[error("Truncated file: {0}")]
    Truncated(String),

    /// A bit-level read ran past the end of the object data
    #[error("Bit underflow at bit position {position}")]
    BitUnderflow { position: i64 },

    /// A section page failed checksum validation or could not be assembled
    #[error("Corrupt section: {0}")]
    CorruptSection(String),

    /// The handle map (object map) failed CRC validation
    #[error("Corrupt handle map: {0}")]
    CorruptHandles(String),

    /// The decompressor tried to write outside the declared output size
    #[error("Corrupt compressed stream: {0}")]
    CorruptStream(String),

    /// An entity parser consumed data past its declared object bounds
    #[error("Parser overrun in {object_type}: consumed to bit {consumed}, object ends at bit {end}")]
    ParserOverrun {
        object_type: &'static str,
        consumed: i64,
        end: i64,
    },

    /// The external downgrade converter did not produce usable output
    #[error("Converter failed: {0}")]
    ConvertFailed(String),

    /// Error parsing DWG structures
    #[error("Parse error: {0}")]
    Parse(String),

    /// Encoding error
    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Result type alias for DWG decoding operations.
pub type Result<T> = std::result::Result<T, DwgError>;

impl From<String> for DwgError {
    fn from(s: String) -> Self {
        DwgError::Parse(s)
    }
}

impl From<&str> for DwgError {
    fn from(s: &str) -> Self {
        DwgError::Parse(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DwgError::UnsupportedVersion("AC1009".to_string());
        assert_eq!(err.to_string(), "Unsupported DWG version: \"AC1009\"");
    }

    #[test]
    fn test_parser_overrun_display() {
        let err = DwgError::ParserOverrun {
            object_type: "LINE",
            consumed: 130,
            end: 128,
        };
        assert!(err.to_string().contains("LINE"));
        assert!(err.to_string().contains("130"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: DwgError = io_err.into();
        assert!(matches!(err, DwgError::Io(_)));
    }
}
