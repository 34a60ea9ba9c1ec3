//! Line weight values.

use serde::{Deserialize, Serialize};

/// Entity line weight in hundredths of a millimeter, or one of the
/// special by-layer / by-block / default values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineWeight {
    ByLayer,
    ByBlock,
    Default,
    /// Explicit weight in 1/100 mm (0-211)
    Value(i16),
}

impl LineWeight {
    /// Decode the raw lineweight byte stored in the common entity data.
    ///
    /// 0x1D (29) = ByLayer, 0x1E (30) = ByBlock, 0x1F (31) = Default;
    /// values 0-28 index the fixed lineweight table.
    pub fn from_raw(raw: u8) -> Self {
        const TABLE: [i16; 24] = [
            0, 5, 9, 13, 15, 18, 20, 25, 30, 35, 40, 50, 53, 60, 70, 80, 90, 100, 106, 120,
            140, 158, 200, 211,
        ];
        match raw {
            0x1D => LineWeight::ByLayer,
            0x1E => LineWeight::ByBlock,
            0x1F => LineWeight::Default,
            n if (n as usize) < TABLE.len() => LineWeight::Value(TABLE[n as usize]),
            _ => LineWeight::Default,
        }
    }
}

impl Default for LineWeight {
    fn default() -> Self {
        LineWeight::ByLayer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_values() {
        assert_eq!(LineWeight::from_raw(0x1D), LineWeight::ByLayer);
        assert_eq!(LineWeight::from_raw(0x1E), LineWeight::ByBlock);
        assert_eq!(LineWeight::from_raw(0x1F), LineWeight::Default);
    }

    #[test]
    fn test_table_values() {
        assert_eq!(LineWeight::from_raw(0), LineWeight::Value(0));
        assert_eq!(LineWeight::from_raw(8), LineWeight::Value(30));
        assert_eq!(LineWeight::from_raw(23), LineWeight::Value(211));
        // Past the table but below the specials
        assert_eq!(LineWeight::from_raw(24), LineWeight::Default);
    }
}
