//! Terrain Codes and Color Classification
//!
//! Maps raw RGBA pixels to semantic terrain codes. Thresholds are
//! tolerance-based so that compression artifacts around the nominal
//! colors still land in the right bucket.

use serde::{Serialize, Deserialize};

/// Alpha below this value is treated as transparent (off-path).
pub const ALPHA_CUTOFF: u8 = 50;

/// Channel value above which a component counts as "high".
const HIGH: u8 = 200;

/// Channel value above which all three components make a near-white pixel.
const NEAR_WHITE: u8 = 240;

/// Channel value below which a component counts as "low".
const LOW: u8 = 50;

/// Semantic meaning of one grid cell.
///
/// Discriminants match the numeric codes used by circuit tooling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TerrainCode {
    /// Outside the drivable path (white or transparent)
    #[default]
    OffPath = 0,
    /// Start zone (green)
    Start = 1,
    /// Drivable path (nominally blue, anything not otherwise classified)
    Path = 2,
    /// Finish zone (red)
    Finish = 3,
}

impl TerrainCode {
    /// Get code from its numeric value (0-3).
    pub fn from_index(index: u8) -> Option<TerrainCode> {
        match index {
            0 => Some(TerrainCode::OffPath),
            1 => Some(TerrainCode::Start),
            2 => Some(TerrainCode::Path),
            3 => Some(TerrainCode::Finish),
            _ => None,
        }
    }

    /// Whether a cursor may rest on this cell while playing.
    #[inline]
    pub fn is_drivable(self) -> bool {
        matches!(self, TerrainCode::Path | TerrainCode::Start)
    }
}

/// Classify one pixel.
///
/// Every input maps to exactly one code; rules are checked in order.
#[inline]
pub fn classify(r: u8, g: u8, b: u8, a: u8) -> TerrainCode {
    if a < ALPHA_CUTOFF {
        return TerrainCode::OffPath;
    }
    if r > NEAR_WHITE && g > NEAR_WHITE && b > NEAR_WHITE {
        return TerrainCode::OffPath;
    }
    if r > HIGH && g < LOW && b < LOW {
        return TerrainCode::Finish;
    }
    if r < LOW && g > HIGH && b < LOW {
        return TerrainCode::Start;
    }
    TerrainCode::Path
}

/// Classify an `[r, g, b, a]` quadruple.
#[inline]
pub fn classify_rgba(pixel: [u8; 4]) -> TerrainCode {
    classify(pixel[0], pixel[1], pixel[2], pixel[3])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_nominal_colors() {
        assert_eq!(classify(255, 255, 255, 255), TerrainCode::OffPath);
        assert_eq!(classify(0, 255, 0, 255), TerrainCode::Start);
        assert_eq!(classify(0, 0, 255, 255), TerrainCode::Path);
        assert_eq!(classify(255, 0, 0, 255), TerrainCode::Finish);
    }

    #[test]
    fn test_transparent_is_off_path() {
        // Even a pure red pixel is ignored when nearly transparent
        assert_eq!(classify(255, 0, 0, 49), TerrainCode::OffPath);
        assert_eq!(classify(255, 0, 0, 50), TerrainCode::Finish);
    }

    #[test]
    fn test_compression_artifacts_tolerated() {
        assert_eq!(classify(245, 250, 241, 255), TerrainCode::OffPath);
        assert_eq!(classify(220, 30, 12, 255), TerrainCode::Finish);
        assert_eq!(classify(10, 230, 40, 255), TerrainCode::Start);
    }

    #[test]
    fn test_boundaries_fall_through_to_path() {
        // 240 is not "> 240"
        assert_eq!(classify(240, 255, 255, 255), TerrainCode::Path);
        // 200 is not "> 200"
        assert_eq!(classify(200, 0, 0, 255), TerrainCode::Path);
        // 50 is not "< 50"
        assert_eq!(classify(50, 255, 0, 255), TerrainCode::Path);
        // Anti-aliased grey between path and background
        assert_eq!(classify(128, 128, 200, 255), TerrainCode::Path);
    }

    #[test]
    fn test_from_index() {
        for code in [TerrainCode::OffPath, TerrainCode::Start, TerrainCode::Path, TerrainCode::Finish] {
            assert_eq!(TerrainCode::from_index(code as u8), Some(code));
        }
        assert_eq!(TerrainCode::from_index(4), None);
    }

    #[test]
    fn test_default_is_off_path() {
        assert_eq!(TerrainCode::default(), TerrainCode::OffPath);
        assert_eq!(TerrainCode::default() as u8, 0);
    }

    proptest! {
        #[test]
        fn prop_classification_is_pure(r: u8, g: u8, b: u8, a: u8) {
            let first = classify(r, g, b, a);
            prop_assert_eq!(first, classify(r, g, b, a));
            prop_assert_eq!(first, classify_rgba([r, g, b, a]));
        }

        #[test]
        fn prop_classification_matches_rules(r: u8, g: u8, b: u8, a: u8) {
            let expected = if a < 50 || (r > 240 && g > 240 && b > 240) {
                TerrainCode::OffPath
            } else if r > 200 && g < 50 && b < 50 {
                TerrainCode::Finish
            } else if r < 50 && g > 200 && b < 50 {
                TerrainCode::Start
            } else {
                TerrainCode::Path
            };
            prop_assert_eq!(classify(r, g, b, a), expected);
        }
    }
}
