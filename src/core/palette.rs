//! Fixed canvas palette.
//!
//! Indices `0..len` map to the canvas colors in order. Index [`TRANSPARENT`]
//! never appears in the palette definition; on a board or template it marks a
//! pixel that is unplaced (board) or not part of the design (template).

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// Sentinel index for "no color".
pub const TRANSPARENT: u8 = 255;

/// Largest number of real colors a palette can hold.
pub const MAX_COLORS: usize = TRANSPARENT as usize;

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// Fully transparent black, the color the sentinel renders as.
    pub const CLEAR: Self = Self([0, 0, 0, 0]);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// Parse `RRGGBB` or `#RRGGBB` into an opaque color.
    pub fn from_hex(value: &str) -> Result<Self> {
        let digits = value.trim().trim_start_matches('#');
        let bytes = hex::decode(digits)
            .map_err(|e| TrackerError::validation(format!("invalid color `{value}`: {e}")))?;
        match bytes.as_slice() {
            [r, g, b] => Ok(Self::opaque(*r, *g, *b)),
            _ => Err(TrackerError::validation(format!(
                "invalid color `{value}`: expected 6 hex digits"
            ))),
        }
    }

    /// Squared euclidean distance over all four channels.
    #[inline]
    pub fn distance_sq(self, other: Self) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(&a, &b)| {
                let d = i32::from(a) - i32::from(b);
                (d * d) as u32
            })
            .sum()
    }
}

/// Ordered set of distinct canvas colors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    colors: Vec<Rgba>,
}

impl Palette {
    pub fn new(colors: Vec<Rgba>) -> Result<Self> {
        if colors.len() > MAX_COLORS {
            return Err(TrackerError::validation(format!(
                "palette has {} colors, at most {MAX_COLORS} are supported",
                colors.len()
            )));
        }
        for (i, color) in colors.iter().enumerate() {
            if let Some(j) = colors[..i].iter().position(|c| c == color) {
                return Err(TrackerError::validation(format!(
                    "palette entries {j} and {i} share the same color"
                )));
            }
        }
        Ok(Self { colors })
    }

    /// Build a palette from hex color strings, in order.
    pub fn from_hex<I, S>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let colors = values
            .into_iter()
            .map(|v| Rgba::from_hex(v.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(colors)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    /// Color at `index`; `None` for the sentinel and out-of-range indices.
    pub fn get(&self, index: u8) -> Option<Rgba> {
        if index == TRANSPARENT {
            return None;
        }
        self.colors.get(usize::from(index)).copied()
    }

    /// Whether `index` may appear on a board: a palette index or the sentinel.
    pub fn is_valid_index(&self, index: u8) -> bool {
        index == TRANSPARENT || usize::from(index) < self.colors.len()
    }

    /// Index of the closest color, with a synthetic transparent entry tested last.
    ///
    /// Ties go to the entry tested first, so the lowest palette index wins and the
    /// transparent entry only wins when it is strictly closer than every color.
    pub fn nearest(&self, pixel: Rgba) -> u8 {
        let mut best_index = TRANSPARENT;
        let mut best_distance = u32::MAX;
        for (index, color) in self.colors.iter().enumerate() {
            let distance = pixel.distance_sq(*color);
            if distance < best_distance {
                best_distance = distance;
                best_index = index as u8;
            }
        }
        if pixel.distance_sq(Rgba::CLEAR) < best_distance {
            best_index = TRANSPARENT;
        }
        best_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> Palette {
        Palette::from_hex(["FF0000", "00FF00", "#0000FF", "000000"]).unwrap()
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgba::from_hex("#1a2B3c").unwrap(), Rgba::opaque(0x1a, 0x2b, 0x3c));
        assert!(Rgba::from_hex("12345").is_err());
        assert!(Rgba::from_hex("GGGGGG").is_err());
        assert!(Rgba::from_hex("11223344").is_err());
    }

    #[test]
    fn test_duplicate_colors_rejected() {
        let err = Palette::from_hex(["FFFFFF", "000000", "FFFFFF"]).unwrap_err();
        assert!(err.to_string().contains("0 and 2"));
    }

    #[test]
    fn test_get_and_sentinel() {
        let palette = palette();
        assert_eq!(palette.get(1), Some(Rgba::opaque(0, 255, 0)));
        assert_eq!(palette.get(TRANSPARENT), None);
        assert_eq!(palette.get(4), None);
        assert!(palette.is_valid_index(TRANSPARENT));
        assert!(palette.is_valid_index(3));
        assert!(!palette.is_valid_index(4));
    }

    #[test]
    fn test_nearest_exact_match() {
        let palette = palette();
        for (i, color) in palette.colors().iter().enumerate() {
            assert_eq!(palette.nearest(*color), i as u8);
        }
    }

    #[test]
    fn test_nearest_transparent() {
        let palette = palette();
        assert_eq!(palette.nearest(Rgba([10, 10, 10, 0])), TRANSPARENT);
        assert_eq!(palette.nearest(Rgba([250, 5, 5, 255])), 0);
    }

    #[test]
    fn test_nearest_tie_prefers_lower_index() {
        // (1, 0, 0) is exactly one step away from both entries.
        let tie = Palette::from_hex(["020000", "000000"]).unwrap();
        assert_eq!(tie.nearest(Rgba::opaque(1, 0, 0)), 0);

        let swapped = Palette::from_hex(["000000", "020000"]).unwrap();
        assert_eq!(swapped.nearest(Rgba::opaque(1, 0, 0)), 0);
    }

    #[test]
    fn test_too_many_colors() {
        let colors = (0..256u32)
            .map(|i| Rgba::opaque((i % 256) as u8, (i / 256) as u8, 7))
            .collect::<Vec<_>>();
        assert!(Palette::new(colors).is_err());
    }
}
