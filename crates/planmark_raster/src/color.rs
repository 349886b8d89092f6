//! RGBA color type and hex conversions.
//!
//! Colors travel through the editor as hex strings (`#ADD8E6`); this module
//! converts them to channel values for pixel work and back for display.

use std::fmt;
use std::str::FromStr;

use crate::error::RasterError;

/// An 8-bit-per-channel RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn from_slice(px: &[u8]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Same color, fully opaque.
    pub fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }

    /// Check whether every RGB channel is within `tolerance` of `other`.
    /// Alpha is ignored.
    pub fn rgb_within(&self, other: &Rgba, tolerance: u8) -> bool {
        self.r.abs_diff(other.r) <= tolerance
            && self.g.abs_diff(other.g) <= tolerance
            && self.b.abs_diff(other.b) <= tolerance
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`. The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Result<Self, RasterError> {
        let clean = hex.trim().trim_start_matches('#');
        let invalid = || RasterError::InvalidColor(hex.to_string());

        if !(clean.len() == 6 || clean.len() == 8) || !clean.is_ascii() {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&clean[i..i + 2], 16).map_err(|_| invalid());
        let alpha = if clean.len() == 8 { channel(6)? } else { 255 };

        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    /// Format as uppercase `#RRGGBB`, or `#RRGGBBAA` when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Rgba {
    type Err = RasterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_hash() {
        assert_eq!(Rgba::from_hex("#ADD8E6").unwrap(), Rgba::rgb(173, 216, 230));
        assert_eq!(Rgba::from_hex("add8e6").unwrap(), Rgba::rgb(173, 216, 230));
    }

    #[test]
    fn test_parse_with_alpha() {
        assert_eq!(
            Rgba::from_hex("#FF000080").unwrap(),
            Rgba::new(255, 0, 0, 128)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Rgba::from_hex("#FFF").is_err());
        assert!(Rgba::from_hex("#GG0000").is_err());
        assert!(Rgba::from_hex("").is_err());
        assert!(Rgba::from_hex("#ééé").is_err());
    }

    #[test]
    fn test_hex_formatting() {
        assert_eq!(Rgba::rgb(173, 216, 230).to_hex(), "#ADD8E6");
        assert_eq!(Rgba::new(1, 2, 3, 4).to_string(), "#01020304");
    }

    #[test]
    fn test_rgb_within_ignores_alpha() {
        let a = Rgba::new(100, 100, 100, 0);
        let b = Rgba::new(105, 95, 100, 255);
        assert!(a.rgb_within(&b, 5));
        assert!(!a.rgb_within(&b, 4));
    }
}
