//! Serializable RGBA color used for style state.

use peniko::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::style::AttributeError;

/// RGBA8 color with straight alpha.
///
/// Style setters compare colors for equality, so the model keeps exact
/// 8-bit channels rather than float components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbaColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl RgbaColor {
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Build from a packed `0xAARRGGBB` value.
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Pack into `0xAARRGGBB`.
    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// True only for the all-zero color, not for every alpha-0 color.
    pub fn is_transparent(self) -> bool {
        self == Self::TRANSPARENT
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parse `#RGB`, `#RRGGBB` or `#AARRGGBB`.
    pub fn parse(s: &str) -> Result<Self, AttributeError> {
        let invalid = || AttributeError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let nibble = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| invalid())
                };
                Ok(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::new(byte(2)?, byte(4)?, byte(6)?, byte(0)?)),
            _ => Err(invalid()),
        }
    }

    /// Format as `#AARRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:08X}", self.to_argb())
    }
}

impl Default for RgbaColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<Color> for RgbaColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<RgbaColor> for Color {
    fn from(color: RgbaColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

impl Serialize for RgbaColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RgbaColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_argb() {
        let c = RgbaColor::parse("#80FF0010").unwrap();
        assert_eq!(c, RgbaColor::new(255, 0, 16, 128));
    }

    #[test]
    fn test_parse_rgb_forms() {
        assert_eq!(RgbaColor::parse("#ff8800").unwrap(), RgbaColor::rgb(255, 136, 0));
        assert_eq!(RgbaColor::parse("#fff").unwrap(), RgbaColor::WHITE);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(RgbaColor::parse("ff0000").is_err());
        assert!(RgbaColor::parse("#12345").is_err());
        assert!(RgbaColor::parse("#gg0000").is_err());
    }

    #[test]
    fn test_argb_packing() {
        let c = RgbaColor::from_argb(0xFF336699);
        assert_eq!(c, RgbaColor::rgb(0x33, 0x66, 0x99));
        assert_eq!(c.to_argb(), 0xFF336699);
        assert_eq!(c.to_hex(), "#FF336699");
    }

    #[test]
    fn test_transparent_is_exact() {
        assert!(RgbaColor::TRANSPARENT.is_transparent());
        assert!(!RgbaColor::new(255, 255, 255, 0).is_transparent());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&RgbaColor::BLACK).unwrap();
        assert_eq!(json, "\"#FF000000\"");
        let back: RgbaColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RgbaColor::BLACK);
    }
}
