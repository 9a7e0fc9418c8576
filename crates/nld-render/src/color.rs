//! Colours and the tty palette
//!
//! Colours are stored as RGB triples and read/written as `#rrggbb` strings so
//! palettes can be edited in JSON configuration files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::NUM_COLORS;
use crate::error::RenderError;

/// A 24-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` string (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, RenderError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(RenderError::InvalidColor(hex.to_string()));
        }
        let value = u32::from_str_radix(digits, 16)
            .map_err(|_| RenderError::InvalidColor(hex.to_string()))?;
        Ok(Self::new(
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgb(self) -> image::Rgb<u8> {
        image::Rgb([self.r, self.g, self.b])
    }

    /// Linear interpolation towards `other`, `t` in `[0, 1]`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = RenderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

/// The 16 tty colours, dark (0-7) then bright (8-15).
pub const DEFAULT_FOREGROUND: [Color; NUM_COLORS] = [
    // Dark
    Color::new(0x00, 0x00, 0x00),
    Color::new(0x77, 0x00, 0x00),
    Color::new(0x00, 0x77, 0x00),
    Color::new(0xaa, 0x77, 0x00),
    Color::new(0x00, 0x00, 0x77),
    Color::new(0xaa, 0x00, 0xaa),
    Color::new(0x00, 0xaa, 0xaa),
    Color::new(0xff, 0xff, 0xff),
    // Bright
    Color::new(0x88, 0x88, 0x88),
    Color::new(0xff, 0x00, 0x00),
    Color::new(0x00, 0xff, 0x00),
    Color::new(0xff, 0xff, 0x00),
    Color::new(0x00, 0x00, 0xff),
    Color::new(0xff, 0x00, 0xff),
    Color::new(0x00, 0xff, 0xff),
    Color::new(0xff, 0xff, 0xff),
];

/// Background of the cell under the cursor.
pub const DEFAULT_CURSOR: Color = Color::new(0x55, 0x55, 0x55);

/// Colour table used to resolve tty colour indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Colours for indices 0..16, used for both foreground and background.
    pub colors: [Color; NUM_COLORS],
    /// Background painted under the cursor.
    pub cursor: Color,
}

impl Palette {
    /// Look up a tty colour index. `None` when the index is outside 0..16.
    pub fn get(&self, index: i32) -> Option<Color> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.colors.get(i))
            .copied()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_FOREGROUND,
            cursor: DEFAULT_CURSOR,
        }
    }
}
