//! Paint colors and the "leave as-is" sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for parsing hex color strings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseColorError {
    /// Hex string has invalid length (must be 3 or 6 characters after stripping '#')
    #[error("invalid hex color length (expected 3 or 6 characters)")]
    InvalidLength,
    /// Character that is not a hexadecimal digit
    #[error("invalid hex character: {0:?}")]
    InvalidHex(char),
}

/// An 8-bit device RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as floats in 0..=255.
    #[inline]
    pub fn to_f32(self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Parse `#rgb`, `#rrggbb`, `rgb` or `rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let nibbles = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8).ok_or(ParseColorError::InvalidHex(c)))
            .collect::<Result<Vec<u8>, _>>()?;
        match *nibbles.as_slice() {
            [r, g, b] => Ok(Rgb::new(r * 17, g * 17, b * 17)),
            [r1, r2, g1, g2, b1, b2] => Ok(Rgb::new(r1 << 4 | r2, g1 << 4 | g2, b1 << 4 | b2)),
            _ => Err(ParseColorError::InvalidLength),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// The color a subject should be painted.
///
/// `"transparent"` and `"#ffffff"` both mean "leave the photo as-is" and map
/// to [`TargetColor::NoTint`]; white is never a paint color.
///
/// # Example
///
/// ```
/// use factory_tint::{Rgb, TargetColor};
///
/// assert_eq!("transparent".parse::<TargetColor>().unwrap(), TargetColor::NoTint);
/// assert_eq!("#FFFFFF".parse::<TargetColor>().unwrap(), TargetColor::NoTint);
/// assert_eq!(
///     "#CC0000".parse::<TargetColor>().unwrap(),
///     TargetColor::Paint(Rgb::new(0xCC, 0, 0))
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetColor {
    #[default]
    NoTint,
    Paint(Rgb),
}

impl TargetColor {
    #[inline]
    pub fn is_no_tint(self) -> bool {
        matches!(self, TargetColor::NoTint)
    }

    /// The paint color, if any.
    #[inline]
    pub fn paint(self) -> Option<Rgb> {
        match self {
            TargetColor::NoTint => None,
            TargetColor::Paint(rgb) => Some(rgb),
        }
    }
}

impl From<Rgb> for TargetColor {
    fn from(rgb: Rgb) -> Self {
        if rgb == Rgb::WHITE {
            TargetColor::NoTint
        } else {
            TargetColor::Paint(rgb)
        }
    }
}

impl FromStr for TargetColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("transparent") {
            return Ok(TargetColor::NoTint);
        }
        trimmed.parse::<Rgb>().map(TargetColor::from)
    }
}

impl fmt::Display for TargetColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetColor::NoTint => f.write_str("transparent"),
            TargetColor::Paint(rgb) => write!(f, "{rgb}"),
        }
    }
}
