use derive_more::{Deref, From, Into};
use palette::Srgb;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Luminance above which text drawn on a color should be black.
pub const CONTRAST_THRESHOLD: f64 = 0.6;

/// An opaque sRGB color, written as `#RRGGBB` in session files.
#[derive(Debug, Clone, Copy, PartialEq, Deref, From, Into, SerializeDisplay, DeserializeFromStr)]
pub struct Rgb(Srgb<u8>);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid color '{0}': expected #RGB, #RRGGBB, black or white")]
pub struct InvalidColor(String);

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self(Srgb::new(red, green, blue))
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::new(0xFF, 0xFF, 0xFF)
    }

    /// Relative luminance over channels normalized to `[0, 1]`.
    pub fn luminance(&self) -> f64 {
        let c = self.0.into_format::<f64>();
        0.2126 * c.red + 0.7152 * c.green + 0.0722 * c.blue
    }

    /// Black or white, whichever reads better on top of `self`.
    pub fn contrast_text(&self) -> Self {
        if self.luminance() > CONTRAST_THRESHOLD {
            Self::black()
        } else {
            Self::white()
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl FromStr for Rgb {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "black" => return Ok(Self::black()),
            "white" => return Ok(Self::white()),
            _ => {}
        }
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !matches!(hex.len(), 3 | 6) {
            return Err(InvalidColor(s.to_string()));
        }
        hex.parse::<Srgb<u8>>()
            .map(Self)
            .map_err(|_| InvalidColor(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parsing() {
        let cases = [
            ("#FF0000", Rgb::new(255, 0, 0)),
            ("#ff0000", Rgb::new(255, 0, 0)),
            ("00ff00", Rgb::new(0, 255, 0)),
            ("#abc", Rgb::new(0xAA, 0xBB, 0xCC)),
            ("White", Rgb::white()),
            (" black ", Rgb::black()),
        ];
        for (input, expected) in cases {
            assert_eq!(input.parse::<Rgb>().unwrap(), expected, "{input}");
        }
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("chartreuse".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_display_is_uppercase_hex() {
        assert_eq!(Rgb::new(0x2E, 0x86, 0xDE).to_string(), "#2E86DE");
    }

    #[test]
    fn test_contrast_text() {
        assert_eq!(Rgb::white().contrast_text(), Rgb::black());
        assert_eq!(Rgb::black().contrast_text(), Rgb::white());
        // pure red sits at 0.2126, well under the threshold
        assert_eq!(Rgb::new(255, 0, 0).contrast_text(), Rgb::white());
        // gold is bright enough for black text
        assert_eq!(Rgb::new(0xF1, 0xC4, 0x0F).contrast_text(), Rgb::black());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Rgb::new(1, 2, 3)).unwrap();
        assert_eq!(json, "\"#010203\"");
        let back: Rgb = serde_json::from_str("\"#e74c3c\"").unwrap();
        assert_eq!(back, Rgb::new(0xE7, 0x4C, 0x3C));
    }
}
