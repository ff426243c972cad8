use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Straight (non-premultiplied) 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }
}

impl FromStr for Rgba {
    type Err = Error;

    /// Accepts `#rgb`, `#rrggbb` and `#rrggbbaa` (the `#` is optional).
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || Error::InvalidColor(s.to_string());
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
                Ok(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Ok(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 0xff {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    /// Word colors; each placed word picks one uniformly at random.
    pub colors: Vec<Rgba>,
    pub background: Rgba,
    /// Stroke color for the debug overlay.
    pub debug_stroke: Rgba,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            colors: vec![
                Rgba::rgb(0x1b, 0x1b, 0x1b),
                Rgba::rgb(0x48, 0x48, 0x4b),
                Rgba::rgb(0x59, 0x3a, 0xee),
                Rgba::rgb(0x65, 0xcd, 0xfa),
                Rgba::rgb(0x70, 0xd6, 0xbf),
            ],
            background: Rgba::WHITE,
            debug_stroke: Rgba::rgb(0xe0, 0x3c, 0x31),
        }
    }

    pub fn monochrome() -> Self {
        Self {
            colors: vec![Rgba::BLACK],
            background: Rgba::WHITE,
            debug_stroke: Rgba::rgb(0xe0, 0x3c, 0x31),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!("#1b1b1b".parse::<Rgba>().unwrap(), Rgba::rgb(0x1b, 0x1b, 0x1b));
        assert_eq!("fff".parse::<Rgba>().unwrap(), Rgba::WHITE);
        assert_eq!(
            "#00000000".parse::<Rgba>().unwrap(),
            Rgba::TRANSPARENT
        );
    }

    #[test]
    fn rejects_malformed_colors() {
        assert!("#12345".parse::<Rgba>().is_err());
        assert!("#gggggg".parse::<Rgba>().is_err());
        assert!("".parse::<Rgba>().is_err());
    }

    #[test]
    fn display_round_trips_through_serde() {
        let color = Rgba::new(0x59, 0x3a, 0xee, 0x80);
        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, "\"#593aee80\"");
        let back: Rgba = serde_json::from_str(&json).unwrap();
        assert_eq!(back, color);
    }
}
