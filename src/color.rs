//! Color Resolver
//!
//! Hex color strings are checked once when a request is deserialized;
//! resolving a parsed [`HexColor`] can no longer fail.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);
    pub const BLUE: Rgb = Rgb([0, 0, 255]);

    pub fn is_black(&self) -> bool {
        *self == Self::BLACK
    }

    /// Linear interpolation, `t` clamped to [0, 1]
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mut out = [0u8; 3];
        for (i, channel) in out.iter_mut().enumerate() {
            let a = f64::from(self.0[i]);
            let b = f64::from(other.0[i]);
            *channel = (a + (b - a) * t).round() as u8;
        }
        Rgb(out)
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(c: Rgb) -> Self {
        image::Rgb(c.0)
    }
}

/// A validated `#rgb` / `#rrggbb` color (leading `#` optional)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidHexColor(pub String);

impl fmt::Display for InvalidHexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid hex color '{}': expected #RGB or #RRGGBB", self.0)
    }
}

impl std::error::Error for InvalidHexColor {}

impl HexColor {
    pub fn parse(s: &str) -> Result<Self, InvalidHexColor> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        let well_formed = matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit());
        if !well_formed {
            return Err(InvalidHexColor(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Resolve to RGB, expanding the three-digit form by digit duplication
    pub fn resolve(&self) -> Rgb {
        resolve(&self.0)
    }
}

/// Resolve a color string that has already passed [`HexColor::parse`].
fn resolve(hex: &str) -> Rgb {
    let digits = hex.trim_start_matches('#');
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).unwrap_or(0);
    Rgb([channel(0), channel(2), channel(4)])
}

impl FromStr for HexColor {
    type Err = InvalidHexColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = InvalidHexColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(c: HexColor) -> Self {
        c.0
    }
}

/// Resolve an optional color or fall back to `default`
pub fn resolve_or(color: Option<&HexColor>, default: Rgb) -> Rgb {
    color.map(HexColor::resolve).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(s: &str) -> Rgb {
        HexColor::parse(s).unwrap().resolve()
    }

    #[test]
    fn test_short_form_expands() {
        assert_eq!(rgb("#abc"), rgb("#aabbcc"));
        assert_eq!(rgb("abc"), rgb("#AABBCC"));
        assert_eq!(rgb("#f00"), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_long_form() {
        assert_eq!(rgb("#1e90ff"), Rgb([0x1e, 0x90, 0xff]));
        assert_eq!(rgb("000000"), Rgb::BLACK);
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", "#", "#12", "#1234", "#gggggg", "##abc", "#abcdef0", "rgb(0,0,0)"] {
            assert!(HexColor::parse(bad).is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: HexColor = serde_json::from_str(r##""#fff""##).unwrap();
        assert_eq!(ok.resolve(), Rgb::WHITE);
        assert!(serde_json::from_str::<HexColor>(r##""#ffff""##).is_err());
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(Rgb::BLACK.lerp(Rgb::WHITE, 0.0), Rgb::BLACK);
        assert_eq!(Rgb::BLACK.lerp(Rgb::WHITE, 1.0), Rgb::WHITE);
        assert_eq!(Rgb::BLACK.lerp(Rgb::BLUE, 0.5), Rgb([0, 0, 128]));
    }
}
