use nannou::color::{Srgba, srgba};

use crate::core::util::lerp;

/// An 8-bit straight-alpha color as it appears in palettes and persisted
/// records (`#rrggbb` or `#rrggbbaa`).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

pub const WHITE: HexColor = HexColor::rgb(255, 255, 255);

impl HexColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn parse(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();

        match digits.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(
                channel(0)?,
                channel(2)?,
                channel(4)?,
                channel(6)?,
            )),
            _ => None,
        }
    }

    /// Like [`HexColor::parse`] but never fails; unreadable input becomes
    /// opaque black.
    pub fn parse_or_black(hex: &str) -> Self {
        Self::parse(hex).unwrap_or(Self::rgb(0, 0, 0))
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Multiply alpha by `factor` (clamped to `0..=1`)
    pub fn fade(&self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        Self {
            a: (self.a as f32 * factor).round() as u8,
            ..*self
        }
    }

    pub fn with_alpha(&self, a: u8) -> Self {
        Self { a, ..*self }
    }

    pub fn lerp(&self, other: &HexColor, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| lerp(a as f32, b as f32, t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    pub fn to_srgba(&self) -> Srgba {
        srgba(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        )
    }

    pub fn to_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Parse a whole palette at once, skipping malformed entries
pub fn palette(hexes: &[&str]) -> Vec<HexColor> {
    hexes.iter().filter_map(|hex| HexColor::parse(hex)).collect()
}
