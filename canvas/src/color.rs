//! RGB colors as used for fills, garment layers, and sampled inks.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

use serde::{Deserialize, Serialize};

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb` (leading `#` optional, case-insensitive).
    #[must_use]
    pub fn from_hex(raw: &str) -> Option<Self> {
        let digits = raw.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match digits.len() {
            3 => {
                let mut parts = digits.chars().map(|c| c.to_digit(16));
                let (Some(Some(r)), Some(Some(g)), Some(Some(b))) = (parts.next(), parts.next(), parts.next()) else {
                    return None;
                };
                Some(Self::new(expand_nibble(r), expand_nibble(g), expand_nibble(b)))
            }
            6 => {
                let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
                match (channel(0), channel(2), channel(4)) {
                    (Ok(r), Ok(g), Ok(b)) => Some(Self::new(r, g, b)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Lowercase `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Perceptual distance using the "redmean" weighting of Euclidean RGB.
    ///
    /// Ranges from `0.0` (identical) to roughly `765.0` (black vs white).
    #[must_use]
    pub fn distance(self, other: Rgb) -> f64 {
        let r_mean = (f64::from(self.r) + f64::from(other.r)) / 2.0;
        let dr = f64::from(self.r) - f64::from(other.r);
        let dg = f64::from(self.g) - f64::from(other.g);
        let db = f64::from(self.b) - f64::from(other.b);
        let wr = 2.0 + r_mean / 256.0;
        let wg = 4.0;
        let wb = 2.0 + (255.0 - r_mean) / 256.0;
        (wr * dr * dr + wg * dg * dg + wb * db * db).sqrt()
    }
}

fn expand_nibble(n: u32) -> u8 {
    // n is a single hex digit, so n * 17 <= 255.
    u8::try_from(n * 17).unwrap_or(u8::MAX)
}

/// Normalize a hex color string to lowercase `#rrggbb`.
#[must_use]
pub fn normalize_hex(raw: &str) -> Option<String> {
    Rgb::from_hex(raw).map(Rgb::to_hex)
}
