//! # Colors
//!
//! Report colors are plain 8-bit RGB triples. The palette reproduces the dark
//! dashboard look of the web client the report accompanies, so the printed
//! document and the on-screen panels read as the same product.

use serde::{Deserialize, Serialize};

/// An opaque sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Apply `f` to each channel, clamping the result into `0..=255`.
    pub fn map_channels(self, f: impl Fn(f64) -> f64) -> Self {
        let apply = |c: u8| f(c as f64).round().clamp(0.0, 255.0) as u8;
        Self::rgb(apply(self.r), apply(self.g), apply(self.b))
    }

    /// Channels as PDF color-operator operands (0.0 - 1.0).
    pub fn components(&self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }
}

/// The fixed report palette.
pub mod palette {
    use super::Color;

    pub const PRIMARY: Color = Color::rgb(0, 188, 212);
    pub const DARK: Color = Color::rgb(10, 12, 16);
    pub const SURFACE: Color = Color::rgb(17, 19, 26);
    pub const BORDER: Color = Color::rgb(55, 65, 81);
    pub const TEXT: Color = Color::rgb(226, 232, 240);
    pub const SUBTEXT: Color = Color::rgb(156, 163, 175);

    pub const SAFE: Color = Color::rgb(34, 197, 94);
    pub const LIME: Color = Color::rgb(132, 204, 22);
    pub const ADJUST: Color = Color::rgb(234, 179, 8);
    pub const TOXIC: Color = Color::rgb(239, 68, 68);
    pub const INEFFECTIVE: Color = Color::rgb(249, 115, 22);
    pub const UNKNOWN: Color = Color::rgb(107, 114, 128);

    /// Section title bar and table header background.
    pub const TITLE_BAR: Color = Color::rgb(30, 35, 48);
    /// Even zebra stripe for summary rows.
    pub const ROW_EVEN: Color = Color::rgb(20, 24, 33);
    /// Even zebra stripe for table data rows.
    pub const TABLE_ROW_EVEN: Color = Color::rgb(18, 22, 30);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_channels_clamps() {
        let c = Color::rgb(200, 10, 0).map_channels(|c| c * 2.0 - 30.0);
        assert_eq!(c, Color::rgb(255, 0, 0));
    }

    #[test]
    fn components_are_unit_range() {
        let (r, g, b) = Color::rgb(255, 255, 255).components();
        assert_eq!((r, g, b), (1.0, 1.0, 1.0));
    }
}
