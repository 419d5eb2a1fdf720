//! # Font Management
//!
//! The report only uses the standard PDF Helvetica faces, which need no
//! embedding. Measurement uses the AFM advance widths so badge widths, wrapped
//! lines and right-aligned labels come out where the PDF viewer draws them.

pub mod metrics;

pub use metrics::StandardFontMetrics;
use serde::{Deserialize, Serialize};

/// The standard PDF fonts the report draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA_METRICS,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD_METRICS,
        }
    }
}

/// A font face at a size. Every text draw command carries one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub font: StandardFont,
    pub size: f64,
}

impl FontSpec {
    pub const fn regular(size: f64) -> Self {
        Self {
            font: StandardFont::Helvetica,
            size,
        }
    }

    pub const fn bold(size: f64) -> Self {
        Self {
            font: StandardFont::HelveticaBold,
            size,
        }
    }
}

/// Width lookups for the standard faces, shared by all text measurement.
#[derive(Debug, Default, Clone)]
pub struct FontContext;

impl FontContext {
    pub fn new() -> Self {
        Self
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, spec: FontSpec) -> f64 {
        spec.font.metrics().char_width(ch, spec.size)
    }

    /// Measure the width of a string in points.
    pub fn measure_string(&self, text: &str, spec: FontSpec) -> f64 {
        spec.font.metrics().measure_string(text, spec.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_context_helvetica() {
        let ctx = FontContext::new();
        let w = ctx.char_width(' ', FontSpec::regular(12.0));
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_font_context_bold_wider() {
        let ctx = FontContext::new();
        let regular = ctx.char_width('A', FontSpec::regular(12.0));
        let bold = ctx.char_width('A', FontSpec::bold(12.0));
        assert!(bold > regular, "Bold A should be wider than regular A");
    }

    #[test]
    fn test_font_context_measure_string() {
        let ctx = FontContext::new();
        // H(722) e(556) l(222) l(222) o(556) = 2278 / 1000 * 10
        let w = ctx.measure_string("Hello", FontSpec::regular(10.0));
        assert!((w - 22.78).abs() < 1e-9);
    }

    #[test]
    fn test_pdf_names() {
        assert_eq!(StandardFont::Helvetica.pdf_name(), "Helvetica");
        assert_eq!(StandardFont::HelveticaBold.pdf_name(), "Helvetica-Bold");
    }
}
