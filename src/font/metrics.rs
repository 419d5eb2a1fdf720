//! Advance widths for the standard Helvetica faces, from the Adobe AFM files.
//!
//! Widths are in 1/1000 em for the printable ASCII range `0x20..=0x7E`.
//! Characters outside the table fall back to [`non_ascii_width`].

/// Width table for one standard font face.
pub struct StandardFontMetrics {
    ascii: &'static [u16; 95],
}

#[rustfmt::skip]
static HELVETICA: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A-Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a-z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

pub(crate) static HELVETICA_METRICS: StandardFontMetrics = StandardFontMetrics { ascii: &HELVETICA };
pub(crate) static HELVETICA_BOLD_METRICS: StandardFontMetrics = StandardFontMetrics {
    ascii: &HELVETICA_BOLD,
};

/// Widths shared by both faces for the WinAnsi punctuation the report uses.
fn non_ascii_width(ch: char) -> u16 {
    match ch {
        '\u{2014}' => 1000, // em dash
        '\u{2013}' => 556,  // en dash
        '\u{00B7}' => 278,  // middle dot
        '\u{2022}' => 350,  // bullet
        '\u{2026}' => 1000, // ellipsis
        '\u{00B0}' => 400,  // degree
        _ => 556,
    }
}

impl StandardFontMetrics {
    /// Advance width of `ch` in 1/1000 em.
    pub fn glyph_width(&self, ch: char) -> u16 {
        let code = ch as u32;
        if (0x20..=0x7E).contains(&code) {
            self.ascii[(code - 0x20) as usize]
        } else {
            non_ascii_width(ch)
        }
    }

    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.glyph_width(ch) as f64 / 1000.0 * font_size
    }

    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}
