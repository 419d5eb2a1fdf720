//! # Text Layout
//!
//! Line breaking and width fitting for report text.
//!
//! Break opportunities come from UAX#14, so paragraphs wrap at spaces and
//! hyphens and honor explicit newlines. A single word wider than the column is
//! broken between characters rather than overflowing the page edge.

use crate::font::{FontContext, FontSpec};
use unicode_linebreak::{linebreaks, BreakOpportunity};

const ELLIPSIS: char = '\u{2026}';

/// Greedy line breaker over a [`FontContext`].
#[derive(Debug, Default, Clone)]
pub struct TextLayout {
    fonts: FontContext,
}

impl TextLayout {
    pub fn new(fonts: FontContext) -> Self {
        Self { fonts }
    }

    /// Width of `text` ignoring trailing whitespace.
    fn visible_width(&self, text: &str, spec: FontSpec) -> f64 {
        self.fonts.measure_string(text.trim_end(), spec)
    }

    /// Break `text` into lines no wider than `max_width` points.
    pub fn break_into_lines(&self, text: &str, spec: FontSpec, max_width: f64) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut lines = Vec::new();
        let mut current = String::new();
        let mut start = 0;

        for (end, opportunity) in linebreaks(text) {
            let segment = &text[start..end];
            start = end;

            if !current.is_empty() {
                let candidate = format!("{current}{segment}");
                if self.visible_width(&candidate, spec) > max_width {
                    lines.push(current.trim_end().to_string());
                    current.clear();
                }
            }

            if current.is_empty() && self.visible_width(segment, spec) > max_width {
                let (full, rest) = self.split_overlong(segment, spec, max_width);
                lines.extend(full);
                current = rest;
            } else {
                current.push_str(segment);
            }

            if opportunity == BreakOpportunity::Mandatory {
                lines.push(current.trim_end().to_string());
                current.clear();
            }
        }

        if !current.trim_end().is_empty() {
            lines.push(current.trim_end().to_string());
        }

        lines
    }

    /// Hard-split a segment with no break opportunity inside it. Returns the
    /// full lines and the unfinished remainder.
    fn split_overlong(&self, segment: &str, spec: FontSpec, max_width: f64) -> (Vec<String>, String) {
        let mut full = Vec::new();
        let mut line = String::new();
        let mut width = 0.0;

        for ch in segment.chars() {
            let w = self.fonts.char_width(ch, spec);
            if !line.is_empty() && !ch.is_whitespace() && width + w > max_width {
                full.push(std::mem::take(&mut line));
                width = 0.0;
            }
            line.push(ch);
            width += w;
        }

        (full, line)
    }

    /// Shorten `text` with a trailing ellipsis so it fits in `max_width`.
    pub fn fit_to_width(&self, text: &str, spec: FontSpec, max_width: f64) -> String {
        if self.fonts.measure_string(text, spec) <= max_width {
            return text.to_string();
        }

        let budget = max_width - self.fonts.char_width(ELLIPSIS, spec);
        let mut fitted = String::new();
        let mut width = 0.0;
        for ch in text.chars() {
            let w = self.fonts.char_width(ch, spec);
            if width + w > budget {
                break;
            }
            fitted.push(ch);
            width += w;
        }

        let mut fitted = fitted.trim_end().to_string();
        fitted.push(ELLIPSIS);
        fitted
    }

    pub fn measure_width(&self, text: &str, spec: FontSpec) -> f64 {
        self.fonts.measure_string(text, spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> TextLayout {
        TextLayout::new(FontContext::new())
    }

    const SPEC: FontSpec = FontSpec::regular(10.0);

    #[test]
    fn test_single_line() {
        let lines = layout().break_into_lines("Hello, World!", SPEC, 500.0);
        assert_eq!(lines, vec!["Hello, World!"]);
    }

    #[test]
    fn test_line_break_at_space() {
        let text = "CYP2C9 poor metabolizers require a reduced starting dose";
        let lines = layout().break_into_lines(text, SPEC, 120.0);
        assert!(lines.len() > 1, "Should wrap: {lines:?}");
        for line in &lines {
            assert!(layout().measure_width(line, SPEC) <= 120.0, "Too wide: {line}");
            assert!(!line.ends_with(' '));
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_explicit_newline() {
        let lines = layout().break_into_lines("first\n\nthird", SPEC, 500.0);
        assert_eq!(lines, vec!["first", "", "third"]);
    }

    #[test]
    fn test_empty_string() {
        assert!(layout().break_into_lines("", SPEC, 100.0).is_empty());
    }

    #[test]
    fn test_overlong_word_is_force_broken() {
        let word = "A".repeat(60);
        let lines = layout().break_into_lines(&word, SPEC, 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(layout().measure_width(line, SPEC) <= 50.0);
        }
    }

    #[test]
    fn test_fit_to_width_untouched_when_short() {
        assert_eq!(layout().fit_to_width("rs4244285", SPEC, 200.0), "rs4244285");
    }

    #[test]
    fn test_fit_to_width_adds_ellipsis() {
        let fitted = layout().fit_to_width("likely_pathogenic variant of uncertain origin", SPEC, 60.0);
        assert!(fitted.ends_with(ELLIPSIS));
        assert!(layout().measure_width(&fitted, SPEC) <= 60.0);
    }
}
