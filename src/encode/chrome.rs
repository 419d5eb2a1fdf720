//! Header and footer drawn on every page.

use crate::config::{mm, Edges};
use crate::font::FontSpec;
use crate::layout::{Page, PageChrome, PageNumber};
use crate::style::palette;
use crate::text::TextLayout;

use super::widgets::{rect, text};

const HEADER_BAR: f64 = 28.0;
const ACCENT_STRIPE: f64 = 1.5;
const FOOTER_BAND: f64 = 12.0;

/// The report's page chrome. Strings are fixed when the build starts, so
/// every page header is identical.
#[derive(Debug, Clone)]
pub struct ReportChrome {
    pub brand: String,
    pub tagline: String,
    /// Source file shown in the header, or "Unknown".
    pub file_label: String,
    /// Pre-formatted generation time.
    pub generated: String,
    pub footer_note: String,
    pub margin: Edges,
}

impl PageChrome for ReportChrome {
    fn draw_header(&self, page: &mut Page, text_layout: &TextLayout) -> f64 {
        let left = self.margin.left;
        let right = page.width - self.margin.right;

        page.push(rect(0.0, 0.0, page.width, mm(HEADER_BAR), palette::DARK));
        page.push(rect(0.0, mm(HEADER_BAR), page.width, mm(ACCENT_STRIPE), palette::PRIMARY));

        page.push(text(left, mm(12.0), self.brand.clone(), FontSpec::bold(16.0), palette::PRIMARY));
        page.push(text(left, mm(19.0), self.tagline.clone(), FontSpec::regular(8.0), palette::SUBTEXT));

        // Keep the file name clear of the right-aligned timestamp.
        let stamp_font = FontSpec::regular(7.0);
        let generated = format!("Generated: {}", self.generated);
        let stamp_width = text_layout.measure_width(&generated, stamp_font);
        let file_font = FontSpec::regular(7.5);
        let file_line = text_layout.fit_to_width(
            &format!("File: {}", self.file_label),
            file_font,
            (right - stamp_width - mm(6.0) - left).max(0.0),
        );
        page.push(text(left, mm(24.0), file_line, file_font, palette::SUBTEXT));
        page.push(text(right - stamp_width, mm(24.0), generated, stamp_font, palette::SUBTEXT));

        mm(HEADER_BAR + ACCENT_STRIPE)
    }

    fn draw_footer(&self, page: &mut Page, number: PageNumber, text_layout: &TextLayout) {
        let band_top = page.height - mm(FOOTER_BAND);
        let baseline = page.height - mm(4.5);
        let font = FontSpec::regular(7.0);

        page.push(rect(0.0, band_top, page.width, mm(FOOTER_BAND), palette::BORDER));
        page.push(text(self.margin.left, baseline, self.footer_note.clone(), font, palette::SUBTEXT));

        let label = format!("Page {} of {}", number.index, number.total);
        let width = text_layout.measure_width(&label, font);
        page.push(text(page.width - self.margin.right - width, baseline, label, font, palette::SUBTEXT));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::layout::{DrawCommand, LayoutEngine};

    fn chrome(file_label: &str) -> ReportChrome {
        ReportChrome {
            brand: "PharmaGuard".to_string(),
            tagline: "Pharmacogenomic Risk Analysis Report".to_string(),
            file_label: file_label.to_string(),
            generated: "2026-02-19 10:15 UTC".to_string(),
            footer_note: "For clinical use only".to_string(),
            margin: PageConfig::default().margin,
        }
    }

    #[test]
    fn header_reports_content_start_below_accent() {
        let config = PageConfig::default();
        let mut engine = LayoutEngine::new(&config, Box::new(chrome("sample.vcf")));
        let start = engine.begin_document().unwrap();
        assert!((start - mm(38.0)).abs() < 1e-9);

        let doc = engine.finish().unwrap();
        let page = &doc.pages[0];
        assert!(page.contains_text("PharmaGuard"));
        assert!(page.contains_text("File: sample.vcf"));
        assert!(page.contains_text("Generated: 2026-02-19 10:15 UTC"));
        assert!(page.contains_text("Page 1 of 1"));
    }

    #[test]
    fn footer_band_is_filled_with_border_color() {
        let config = PageConfig::default();
        let mut engine = LayoutEngine::new(&config, Box::new(chrome("sample.vcf")));
        engine.begin_document().unwrap();
        let doc = engine.finish().unwrap();
        let page = &doc.pages[0];
        let band_top = page.height - mm(FOOTER_BAND);
        let bands: Vec<_> = page
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rect { y, height, fill, .. } if (*y - band_top).abs() < 1e-9 => Some((*height, *fill)),
                _ => None,
            })
            .collect();
        assert_eq!(bands, vec![(mm(FOOTER_BAND), Some(palette::BORDER))]);
    }

    #[test]
    fn long_file_name_is_truncated_before_timestamp() {
        let config = PageConfig::default();
        let long = "a".repeat(400);
        let mut engine = LayoutEngine::new(&config, Box::new(chrome(&long)));
        engine.begin_document().unwrap();
        let doc = engine.finish().unwrap();
        let file_line = doc.pages[0]
            .commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::Text { text, .. } if text.starts_with("File: ") => Some(text.clone()),
                _ => None,
            })
            .unwrap();
        assert!(file_line.ends_with('\u{2026}'));
        assert!(file_line.len() < long.len());
    }
}
