//! Recurring visual blocks drawn through the layout engine.
//!
//! Every block-level widget reserves its full height before it emits a single
//! command, so each one takes part in pagination on its own. Inline widgets
//! (badge, confidence bar) draw inside a block their caller already reserved.

use crate::config::mm;
use crate::error::RenderingFault;
use crate::font::FontSpec;
use crate::layout::{DrawCommand, LayoutEngine};
use crate::model::RiskLabel;
use crate::style::{palette, Color};

use super::colors::{badge_fill, confidence_color, confidence_percent, risk_color};

type Result<T> = std::result::Result<T, RenderingFault>;

pub(crate) fn rect(x: f64, y: f64, width: f64, height: f64, fill: Color) -> DrawCommand {
    DrawCommand::Rect {
        x,
        y,
        width,
        height,
        fill: Some(fill),
        stroke: None,
        radius: 0.0,
    }
}

pub(crate) fn text(x: f64, y: f64, content: impl Into<String>, font: FontSpec, color: Color) -> DrawCommand {
    DrawCommand::Text {
        x,
        y,
        text: content.into(),
        font,
        color,
    }
}

const BADGE_FONT: FontSpec = FontSpec::bold(8.0);

/// Draw a rounded risk pill with its text baseline at `baseline`.
/// Returns the pill width.
pub fn badge(engine: &mut LayoutEngine, label: RiskLabel, x: f64, baseline: f64) -> Result<f64> {
    let color = risk_color(label);
    let caption = label.as_str();
    let width = engine.text().measure_width(caption, BADGE_FONT) + mm(10.0);

    engine.draw(DrawCommand::Rect {
        x,
        y: baseline - mm(4.5),
        width,
        height: mm(7.0),
        fill: Some(badge_fill(color)),
        stroke: Some(color),
        radius: mm(2.0),
    })?;
    engine.draw(text(x + mm(5.0), baseline, caption, BADGE_FONT, color))?;
    Ok(width)
}

/// Draw a confidence track with a filled portion of `width * score`, and the
/// percentage after it.
pub fn confidence_bar(engine: &mut LayoutEngine, score: f64, x: f64, baseline: f64, width: f64) -> Result<()> {
    let score = score.clamp(0.0, 1.0);
    let color = confidence_color(score);
    let track = |w: f64, fill: Color| DrawCommand::Rect {
        x,
        y: baseline - mm(3.0),
        width: w,
        height: mm(4.0),
        fill: Some(fill),
        stroke: None,
        radius: mm(1.0),
    };

    engine.draw(track(width, palette::BORDER))?;
    if score > 0.0 {
        engine.draw(track(width * score, color))?;
    }
    engine.draw(text(
        x + width + mm(4.0),
        baseline,
        format!("{}%", confidence_percent(score)),
        FontSpec::bold(8.0),
        color,
    ))
}

const SECTION_BAR: f64 = 8.0;
const SECTION_GAP: f64 = 5.0;

/// Full-width section title bar with a left accent stripe. Returns the y
/// below it.
pub fn section_title(engine: &mut LayoutEngine, title: &str) -> Result<f64> {
    let floor = engine.default_floor();
    section_title_with_floor(engine, title, floor)
}

/// [`section_title`] that keeps `floor` clear below it, so the section does
/// not start at the very bottom of a page.
pub fn section_title_with_floor(engine: &mut LayoutEngine, title: &str, floor: f64) -> Result<f64> {
    let height = mm(SECTION_BAR + SECTION_GAP);
    let y = engine.reserve_with_floor(height, floor)?;
    let x = engine.geometry().content_left();
    let width = engine.geometry().content_width();

    engine.draw(rect(x, y, width, mm(SECTION_BAR), palette::TITLE_BAR))?;
    engine.draw(rect(x, y, mm(3.0), mm(SECTION_BAR), palette::PRIMARY))?;
    engine.draw(text(
        x + mm(7.0),
        y + mm(5.5),
        title.to_uppercase(),
        FontSpec::bold(9.0),
        palette::PRIMARY,
    ))?;
    engine.advance(height);
    Ok(engine.cursor())
}

/// Solid banner opening one drug's detail section.
pub fn banner(engine: &mut LayoutEngine, title: &str, floor: f64) -> Result<f64> {
    let height = mm(16.0);
    let y = engine.reserve_with_floor(height, floor)?;
    let x = engine.geometry().content_left();
    let width = engine.geometry().content_width();
    let font = FontSpec::bold(11.0);
    let title = engine.text().fit_to_width(title, font, width - mm(8.0));

    engine.draw(rect(x, y, width, mm(10.0), palette::PRIMARY))?;
    engine.draw(text(x + mm(4.0), y + mm(7.0), title, font, Color::BLACK))?;
    engine.advance(height);
    Ok(engine.cursor())
}

const LABEL_COLUMN: f64 = 42.0;
const ROW_FONT: FontSpec = FontSpec::regular(8.0);
const ROW_LABEL_FONT: FontSpec = FontSpec::bold(8.0);

/// `Label:` on the left and the value beside it. A long value wraps inside
/// its column and the whole row stays on one page, unless the row is taller
/// than an empty page. Then each value line after the first is its own block.
pub fn label_value_row(engine: &mut LayoutEngine, label: &str, value: &str) -> Result<f64> {
    let x = engine.geometry().content_left();
    let value_x = x + mm(LABEL_COLUMN);
    let value_width = engine.geometry().content_width() - mm(LABEL_COLUMN);

    let mut lines = engine.text().break_into_lines(value, ROW_FONT, value_width);
    if lines.is_empty() {
        lines.push(String::new());
    }
    let line_height = mm(4.5);
    let first_height = mm(6.0);
    let height = first_height + line_height * (lines.len() - 1) as f64;

    if engine.fits_on_empty_page(height, engine.default_floor()) {
        let y = engine.reserve(height)?;
        let baseline = y + mm(4.0);
        engine.draw(text(x, baseline, format!("{label}:"), ROW_LABEL_FONT, palette::SUBTEXT))?;
        for (i, line) in lines.into_iter().enumerate() {
            engine.draw(text(
                value_x,
                baseline + line_height * i as f64,
                line,
                ROW_FONT,
                palette::TEXT,
            ))?;
        }
        engine.advance(height);
        return Ok(engine.cursor());
    }

    // Taller than a page: the label keeps its first line, the rest flow line by line.
    let mut lines = lines.into_iter();
    let y = engine.reserve(first_height)?;
    engine.draw(text(x, y + mm(4.0), format!("{label}:"), ROW_LABEL_FONT, palette::SUBTEXT))?;
    if let Some(first) = lines.next() {
        engine.draw(text(value_x, y + mm(4.0), first, ROW_FONT, palette::TEXT))?;
    }
    engine.advance(first_height);
    for line in lines {
        let y = engine.reserve(line_height)?;
        engine.draw(text(value_x, y + mm(2.5), line, ROW_FONT, palette::TEXT))?;
        engine.advance(line_height);
    }
    Ok(engine.cursor())
}

/// A table column, positioned relative to the content's left edge.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub title: &'static str,
    pub offset: f64,
    pub width: f64,
    pub font_size: f64,
    /// Draw cell text in the accent color.
    pub accent: bool,
}

const TABLE_ROW: f64 = 7.0;
const TABLE_HEADER_GAP: f64 = 2.0;
/// Padding between a column's left edge and its text.
const CELL_INSET: f64 = 4.0;

fn row_height() -> f64 {
    mm(TABLE_ROW)
}

/// Table header row. Its floor also keeps room for the first data row, so a
/// header is never left alone at the bottom of a page.
pub fn table_header_row(engine: &mut LayoutEngine, columns: &[Column]) -> Result<f64> {
    let height = mm(TABLE_ROW + TABLE_HEADER_GAP);
    let floor = engine.default_floor() + row_height();
    let y = engine.reserve_with_floor(height, floor)?;
    let x = engine.geometry().content_left();
    let width = engine.geometry().content_width();
    let font = FontSpec::bold(7.5);

    engine.draw(rect(x, y, width, row_height(), palette::TITLE_BAR))?;
    for column in columns {
        let title = engine.text().fit_to_width(column.title, font, column.width - mm(CELL_INSET));
        engine.draw(text(x + column.offset + mm(CELL_INSET), y + mm(4.5), title, font, palette::PRIMARY))?;
    }
    engine.advance(height);
    Ok(engine.cursor())
}

/// One table data row with zebra striping. When the row will not fit, the
/// header is repeated at the top of the next page first.
pub fn table_data_row(engine: &mut LayoutEngine, columns: &[Column], cells: &[&str], zebra_index: usize) -> Result<f64> {
    let floor = engine.default_floor();
    if !engine.fits(row_height(), floor) {
        table_header_row(engine, columns)?;
    }

    let y = engine.reserve(row_height())?;
    let x = engine.geometry().content_left();
    let width = engine.geometry().content_width();
    let stripe = if zebra_index % 2 == 0 {
        palette::TABLE_ROW_EVEN
    } else {
        palette::SURFACE
    };

    engine.draw(rect(x, y, width, row_height(), stripe))?;
    for (column, cell) in columns.iter().zip(cells) {
        let font = FontSpec::regular(column.font_size);
        let color = if column.accent { palette::PRIMARY } else { palette::TEXT };
        let cell = engine.text().fit_to_width(cell, font, column.width - mm(CELL_INSET));
        engine.draw(text(x + column.offset + mm(CELL_INSET), y + mm(4.5), cell, font, color))?;
    }
    engine.advance(row_height());
    Ok(engine.cursor())
}

/// Paragraph text in a given style.
#[derive(Debug, Clone, Copy)]
pub struct ParagraphStyle {
    pub font: FontSpec,
    pub color: Color,
    pub line_height: f64,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            font: FontSpec::regular(8.0),
            color: palette::SUBTEXT,
            line_height: mm(5.0),
        }
    }
}

/// Word-wrapped text. Each line is its own atomic block, so a long paragraph
/// flows onto the next page line by line.
pub fn wrapped_paragraph(engine: &mut LayoutEngine, content: &str, max_width: f64, style: ParagraphStyle) -> Result<f64> {
    let x = engine.geometry().content_left();
    let lines = engine.text().break_into_lines(content, style.font, max_width);
    for line in lines {
        let y = engine.reserve(style.line_height)?;
        if !line.is_empty() {
            engine.draw(text(x, y + style.line_height * 0.7, line, style.font, style.color))?;
        }
        engine.advance(style.line_height);
    }
    Ok(engine.cursor())
}

/// Thin full-width rule with trailing space.
pub fn divider(engine: &mut LayoutEngine) -> Result<f64> {
    let height = mm(0.5);
    let y = engine.reserve(height)?;
    let x = engine.geometry().content_left();
    let width = engine.geometry().content_width();
    engine.draw(rect(x, y, width, height, palette::BORDER))?;
    engine.advance(height + mm(10.0));
    Ok(engine.cursor())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::layout::{Page, PageChrome, PageNumber};
    use crate::text::TextLayout;

    struct Bare;

    impl PageChrome for Bare {
        fn draw_header(&self, _page: &mut Page, _text: &TextLayout) -> f64 {
            mm(29.5)
        }

        fn draw_footer(&self, _page: &mut Page, _number: PageNumber, _text: &TextLayout) {}
    }

    fn engine() -> LayoutEngine {
        let mut engine = LayoutEngine::new(&PageConfig::default(), Box::new(Bare));
        engine.begin_document().unwrap();
        engine
    }

    const COLUMNS: [Column; 2] = [
        Column { title: "rsID", offset: 0.0, width: 100.0, font_size: 7.5, accent: true },
        Column { title: "Gene", offset: 100.0, width: 100.0, font_size: 7.5, accent: false },
    ];

    #[test]
    fn badge_width_is_text_plus_padding() {
        let mut engine = engine();
        let width = badge(&mut engine, RiskLabel::Toxic, 50.0, 200.0).unwrap();
        let text_width = engine.text().measure_width("Toxic", BADGE_FONT);
        assert!((width - (text_width + mm(10.0))).abs() < 1e-9);

        let doc = engine.finish().unwrap();
        let commands = &doc.pages[0].commands;
        assert!(matches!(
            commands[0],
            DrawCommand::Rect { fill: Some(f), stroke: Some(s), .. }
                if f == badge_fill(palette::TOXIC) && s == palette::TOXIC
        ));
        assert!(matches!(&commands[1], DrawCommand::Text { text, color, .. } if text == "Toxic" && *color == palette::TOXIC));
    }

    #[test]
    fn confidence_bar_fill_is_proportional() {
        let mut engine = engine();
        confidence_bar(&mut engine, 0.5, 10.0, 100.0, 80.0).unwrap();
        let doc = engine.finish().unwrap();
        let widths: Vec<f64> = doc.pages[0]
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rect { width, .. } => Some(*width),
                _ => None,
            })
            .collect();
        assert_eq!(widths, vec![80.0, 40.0]);
        assert!(doc.pages[0].contains_text("50%"));
    }

    #[test]
    fn zero_confidence_draws_track_only() {
        let mut engine = engine();
        confidence_bar(&mut engine, 0.0, 10.0, 100.0, 80.0).unwrap();
        let doc = engine.finish().unwrap();
        let rects = doc.pages[0]
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { .. }))
            .count();
        assert_eq!(rects, 1);
        assert!(doc.pages[0].contains_text("0%"));
    }

    #[test]
    fn section_title_uppercases_and_advances() {
        let mut engine = engine();
        let start = engine.cursor();
        let after = section_title(&mut engine, "Quality Metrics").unwrap();
        assert!((after - start - mm(13.0)).abs() < 1e-9);
        let doc = engine.finish().unwrap();
        assert!(doc.pages[0].contains_text("QUALITY METRICS"));
    }

    #[test]
    fn label_value_row_wraps_long_values_as_one_block() {
        let mut engine = engine();
        let long = "Monitor INR closely during initiation and after any dose change. ".repeat(4);
        label_value_row(&mut engine, "Monitoring", &long).unwrap();
        let doc = engine.finish().unwrap();
        let page = &doc.pages[0];
        assert_eq!(page.blocks.len(), 1);
        assert!(page.blocks[0].height > mm(6.0));
        assert!(page.contains_text("Monitoring:"));
    }

    #[test]
    fn label_value_row_taller_than_a_page_flows_on() {
        let mut engine = engine();
        let citations: Vec<String> = (0..600).map(|i| format!("rs{}", 1_000_000 + i)).collect();
        let value = citations.join(", ");
        label_value_row(&mut engine, "Citations", &value).unwrap();
        let doc = engine.finish().unwrap();
        assert!(doc.page_count() > 1);
        assert_eq!(doc.texts().filter(|(_, t)| *t == "Citations:").count(), 1);
        assert!(doc.pages[0].contains_text("Citations:"));
        for page in &doc.pages {
            for block in &page.blocks {
                assert!(block.bottom() <= block.limit + 1e-9);
            }
        }
        let last = doc.pages.last().unwrap();
        assert!(last.texts().any(|t| t.contains("rs1000599")));
    }

    #[test]
    fn empty_value_still_draws_label() {
        let mut engine = engine();
        label_value_row(&mut engine, "Monitoring", "").unwrap();
        let doc = engine.finish().unwrap();
        assert_eq!(doc.pages[0].blocks[0].height, mm(6.0));
    }

    #[test]
    fn header_repeats_when_rows_spill() {
        let mut engine = engine();
        table_header_row(&mut engine, &COLUMNS).unwrap();
        for i in 0..150 {
            let id = format!("rs{i}");
            table_data_row(&mut engine, &COLUMNS, &[&id, "CYP2D6"], i).unwrap();
        }
        let doc = engine.finish().unwrap();
        assert!(doc.page_count() > 1);
        for page in &doc.pages {
            assert_eq!(page.texts().filter(|t| *t == "rsID").count(), 1);
        }
        let rows: Vec<&str> = doc.texts().map(|(_, t)| t).filter(|t| t.starts_with("rs") && *t != "rsID").collect();
        let expected: Vec<String> = (0..150).map(|i| format!("rs{i}")).collect();
        assert_eq!(rows, expected);
    }

    #[test]
    fn wrapped_paragraph_reserves_per_line() {
        let mut engine = engine();
        let width = engine.geometry().content_width();
        let body = "Reduced CYP2C19 function lowers active metabolite formation. ".repeat(300);
        wrapped_paragraph(&mut engine, &body, width, ParagraphStyle::default()).unwrap();
        let doc = engine.finish().unwrap();
        assert!(doc.page_count() > 1, "long paragraph should flow across pages");
        for page in &doc.pages {
            for block in &page.blocks {
                assert!(block.bottom() <= block.limit + 1e-9);
            }
        }
    }
}
