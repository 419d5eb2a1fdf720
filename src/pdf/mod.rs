//! # PDF Serializer
//!
//! Takes the sealed document from the layout engine and writes a PDF file.
//!
//! This is a small from-scratch PDF 1.7 writer. The report only ever draws
//! filled or stroked rectangles and single lines of text in the two standard
//! Helvetica faces, so that is the whole subset written here.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Layout coordinates have their origin at the top-left; PDF's is at the
//! bottom-left, so every y is flipped on the way out.

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::config::Metadata;
use crate::font::StandardFont;
use crate::layout::{Document, DrawCommand, Page};

pub struct PdfWriter {
    compress: bool,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
    /// Font resources in `/F{index}` order with their object ids.
    font_objects: Vec<(StandardFont, usize)>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PdfWriter {
    pub fn new(compress: bool) -> Self {
        Self { compress }
    }

    /// Write a sealed document to a PDF byte vector.
    pub fn write(&self, document: &Document, metadata: &Metadata) -> Vec<u8> {
        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages.
        let mut builder = PdfBuilder {
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
            font_objects: Vec::new(),
        };

        self.register_fonts(&mut builder, &document.pages);
        let font_resources = Self::build_font_resource_dict(&builder.font_objects);

        let mut page_obj_ids: Vec<usize> = Vec::with_capacity(document.pages.len());
        for page in &document.pages {
            let content = self.build_content_stream(page, &builder.font_objects);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            if self.compress {
                let compressed = compress_to_vec_zlib(&content, 6);
                let _ = write!(
                    content_data,
                    "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                    compressed.len()
                );
                content_data.extend_from_slice(&compressed);
            } else {
                let _ = write!(content_data, "<< /Length {} >>\nstream\n", content.len());
                content_data.extend_from_slice(&content);
            }
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(content_data);

            let page_obj_id = builder.objects.len();
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                page.width, page.height, content_obj_id, font_resources
            );
            builder.objects.push(page_dict.into_bytes());
            page_obj_ids.push(page_obj_id);
        }

        builder.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = builder.objects.len();
        builder.objects.push(Self::build_info_dict(metadata));

        self.serialize(&builder, info_obj_id)
    }

    fn build_info_dict(metadata: &Metadata) -> Vec<u8> {
        let mut info: Vec<u8> = b"<< ".to_vec();
        let entries = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                let _ = write!(info, "/{} (", key);
                info.extend_from_slice(&encode_text(value));
                info.extend_from_slice(b") ");
            }
        }
        let _ = write!(
            info,
            "/Producer (pharmaguard-report {}) /Creator (PharmaGuard) >>",
            env!("CARGO_PKG_VERSION")
        );
        info
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(&self, page: &Page, font_objects: &[(StandardFont, usize)]) -> Vec<u8> {
        let mut stream: Vec<u8> = Vec::new();
        for command in &page.commands {
            Self::write_command(&mut stream, command, page.height, font_objects);
        }
        stream
    }

    fn write_command(
        stream: &mut Vec<u8>,
        command: &DrawCommand,
        page_height: f64,
        font_objects: &[(StandardFont, usize)],
    ) {
        match command {
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
                radius,
            } => {
                let pdf_y = page_height - y - height;
                let mut path = String::new();
                if *radius > 0.0 {
                    write_rounded_rect(&mut path, *x, pdf_y, *width, *height, *radius);
                } else {
                    let _ = writeln!(path, "{:.2} {:.2} {:.2} {:.2} re", x, pdf_y, width, height);
                }

                let op = match (fill, stroke) {
                    (Some(_), Some(_)) => "B",
                    (Some(_), None) => "f",
                    (None, Some(_)) => "S",
                    (None, None) => return,
                };

                let _ = writeln!(stream, "q");
                if let Some(fill) = fill {
                    let (r, g, b) = fill.components();
                    let _ = writeln!(stream, "{:.3} {:.3} {:.3} rg", r, g, b);
                }
                if let Some(stroke) = stroke {
                    let (r, g, b) = stroke.components();
                    let _ = writeln!(stream, "{:.3} {:.3} {:.3} RG\n0.5 w", r, g, b);
                }
                stream.extend_from_slice(path.as_bytes());
                let _ = writeln!(stream, "{}\nQ", op);
            }

            DrawCommand::Text {
                x,
                y,
                text,
                font,
                color,
            } => {
                if text.is_empty() {
                    return;
                }
                let index = font_objects
                    .iter()
                    .position(|(f, _)| *f == font.font)
                    .unwrap_or(0);
                let (r, g, b) = color.components();
                let _ = write!(
                    stream,
                    "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n(",
                    r,
                    g,
                    b,
                    index,
                    font.size,
                    x,
                    page_height - y
                );
                stream.extend_from_slice(&encode_text(text));
                let _ = write!(stream, ") Tj\nET\n");
            }
        }
    }

    /// Register each standard face that appears in the document, in a fixed
    /// order so output is deterministic.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[Page]) {
        let mut fonts: BTreeSet<StandardFont> = pages
            .iter()
            .flat_map(|p| p.commands.iter())
            .filter_map(|c| match c {
                DrawCommand::Text { font, .. } => Some(font.font),
                DrawCommand::Rect { .. } => None,
            })
            .collect();

        // Always have at least Helvetica
        if fonts.is_empty() {
            fonts.insert(StandardFont::Helvetica);
        }

        for font in fonts {
            let obj_id = builder.objects.len();
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                 /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            builder.objects.push(font_dict.into_bytes());
            builder.font_objects.push((font, obj_id));
        }
    }

    fn build_font_resource_dict(font_objects: &[(StandardFont, usize)]) -> String {
        font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, data) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

fn write_rounded_rect(path: &mut String, x: f64, y: f64, w: f64, h: f64, radius: f64) {
    let k = 0.5522847498;
    let r = radius.min(w / 2.0).min(h / 2.0);

    let _ = writeln!(path, "{:.2} {:.2} m", x + r, y);
    let _ = writeln!(path, "{:.2} {:.2} l", x + w - r, y);
    let _ = writeln!(
        path,
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
        x + w - r + r * k,
        y,
        x + w,
        y + r - r * k,
        x + w,
        y + r
    );
    let _ = writeln!(path, "{:.2} {:.2} l", x + w, y + h - r);
    let _ = writeln!(
        path,
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
        x + w,
        y + h - r + r * k,
        x + w - r + r * k,
        y + h,
        x + w - r,
        y + h
    );
    let _ = writeln!(path, "{:.2} {:.2} l", x + r, y + h);
    let _ = writeln!(
        path,
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
        x + r - r * k,
        y + h,
        x,
        y + h - r + r * k,
        x,
        y + h - r
    );
    let _ = writeln!(path, "{:.2} {:.2} l", x, y + r);
    let _ = writeln!(
        path,
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
        x,
        y + r - r * k,
        x + r - r * k,
        y,
        x + r,
        y
    );
    let _ = writeln!(path, "h");
}

/// Map a character to its WinAnsiEncoding byte. Latin-1 passes through;
/// the few typographic marks the report uses live in the 0x80-0x9F block.
fn win_ansi_byte(ch: char) -> u8 {
    match ch {
        '\u{2014}' => 0x97,
        '\u{2013}' => 0x96,
        '\u{2022}' => 0x95,
        '\u{2026}' => 0x85,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{20ac}' => 0x80,
        c if (c as u32) < 0x80 => c as u8,
        c if (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
        _ => b'?',
    }
}

/// Encode text as the body of a PDF literal string: WinAnsi bytes with the
/// string delimiters escaped.
fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.extend_from_slice(b"\\\\"),
            '(' => out.extend_from_slice(b"\\("),
            ')' => out.extend_from_slice(b"\\)"),
            '\n' | '\r' | '\t' => out.push(b' '),
            c => out.push(win_ansi_byte(c)),
        }
    }
    out
}
