//! # PharmaGuard Report
//!
//! A paginated pharmacogenomic risk report composer.
//!
//! A report is a sequence of analysis records laid out onto fixed-size
//! pages: a compact summary row per drug, then one detail section per drug,
//! then "Page N of M" footers once the page count is known.
//!
//! The page is the unit of layout. Every block reserves its height before it
//! draws, and the layout engine breaks the page *before* a block that would
//! cross the bottom floor. A table row or a label/value line is never split
//! across two pages, and there is nothing to roll back.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON records)
//!       ↓
//!   [model]    — Analysis records, lenient defaults
//!       ↓
//!   [report]   — Summary pass, detail pass, finishing pass
//!       ↓
//!   [encode]   — Colors, badges, bars, rows, tables, page chrome
//!       ↓
//!   [layout]   — Cursor, page breaks, footer stamping
//!       ↓
//!   [pdf]      — Serialize to PDF bytes
//! ```

pub mod config;
pub mod encode;
pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod report;
pub mod style;
pub mod text;

use tracing::info;

pub use config::ReportConfig;
pub use error::{RenderingFault, ReportError, Result};
pub use layout::Document;
pub use model::{records_from_json, AnalysisRecord, RiskLabel};
pub use report::{compose, output_stem, RenderedReport, ReportOptions};

use pdf::PdfWriter;

/// Render records to PDF bytes.
///
/// This is the primary entry point. Fails only on an empty record sequence
/// or a broken layout invariant; missing fields degrade to placeholders.
pub fn render(records: &[AnalysisRecord], options: &ReportOptions) -> Result<RenderedReport> {
    let document = compose(records, options)?;
    let writer = PdfWriter::new(options.config.compress);
    let bytes = writer.write(&document, &options.config.metadata);
    let file_stem = output_stem(options.file_name.as_deref(), options.generated_at.date_naive());

    info!(
        pages = document.page_count(),
        bytes = bytes.len(),
        "report rendered"
    );
    Ok(RenderedReport {
        bytes,
        page_count: document.page_count(),
        file_stem,
    })
}

/// Render records given as JSON to PDF bytes.
///
/// Accepts an array of records, a single record object, or an object with a
/// `results` array.
pub fn render_json(json: &str, options: &ReportOptions) -> Result<RenderedReport> {
    let records = records_from_json(json)?;
    render(&records, options)
}
