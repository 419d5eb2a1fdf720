//! # Visual Encoder
//!
//! Maps domain values to presentation and draws the report's recurring
//! blocks on top of the layout engine.
//!
//! - [`colors`]: risk category and confidence score to color.
//! - [`widgets`]: badges, bars, title bars, rows, tables, paragraphs.
//! - [`chrome`]: the header and footer on every page.

pub mod chrome;
pub mod colors;
pub mod widgets;

pub use chrome::ReportChrome;
pub use colors::{badge_fill, confidence_color, confidence_percent, risk_color};
