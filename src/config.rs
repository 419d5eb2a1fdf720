//! # Report Configuration
//!
//! Page geometry and chrome strings. Every field has a default, so an empty
//! JSON object (or no config file at all) yields the standard A4 report.
//!
//! All lengths are PDF points (1/72 inch). [`mm`] converts the millimetre
//! measurements the report design is specified in.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// Millimetres to points.
pub fn mm(v: f64) -> f64 {
    v * 72.0 / 25.4
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points, portrait.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }
}

/// Configuration for a page: size and margins.
///
/// `margin.top` is the gap between the header chrome and the first content
/// block. `margin.bottom` is the default bottom-margin floor used when
/// reserving space, so it must clear the footer band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    #[serde(default)]
    pub size: PageSize,

    #[serde(default = "default_margin")]
    pub margin: Edges,
}

fn default_margin() -> Edges {
    Edges {
        top: mm(8.5),
        right: mm(14.0),
        bottom: mm(20.0),
        left: mm(14.0),
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: default_margin(),
        }
    }
}

/// Document metadata embedded in the PDF info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

/// Everything about the report's look that is not derived from the records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportConfig {
    pub page: PageConfig,
    pub brand: String,
    pub tagline: String,
    pub footer_note: String,
    /// Deflate page content streams.
    pub compress: bool,
    pub metadata: Metadata,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            brand: "PharmaGuard".to_string(),
            tagline: "Pharmacogenomic Risk Analysis Report".to_string(),
            footer_note: "PharmaGuard \u{b7} RIFT 2026 \u{b7} For clinical use only".to_string(),
            compress: true,
            metadata: Metadata {
                title: Some("PharmaGuard Pharmacogenomic Risk Report".to_string()),
                author: Some("PharmaGuard".to_string()),
                subject: None,
            },
        }
    }
}

impl ReportConfig {
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let text = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mm_to_points() {
        assert!((mm(25.4) - 72.0).abs() < 1e-9);
        assert!((mm(210.0) - 595.28).abs() < 0.01);
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let path = std::env::temp_dir().join("pharmaguard-report-no-such-config.json");
        let err = ReportConfig::load(&path).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
        assert!(err.to_string().contains("pharmaguard-report-no-such-config.json"));
    }

    #[test]
    fn config_file_syntax_error_keeps_hint() {
        let path = std::env::temp_dir().join(format!("pharmaguard-report-bad-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "brand": "Acme", }"#).unwrap();
        let err = ReportConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, ReportError::Parse { .. }));
        assert!(err.to_string().contains("Hint: Check for trailing commas"), "{err}");
    }

    #[test]
    fn empty_object_is_default() {
        let config = ReportConfig::from_json("{}").unwrap();
        assert_eq!(config, ReportConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = ReportConfig::from_json(
            r#"{ "page": { "size": "Letter" }, "brand": "Acme PGx", "compress": false }"#,
        )
        .unwrap();
        assert_eq!(config.page.size.dimensions(), (612.0, 792.0));
        assert!((config.page.margin.left - mm(14.0)).abs() < 1e-9);
        assert_eq!(config.brand, "Acme PGx");
        assert!(!config.compress);
        assert_eq!(config.tagline, ReportConfig::default().tagline);
    }

    #[test]
    fn custom_page_size() {
        let config =
            ReportConfig::from_json(r#"{ "page": { "size": { "Custom": { "width": 500, "height": 700 } } } }"#)
                .unwrap();
        assert_eq!(config.page.size.dimensions(), (500.0, 700.0));
    }
}
