//! Structured error types for report generation.
//!
//! Failures come from an empty record sequence, JSON that does not match the
//! record schema, an unreadable config file, or a broken layout invariant. Missing or
//! malformed record fields are not errors; they degrade to placeholders.

use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum ReportError {
    /// No analysis records were supplied. Raised before any page is created.
    #[error("cannot build a report from an empty record sequence")]
    EmptyInput,

    /// JSON input failed to parse as analysis records.
    #[error("failed to parse analysis records: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A layout invariant was violated. Never retried.
    #[error(transparent)]
    Rendering(#[from] RenderingFault),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

/// Programming-contract violations inside the layout engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderingFault {
    /// A block taller than the usable page height can never be placed.
    #[error("block of {needed:.1}pt exceeds the usable page height of {usable:.1}pt")]
    BlockTooTall { needed: f64, usable: f64 },

    /// A draw or reserve was attempted after the document was sealed.
    #[error("document is sealed; no further content can be drawn")]
    Sealed,

    /// Content was issued before the first page existed.
    #[error("document has not been started")]
    NotStarted,
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the analysis record schema. Each record needs at least a `drug` field.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ReportError::Parse { source: e, hint }
    }
}

pub type Result<T, E = ReportError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_syntax_hint() {
        let err: ReportError = serde_json::from_str::<serde_json::Value>("[1,]")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.contains("Hint: Check for trailing commas"), "{msg}");
    }

    #[test]
    fn eof_hint() {
        let err: ReportError = serde_json::from_str::<serde_json::Value>("[{\"drug\":")
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn rendering_fault_is_transparent() {
        let err = ReportError::from(RenderingFault::Sealed);
        assert_eq!(err.to_string(), "document is sealed; no further content can be drawn");
    }
}
