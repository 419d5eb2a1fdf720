//! # Analysis Records
//!
//! The input to the report: one record per analysed drug, exactly as the
//! analysis service returns it (snake_case JSON). Records are read-only for
//! the whole build.
//!
//! Only `drug` is required. Every other field defaults, and the report
//! renders a placeholder for anything missing rather than failing.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Rendered in place of any missing value.
pub const PLACEHOLDER: &str = "\u{2014}";

/// Marker the explanation service writes when it could not produce text.
pub const EXPLANATION_UNAVAILABLE_MARKER: &str = "LLM explanation unavailable";

/// One drug/gene analysis result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub drug: String,
    #[serde(default)]
    pub patient_id: String,
    /// ISO-8601 instant as sent by the service. Kept verbatim so an
    /// unparseable value can still be shown.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub risk_assessment: RiskAssessment,
    #[serde(default, alias = "profile")]
    pub pharmacogenomic_profile: PharmacogenomicProfile,
    #[serde(default, alias = "recommendation")]
    pub clinical_recommendation: ClinicalRecommendation,
    #[serde(default, alias = "explanation")]
    pub llm_generated_explanation: Option<LlmExplanation>,
    #[serde(default)]
    pub quality_metrics: Option<QualityMetrics>,
}

impl AnalysisRecord {
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|t| t.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                // The service emits naive `datetime.isoformat()` values.
                chrono::NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|t| t.and_utc())
            })
    }

    /// The explanation, if the service actually produced one.
    pub fn available_explanation(&self) -> Option<&LlmExplanation> {
        self.llm_generated_explanation
            .as_ref()
            .filter(|e| e.is_available())
    }
}

/// Pharmacogenomic risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RiskLabel {
    Safe,
    AdjustDosage,
    Toxic,
    Ineffective,
    #[default]
    Unknown,
}

impl RiskLabel {
    pub const ALL: [RiskLabel; 5] = [
        RiskLabel::Safe,
        RiskLabel::AdjustDosage,
        RiskLabel::Toxic,
        RiskLabel::Ineffective,
        RiskLabel::Unknown,
    ];

    /// The label as printed on the report.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Safe => "Safe",
            RiskLabel::AdjustDosage => "Adjust Dosage",
            RiskLabel::Toxic => "Toxic",
            RiskLabel::Ineffective => "Ineffective",
            RiskLabel::Unknown => "Unknown",
        }
    }

    /// Lenient parse: case, spaces and underscores are ignored, and anything
    /// unrecognised is `Unknown`.
    pub fn parse(label: &str) -> Self {
        let normalized: String = label
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "safe" => RiskLabel::Safe,
            "adjustdosage" => RiskLabel::AdjustDosage,
            "toxic" => RiskLabel::Toxic,
            "ineffective" => RiskLabel::Ineffective,
            _ => RiskLabel::Unknown,
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RiskLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RiskLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(RiskLabel::parse).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskAssessment {
    #[serde(default)]
    pub risk_label: RiskLabel,
    /// Fraction in [0, 1].
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub severity: Option<String>,
}

impl RiskAssessment {
    /// The confidence score clamped into [0, 1]. Missing or NaN reads as 0.
    pub fn confidence(&self) -> f64 {
        match self.confidence_score {
            Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PharmacogenomicProfile {
    #[serde(default)]
    pub primary_gene: Option<String>,
    #[serde(default)]
    pub diplotype: Option<String>,
    #[serde(default)]
    pub phenotype: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub detected_variants: Vec<DetectedVariant>,
}

/// One variant row. Rendered as a single table row, never split.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectedVariant {
    #[serde(default)]
    pub rsid: Option<String>,
    #[serde(default)]
    pub gene: Option<String>,
    #[serde(default)]
    pub star_allele: Option<String>,
    #[serde(default)]
    pub genotype: Option<String>,
    #[serde(default)]
    pub clinical_significance: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClinicalRecommendation {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub dosing_adjustment: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub alternative_drugs: Vec<String>,
    #[serde(default)]
    pub monitoring: Option<String>,
    #[serde(default)]
    pub cpic_guideline: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmExplanation {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub mechanism: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub variant_citations: Vec<String>,
    /// Explicit availability flag. When absent, availability is inferred from
    /// the mechanism text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

impl LlmExplanation {
    pub fn is_available(&self) -> bool {
        let has_mechanism = self.mechanism.as_deref().is_some_and(|m| !m.trim().is_empty());
        match self.available {
            Some(flag) => flag && has_mechanism,
            None => {
                has_mechanism
                    && !self
                        .mechanism
                        .as_deref()
                        .is_some_and(|m| m.contains(EXPLANATION_UNAVAILABLE_MARKER))
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    #[serde(default, alias = "vcf_parsing_success")]
    pub parsing_success: Option<bool>,
    #[serde(default)]
    pub variants_detected: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub gene_coverage: Vec<String>,
    #[serde(default)]
    pub confidence_basis: Option<String>,
}

/// `null` and a missing key both read as an empty list.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Render an optional string, substituting the placeholder for missing or
/// blank values.
pub fn or_placeholder(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => PLACEHOLDER,
    }
}

/// Accepted JSON shapes for a batch of records.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordBatch {
    List(Vec<AnalysisRecord>),
    Wrapped { results: Vec<AnalysisRecord> },
    Single(Box<AnalysisRecord>),
}

/// Parse records from a JSON array, a `{"results": [...]}` object, or a
/// single record object.
pub fn records_from_json(json: &str) -> Result<Vec<AnalysisRecord>, serde_json::Error> {
    // Untagged enums flatten every mismatch into one opaque message, so parse
    // syntax first to keep serde_json's precise error for malformed input.
    let value: serde_json::Value = serde_json::from_str(json)?;
    let batch: RecordBatch = serde_json::from_value(value)?;
    Ok(match batch {
        RecordBatch::List(records) => records,
        RecordBatch::Wrapped { results } => results,
        RecordBatch::Single(record) => vec![*record],
    })
}
