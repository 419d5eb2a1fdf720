//! # Report Composer
//!
//! Drives the layout engine through the summary pass, then the detail pass,
//! then the finishing pass. The composer never tracks coordinates itself;
//! every block goes through a widget that reserves its own space.

mod naming;

pub use naming::{output_stem, sanitize_file_name};

use chrono::{DateTime, Utc};
use tracing::{debug, info_span};

use crate::config::{mm, ReportConfig};
use crate::encode::widgets::{
    self, badge, banner, confidence_bar, divider, label_value_row, section_title_with_floor,
    table_data_row, table_header_row, wrapped_paragraph, Column, ParagraphStyle,
};
use crate::encode::ReportChrome;
use crate::error::{ReportError, Result};
use crate::font::FontSpec;
use crate::layout::{Document, LayoutEngine};
use crate::model::{or_placeholder, AnalysisRecord, QualityMetrics, PLACEHOLDER};
use crate::style::palette;

/// Per-invocation inputs.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Source file name, shown in the header and used for the output name.
    pub file_name: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub config: ReportConfig,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            file_name: None,
            generated_at: Utc::now(),
            config: ReportConfig::default(),
        }
    }
}

impl ReportOptions {
    pub fn new(file_name: Option<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            file_name,
            generated_at,
            config: ReportConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReportConfig) -> Self {
        self.config = config;
        self
    }
}

/// The serialized artifact plus what the delivery side needs to name it.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// `PharmaGuard_Report_{name}_{date}`, without extension.
    pub file_stem: String,
}

/// Keep-with-next floors, in millimetres.
const DETAIL_FLOOR: f64 = 60.0;
const RECOMMENDATION_FLOOR: f64 = 50.0;
const EXPLANATION_FLOOR: f64 = 40.0;
const QUALITY_FLOOR: f64 = 30.0;

/// Lay out every record and seal the document.
pub fn compose(records: &[AnalysisRecord], options: &ReportOptions) -> Result<Document> {
    if records.is_empty() {
        return Err(ReportError::EmptyInput);
    }

    let _span = info_span!("compose", records = records.len()).entered();
    let config = &options.config;
    let chrome = ReportChrome {
        brand: config.brand.clone(),
        tagline: config.tagline.clone(),
        file_label: options
            .file_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Unknown")
            .to_string(),
        generated: options.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        footer_note: config.footer_note.clone(),
        margin: config.page.margin,
    };

    let mut engine = LayoutEngine::new(&config.page, Box::new(chrome));
    engine.begin_document()?;

    debug!("summary pass");
    summary_pass(&mut engine, records)?;

    debug!(pages_so_far = engine.page_count(), "detail pass");
    for record in records {
        detail_section(&mut engine, record)?;
    }

    debug!(pages = engine.page_count(), "finishing pass");
    Ok(engine.finish()?)
}

fn keep_with_next(engine: &LayoutEngine, extra: f64) -> f64 {
    engine.default_floor() + extra
}

const SUMMARY_ROW: f64 = 14.0;
const SUMMARY_BLOCK: f64 = 16.0;

fn summary_pass(engine: &mut LayoutEngine, records: &[AnalysisRecord]) -> Result<()> {
    let floor = keep_with_next(engine, mm(SUMMARY_BLOCK));
    section_title_with_floor(engine, "Analysis Summary", floor)?;

    for (i, record) in records.iter().enumerate() {
        summary_row(engine, record, i)?;
    }
    engine.advance(mm(6.0));
    Ok(())
}

/// One compact row: drug, gene, diplotype, phenotype, badge, confidence.
fn summary_row(engine: &mut LayoutEngine, record: &AnalysisRecord, index: usize) -> Result<()> {
    let y = engine.reserve(mm(SUMMARY_BLOCK))?;
    let x = engine.geometry().content_left();
    let width = engine.geometry().content_width();
    let stripe = if index % 2 == 0 {
        palette::ROW_EVEN
    } else {
        palette::SURFACE
    };
    engine.draw(widgets::rect(x, y, width, mm(SUMMARY_ROW), stripe))?;

    let profile = &record.pharmacogenomic_profile;
    let baseline = y + mm(5.0);
    let drug_font = FontSpec::bold(9.0);
    let cell_font = FontSpec::regular(8.0);

    let drug = engine.text().fit_to_width(&record.drug, drug_font, mm(40.0));
    engine.draw(widgets::text(x + mm(4.0), baseline, drug, drug_font, palette::TEXT))?;

    let cells = [
        (46.0, profile.primary_gene.as_deref()),
        (76.0, profile.diplotype.as_deref()),
        (106.0, profile.phenotype.as_deref()),
    ];
    for (offset, value) in cells {
        let value = engine.text().fit_to_width(or_placeholder(value), cell_font, mm(28.0));
        engine.draw(widgets::text(x + mm(offset), baseline, value, cell_font, palette::SUBTEXT))?;
    }

    badge(engine, record.risk_assessment.risk_label, x + mm(134.0), y + mm(6.0))?;
    confidence_bar(
        engine,
        record.risk_assessment.confidence(),
        x + mm(4.0),
        y + mm(12.0),
        mm(80.0),
    )?;
    engine.advance(mm(SUMMARY_BLOCK));
    Ok(())
}

fn detail_section(engine: &mut LayoutEngine, record: &AnalysisRecord) -> Result<()> {
    let profile = &record.pharmacogenomic_profile;
    let title = format!(
        "{}  \u{b7}  {}",
        record.drug,
        or_placeholder(profile.primary_gene.as_deref())
    );
    banner(engine, &title, mm(DETAIL_FLOOR))?;

    risk_row(engine, record)?;
    patient_line(engine, record)?;

    let floor = keep_with_next(engine, mm(6.0));
    section_title_with_floor(engine, "Pharmacogenomic Profile", floor)?;
    label_value_row(engine, "Gene", or_placeholder(profile.primary_gene.as_deref()))?;
    label_value_row(engine, "Diplotype", or_placeholder(profile.diplotype.as_deref()))?;
    label_value_row(engine, "Phenotype", or_placeholder(profile.phenotype.as_deref()))?;
    engine.advance(mm(4.0));

    variant_table(engine, record)?;
    recommendation(engine, record)?;
    explanation(engine, record)?;
    match &record.quality_metrics {
        Some(metrics) => quality_metrics(engine, metrics)?,
        None => debug!(drug = %record.drug, field = "quality_metrics", "section omitted"),
    }
    divider(engine)?;
    Ok(())
}

fn risk_row(engine: &mut LayoutEngine, record: &AnalysisRecord) -> Result<()> {
    let height = mm(10.0);
    let y = engine.reserve(height)?;
    let x = engine.geometry().content_left();
    let baseline = y + mm(5.0);
    let label_font = FontSpec::bold(8.0);

    engine.draw(widgets::text(x, baseline, "RISK:", label_font, palette::SUBTEXT))?;
    badge(engine, record.risk_assessment.risk_label, x + mm(16.0), baseline)?;
    engine.draw(widgets::text(x + mm(86.0), baseline, "CONFIDENCE:", label_font, palette::SUBTEXT))?;
    confidence_bar(
        engine,
        record.risk_assessment.confidence(),
        x + mm(111.0),
        baseline,
        mm(50.0),
    )?;
    engine.advance(height);
    Ok(())
}

fn display_timestamp(record: &AnalysisRecord) -> String {
    match record.parsed_timestamp() {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => {
            debug!(drug = %record.drug, field = "timestamp", "unparseable timestamp shown verbatim");
            or_placeholder(Some(&record.timestamp)).to_string()
        }
    }
}

fn patient_line(engine: &mut LayoutEngine, record: &AnalysisRecord) -> Result<()> {
    let height = mm(8.0);
    let mut line = format!(
        "Patient ID: {}   |   Timestamp: {}",
        or_placeholder(Some(&record.patient_id)),
        display_timestamp(record)
    );
    if let Some(severity) = record.risk_assessment.severity.as_deref().filter(|s| !s.trim().is_empty()) {
        line.push_str("   |   Severity: ");
        line.push_str(severity);
    }

    let y = engine.reserve(height)?;
    let x = engine.geometry().content_left();
    let font = FontSpec::regular(7.5);
    let line = engine.text().fit_to_width(&line, font, engine.geometry().content_width());
    engine.draw(widgets::text(x, y + mm(4.0), line, font, palette::SUBTEXT))?;
    engine.advance(height);
    Ok(())
}

fn variant_columns(content_width: f64) -> [Column; 5] {
    let column = |title, offset: f64, end: f64, font_size, accent| Column {
        title,
        offset: mm(offset),
        width: end - mm(offset),
        font_size,
        accent,
    };
    [
        column("rsID", 0.0, mm(37.0), 7.5, true),
        column("Gene", 37.0, mm(67.0), 7.5, false),
        column("Star Allele", 67.0, mm(97.0), 7.5, false),
        column("Genotype", 97.0, mm(127.0), 7.5, false),
        column("Clinical Sig.", 127.0, content_width, 7.0, false),
    ]
}

fn variant_table(engine: &mut LayoutEngine, record: &AnalysisRecord) -> Result<()> {
    let variants = &record.pharmacogenomic_profile.detected_variants;
    if variants.is_empty() {
        debug!(drug = %record.drug, field = "detected_variants", "table omitted");
        return Ok(());
    }

    let columns = variant_columns(engine.geometry().content_width());
    let floor = keep_with_next(engine, mm(16.0));
    section_title_with_floor(engine, "Detected Variants", floor)?;
    table_header_row(engine, &columns)?;
    for (i, variant) in variants.iter().enumerate() {
        let cells = [
            or_placeholder(variant.rsid.as_deref()),
            or_placeholder(variant.gene.as_deref()),
            or_placeholder(variant.star_allele.as_deref()),
            or_placeholder(variant.genotype.as_deref()),
            or_placeholder(variant.clinical_significance.as_deref()),
        ];
        table_data_row(engine, &columns, &cells, i)?;
    }
    engine.advance(mm(4.0));
    Ok(())
}

fn recommendation(engine: &mut LayoutEngine, record: &AnalysisRecord) -> Result<()> {
    let rec = &record.clinical_recommendation;
    section_title_with_floor(engine, "Clinical Recommendation", mm(RECOMMENDATION_FLOOR))?;

    if let Some(action) = rec.action.as_deref().filter(|a| !a.trim().is_empty()) {
        let style = ParagraphStyle {
            font: FontSpec::bold(8.0),
            color: palette::TEXT,
            ..ParagraphStyle::default()
        };
        let width = engine.geometry().content_width();
        wrapped_paragraph(engine, action, width, style)?;
        engine.advance(mm(2.0));
    }
    label_value_row(engine, "Dosing Adjustment", or_placeholder(rec.dosing_adjustment.as_deref()))?;
    label_value_row(engine, "Monitoring", or_placeholder(rec.monitoring.as_deref()))?;
    label_value_row(engine, "CPIC Guideline", or_placeholder(rec.cpic_guideline.as_deref()))?;

    let alternatives: Vec<&str> = rec
        .alternative_drugs
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .collect();
    if alternatives.is_empty() {
        debug!(drug = %record.drug, field = "alternative_drugs", "line omitted");
    } else {
        label_value_row(engine, "Alternatives", &alternatives.join(", "))?;
    }
    engine.advance(mm(4.0));
    Ok(())
}

fn explanation(engine: &mut LayoutEngine, record: &AnalysisRecord) -> Result<()> {
    let Some(exp) = record.available_explanation() else {
        debug!(drug = %record.drug, field = "llm_generated_explanation", "section omitted");
        return Ok(());
    };

    section_title_with_floor(engine, "AI Clinical Explanation", mm(EXPLANATION_FLOOR))?;
    let width = engine.geometry().content_width();

    if let Some(summary) = exp.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        let style = ParagraphStyle {
            color: palette::TEXT,
            ..ParagraphStyle::default()
        };
        wrapped_paragraph(engine, summary, width, style)?;
        engine.advance(mm(2.0));
    }
    if let Some(mechanism) = exp.mechanism.as_deref() {
        wrapped_paragraph(engine, mechanism, width, ParagraphStyle::default())?;
    }
    if !exp.variant_citations.is_empty() {
        engine.advance(mm(2.0));
        label_value_row(engine, "Citations", &exp.variant_citations.join(", "))?;
    }
    engine.advance(mm(4.0));
    Ok(())
}

fn quality_metrics(engine: &mut LayoutEngine, metrics: &QualityMetrics) -> Result<()> {
    section_title_with_floor(engine, "Quality Metrics", mm(QUALITY_FLOOR))?;

    let parsing = match metrics.parsing_success {
        Some(true) => "Yes",
        Some(false) => "No",
        None => PLACEHOLDER,
    };
    label_value_row(engine, "Parsing Success", parsing)?;

    let detected = metrics
        .variants_detected
        .map(|n| n.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    label_value_row(engine, "Variants Detected", &detected)?;

    let coverage = metrics.gene_coverage.join(", ");
    label_value_row(engine, "Gene Coverage", or_placeholder(Some(&coverage)))?;
    label_value_row(engine, "Confidence Basis", or_placeholder(metrics.confidence_basis.as_deref()))?;
    engine.advance(mm(2.0));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{records_from_json, DetectedVariant, RiskLabel};
    use chrono::TimeZone;

    fn options() -> ReportOptions {
        ReportOptions::new(
            Some("patient sample.vcf".to_string()),
            Utc.with_ymd_and_hms(2026, 2, 19, 10, 15, 0).unwrap(),
        )
    }

    fn record(drug: &str) -> AnalysisRecord {
        records_from_json(&format!(r#"{{ "drug": "{drug}" }}"#)).unwrap().remove(0)
    }

    #[test]
    fn empty_input_is_rejected_before_layout() {
        assert!(matches!(compose(&[], &options()), Err(ReportError::EmptyInput)));
    }

    #[test]
    fn minimal_record_degrades_to_placeholders() {
        let doc = compose(&[record("CODEINE")], &options()).unwrap();
        assert_eq!(doc.page_count(), 1);
        let page = &doc.pages[0];
        assert!(page.contains_text("CODEINE  \u{b7}  \u{2014}"));
        assert!(page.contains_text("Unknown"));
        assert!(page.contains_text("0%"));
        assert!(!page.contains_text("DETECTED VARIANTS"));
        assert!(!page.contains_text("AI CLINICAL EXPLANATION"));
        assert!(!page.contains_text("QUALITY METRICS"));
        assert!(page.contains_text("CLINICAL RECOMMENDATION"));
    }

    #[test]
    fn header_shows_file_name_or_unknown() {
        let doc = compose(&[record("A")], &options()).unwrap();
        assert!(doc.pages[0].contains_text("File: patient sample.vcf"));

        let anonymous = ReportOptions::new(None, options().generated_at);
        let doc = compose(&[record("A")], &anonymous).unwrap();
        assert!(doc.pages[0].contains_text("File: Unknown"));
        assert!(doc.pages[0].contains_text("Generated: 2026-02-19 10:15 UTC"));
    }

    #[test]
    fn severity_joins_patient_line() {
        let mut r = record("CLOPIDOGREL");
        r.patient_id = "PATIENT_007".to_string();
        r.risk_assessment.severity = Some("moderate".to_string());
        r.risk_assessment.risk_label = RiskLabel::Ineffective;
        let doc = compose(&[r], &options()).unwrap();
        assert!(doc.pages[0].contains_text("Patient ID: PATIENT_007"));
        assert!(doc.pages[0].contains_text("Severity: moderate"));
    }

    #[test]
    fn long_variant_table_repeats_header_on_each_page() {
        let mut r = record("SIMVASTATIN");
        r.pharmacogenomic_profile.detected_variants = (0..120)
            .map(|i| DetectedVariant {
                rsid: Some(format!("rs{i:05}")),
                gene: Some("SLCO1B1".to_string()),
                ..Default::default()
            })
            .collect();
        let doc = compose(&[r], &options()).unwrap();
        assert!(doc.page_count() >= 3);

        let table_pages: Vec<usize> = doc
            .texts()
            .filter(|(_, t)| t.starts_with("rs"))
            .map(|(p, _)| p)
            .collect();
        let first = table_pages[0];
        let last = *table_pages.last().unwrap();
        for page in first..=last {
            assert!(doc.pages[page].contains_text("rsID"), "page {page} lacks table header");
        }
    }

    #[test]
    fn unavailable_explanation_is_omitted() {
        let json = r#"{
            "drug": "FLUOROURACIL",
            "llm_generated_explanation": {
                "summary": "n/a",
                "mechanism": "LLM explanation unavailable: upstream timeout"
            }
        }"#;
        let records = records_from_json(json).unwrap();
        let doc = compose(&records, &options()).unwrap();
        assert!(!doc.pages[0].contains_text("AI CLINICAL EXPLANATION"));
    }

    #[test]
    fn citations_follow_explanation() {
        let json = r#"{
            "drug": "WARFARIN",
            "llm_generated_explanation": {
                "summary": "Reduced clearance.",
                "mechanism": "CYP2C9*3 lowers S-warfarin metabolism.",
                "variant_citations": ["rs1057910", "rs9923231"]
            }
        }"#;
        let doc = compose(&records_from_json(json).unwrap(), &options()).unwrap();
        let page = &doc.pages[0];
        assert!(page.contains_text("AI CLINICAL EXPLANATION"));
        assert!(page.contains_text("Reduced clearance."));
        assert!(page.contains_text("Citations:"));
        assert!(page.contains_text("rs1057910, rs9923231"));
    }

    #[test]
    fn quality_metrics_render_yes_and_counts() {
        let json = r#"{
            "drug": "WARFARIN",
            "quality_metrics": { "vcf_parsing_success": true, "variants_detected": 3, "gene_coverage": [] }
        }"#;
        let doc = compose(&records_from_json(json).unwrap(), &options()).unwrap();
        let page = &doc.pages[0];
        assert!(page.contains_text("QUALITY METRICS"));
        assert!(page.contains_text("Yes"));
        assert!(page.texts().any(|t| t == "3"));
    }
}
