//! # PharmaGuard Report CLI
//!
//! Usage:
//!   pharmaguard-report results.json -o report.pdf
//!   curl .../analyze | pharmaguard-report --file-name sample.vcf
//!   pharmaguard-report --example > results.json

use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pharmaguard_report::{records_from_json, render, ReportConfig, ReportOptions};

#[derive(Parser)]
#[command(
    name = "pharmaguard-report",
    version,
    about = "Render pharmacogenomic analysis results as a paginated PDF report"
)]
struct Cli {
    /// JSON analysis results (array, single record, or {"results": [...]}). Reads stdin when omitted.
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output PDF path (default: PharmaGuard_Report_{name}_{date}.pdf).
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Source genomic file name shown in the header and used for the output name.
    #[arg(long, value_name = "NAME")]
    file_name: Option<String>,

    /// Report configuration JSON (page size, margins, chrome strings).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the laid-out pages as JSON instead of a PDF.
    #[arg(long)]
    dump_layout: bool,

    /// Print a sample results file and exit.
    #[arg(long)]
    example: bool,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("pharmaguard_report={level},warn"))
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    if cli.example {
        print!("{}", example_results_json());
        return;
    }

    init_logging(cli.verbose);
    if let Err(e) = run(cli) {
        eprintln!("\u{2717} {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let input = match &cli.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let config = match &cli.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    let options = ReportOptions::new(cli.file_name.clone(), Utc::now()).with_config(config);

    let records = records_from_json(&input).map_err(pharmaguard_report::ReportError::from)?;
    debug!(records = records.len(), "parsed input");

    if cli.dump_layout {
        let document = pharmaguard_report::compose(&records, &options)?;
        let json = serde_json::to_string_pretty(&document)?;
        match &cli.output {
            Some(path) => fs::write(path, json)?,
            None => println!("{json}"),
        }
        return Ok(());
    }

    let report = render(&records, &options)?;
    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.pdf", report.file_stem)));
    fs::write(&output, &report.bytes)?;

    info!(pages = report.page_count, path = %output.display(), "wrote report");
    eprintln!(
        "\u{2713} Written {} bytes ({} pages) to {}",
        report.bytes.len(),
        report.page_count,
        output.display()
    );
    Ok(())
}

fn example_results_json() -> &'static str {
    r#"[
  {
    "patient_id": "PATIENT_001",
    "drug": "WARFARIN",
    "timestamp": "2026-02-19T10:15:00",
    "risk_assessment": { "risk_label": "Adjust Dosage", "confidence_score": 0.92, "severity": "moderate" },
    "pharmacogenomic_profile": {
      "primary_gene": "CYP2C9",
      "diplotype": "*1/*3",
      "phenotype": "IM",
      "detected_variants": [
        { "rsid": "rs1057910", "gene": "CYP2C9", "star_allele": "*3", "genotype": "0/1", "clinical_significance": "Decreased function" }
      ]
    },
    "clinical_recommendation": {
      "action": "Reduce starting dose and titrate to INR.",
      "dosing_adjustment": "Start at 50-75% of the standard dose",
      "alternative_drugs": ["Apixaban", "Rivaroxaban"],
      "monitoring": "INR twice weekly until stable",
      "cpic_guideline": "CPIC Guideline for Warfarin (2017)"
    },
    "llm_generated_explanation": {
      "summary": "CYP2C9*3 reduces warfarin clearance.",
      "mechanism": "The *3 allele lowers CYP2C9 activity, so S-warfarin accumulates and bleeding risk rises at standard doses.",
      "variant_citations": ["rs1057910"]
    },
    "quality_metrics": {
      "vcf_parsing_success": true,
      "variants_detected": 1,
      "gene_coverage": ["CYP2C9"],
      "confidence_basis": "Single high-quality call"
    }
  }
]
"#
}
