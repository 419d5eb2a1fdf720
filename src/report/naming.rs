use chrono::NaiveDate;

/// Used when there is no usable source file name.
const FALLBACK_NAME: &str = "analysis";

/// Strip any directory and the last extension, then collapse whitespace runs
/// into underscores.
///
/// Directory parts are dropped as well, so a path passed as the file name
/// never leaks separators into the output name. A dotfile such as `.vcf`
/// has no stem to keep and stays whole.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    };
    stem.split_whitespace().collect::<Vec<_>>().join("_")
}

/// `PharmaGuard_Report_{sanitized name}_{YYYY-MM-DD}`.
pub fn output_stem(file_name: Option<&str>, date: NaiveDate) -> String {
    let name = file_name
        .map(sanitize_file_name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_NAME.to_string());
    format!("PharmaGuard_Report_{}_{}", name, date.format("%Y-%m-%d"))
}
