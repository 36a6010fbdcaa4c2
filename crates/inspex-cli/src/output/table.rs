use inspex_core::model::{CmmReport, ExtractionResult, InspectionRow};
use std::fmt::Write;

pub fn format_extraction(result: &ExtractionResult) -> String {
    match result {
        ExtractionResult::ExtractedData(rows) => format_rows(rows),
        ExtractionResult::ExtractedText(text) => format!("{text}\n"),
    }
}

pub fn format_rows(rows: &[InspectionRow]) -> String {
    if rows.is_empty() {
        return "No inspection rows found.\n".to_string();
    }

    let op_w = column_width("Op", rows.iter().map(|r| r.operation.as_str()));
    let feat_w = column_width("Feature", rows.iter().map(|r| r.feature_no.as_str()));
    let ref_w = column_width("Drawing ref", rows.iter().map(|r| r.drawing_ref.as_str()));

    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:<op_w$}  {:<feat_w$}  {:<ref_w$}  Description",
        "Op", "Feature", "Drawing ref"
    );
    for r in rows {
        let _ = writeln!(
            out,
            "  {:<op_w$}  {:<feat_w$}  {:<ref_w$}  {}",
            r.operation, r.feature_no, r.drawing_ref, r.description
        );
    }
    let _ = writeln!(out, "\n  {} row(s)", rows.len());
    out
}

pub fn format_cmm(report: &CmmReport) -> String {
    let feat_w = column_width("Feature", report.feature_actual_map.keys().map(String::as_str));
    let act_w = column_width("Actual", report.feature_actual_map.values().map(String::as_str));

    let mut out = String::new();
    let _ = writeln!(out, "=== Detection ===\n");
    for d in &report.detector_debug {
        let _ = match d.detection.columns() {
            Some((feature, actual)) => writeln!(
                out,
                "  {}: header row {}, feature column {}, actual column {}",
                d.sheet,
                d.detection
                    .header_row_idx
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "-".into()),
                feature + 1,
                actual + 1
            ),
            None => writeln!(out, "  {}: no columns detected", d.sheet),
        };
    }

    let _ = writeln!(out, "\n=== Features ===\n");
    for (key, actual) in &report.feature_actual_map {
        let range = report
            .feature_range_map
            .get(key)
            .map(|r| format!("{} .. {}", r.min, r.max))
            .unwrap_or_default();
        let marker = if report.refer_only_keys.contains(key) {
            "  (refer only)"
        } else {
            ""
        };
        let _ = writeln!(out, "  {key:<feat_w$}  {actual:<act_w$}  {range}{marker}");
    }
    out
}

fn column_width<'a>(title: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(title.len()))
        .max()
        .unwrap_or(0)
}
