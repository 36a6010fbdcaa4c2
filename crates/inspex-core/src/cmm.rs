use crate::error::InspexError;
use crate::model::{CmmReport, FeatureRange, RawCell, Sheet, SheetDetection, Workbook};
use crate::parsing::header::{detect_columns, HeaderRules};
use crate::parsing::normalize::{is_refer_only, normalize_feature_key, pick_first_actual, to_float};

/// Merge every sheet of a CMM workbook into one feature -> actual mapping.
///
/// Sheets are visited in workbook order and rows top to bottom. The first
/// non-empty actual seen for a key wins; the range map covers every numeric
/// actual. Sheets without detectable columns are skipped but still appear
/// in the detection trace.
pub fn merge_workbook(workbook: &Workbook, rules: &HeaderRules) -> Result<CmmReport, InspexError> {
    let mut report = CmmReport::default();

    for sheet in &workbook.sheets {
        let detection = detect_columns(&sheet.rows, rules);
        report.detector_debug.push(SheetDetection {
            sheet: sheet.name.clone(),
            detection,
        });

        let Some((feature_col, actual_col)) = detection.columns() else {
            tracing::debug!(sheet = %sheet.name, "no feature/actual columns, skipping sheet");
            continue;
        };

        // Rows up to and including the header are not data.
        let first_data_row = detection.header_row_idx.unwrap_or(0);
        let before = report.feature_actual_map.len();
        merge_sheet(&mut report, sheet, first_data_row, feature_col, actual_col);
        tracing::debug!(
            sheet = %sheet.name,
            ?detection,
            new_keys = report.feature_actual_map.len() - before,
            "merged sheet"
        );
    }

    if report.feature_actual_map.is_empty() {
        return Err(InspexError::StructureNotFound {
            trace: report.detector_debug,
        });
    }

    tracing::info!(
        features = report.feature_actual_map.len(),
        ranged = report.feature_range_map.len(),
        refer_only = report.refer_only_keys.len(),
        "CMM workbook merged"
    );
    Ok(report)
}

fn merge_sheet(
    report: &mut CmmReport,
    sheet: &Sheet,
    first_data_row: usize,
    feature_col: usize,
    actual_col: usize,
) {
    for row_idx in first_data_row..sheet.rows.len() {
        let feature_text = cell_text(sheet.cell(row_idx, feature_col));
        let key = normalize_feature_key(&feature_text);
        if key.is_empty() {
            continue;
        }

        if is_refer_only(&feature_text) {
            report.refer_only_keys.insert(key.clone());
        }

        let actual = pick_first_actual(&cell_text(sheet.cell(row_idx, actual_col)));
        let numeric = to_float(&actual);

        let merged = report.feature_actual_map.entry(key.clone()).or_default();
        if merged.is_empty() && !actual.is_empty() {
            *merged = actual;
        }

        if let Some(v) = numeric {
            report
                .feature_range_map
                .entry(key)
                .and_modify(|r| r.include(v))
                .or_insert_with(|| FeatureRange::point(v));
        }
    }
}

fn cell_text(cell: &RawCell) -> String {
    cell.to_text().unwrap_or_default()
}
