//! Fixed-layout inspection plan sheets.
//!
//! Row 1 is a title, row 2 holds the column labels and data starts at row 3.
//! Labels are matched by name, so column order may vary between templates.

use crate::model::{InspectionRow, RawCell};
use std::collections::HashMap;

/// Zero-based index of the label row.
pub const LABEL_ROW: usize = 1;

const OPERATION: &str = "operation";
const FEATURE_NUMBER: &str = "feature number";
const DRAWING_REF: &str = "drawing ref";
const DESCRIPTION: &str = "description";

/// Label -> column position, taken from the label row.
#[derive(Debug, Clone, Default)]
pub struct PlanColumns {
    by_label: HashMap<String, usize>,
}

impl PlanColumns {
    /// Index the text labels of a row. Non-text cells are not labels; when a
    /// label repeats, the rightmost column wins.
    pub fn from_labels(row: &[RawCell]) -> Self {
        let by_label = row
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| match cell {
                RawCell::Text(s) => Some((normalize_label(s), idx)),
                _ => None,
            })
            .collect();
        PlanColumns { by_label }
    }

    fn field(&self, row: &[RawCell], label: &str) -> String {
        self.by_label
            .get(label)
            .and_then(|&idx| row.get(idx))
            .and_then(RawCell::to_text)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    /// Map a data row; rows without an operation yield `None`.
    ///
    /// An operation is present when its trimmed text is non-empty, so a
    /// numeric `0` cell counts as an operation.
    pub fn map_row(&self, row: &[RawCell]) -> Option<InspectionRow> {
        let operation = self.field(row, OPERATION);
        if operation.is_empty() {
            return None;
        }
        Some(InspectionRow {
            operation,
            feature_no: self.field(row, FEATURE_NUMBER),
            drawing_ref: self.field(row, DRAWING_REF),
            description: self.field(row, DESCRIPTION),
        })
    }
}

/// Lowercase, trim and collapse inner whitespace (`"Feature\nNumber"` ->
/// `"feature number"`).
fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Every row of a plan sheet that carries an operation.
pub fn plan_rows(rows: &[Vec<RawCell>]) -> Vec<InspectionRow> {
    let Some(labels) = rows.get(LABEL_ROW) else {
        return Vec::new();
    };
    let columns = PlanColumns::from_labels(labels);
    rows.iter()
        .skip(LABEL_ROW + 1)
        .filter_map(|row| columns.map_row(row))
        .collect()
}
