use crate::model::InspectionRow;
use crate::parsing::non_empty_lines;
use regex::Regex;
use std::sync::LazyLock;

/// A 3-4 digit operation number opening a line starts a new logical row.
static ROW_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3,4}\b").expect("valid boundary pattern"));

/// operation, feature token, optional `SHEET…` drawing reference, description.
static PLANNING_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,4})\s+(\S+)(?:\s+(SHEET[0-9A-Z\-]+))?\s+(.*)$")
        .expect("valid planning row pattern")
});

/// Group a line stream into logical rows.
///
/// Lines are trimmed and blank lines dropped. Each line that begins with an
/// operation number opens a new row; other lines are appended (space
/// separated) to the row currently open. Lines before the first boundary
/// form a row of their own.
pub fn group_rows<'a, I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut grouped = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in lines.into_iter().map(str::trim).filter(|l| !l.is_empty()) {
        if ROW_BOUNDARY.is_match(line) && !current.is_empty() {
            grouped.push(current.join(" "));
            current.clear();
        }
        current.push(line);
    }

    if !current.is_empty() {
        grouped.push(current.join(" "));
    }

    grouped
}

/// Parse one logical row; rows not matching the fixed shape yield `None`.
pub fn parse_planning_row(row: &str) -> Option<InspectionRow> {
    let caps = PLANNING_ROW.captures(row)?;
    Some(InspectionRow {
        operation: caps[1].to_string(),
        feature_no: caps[2].to_string(),
        drawing_ref: caps
            .get(3)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        description: caps[4].trim().to_string(),
    })
}

/// Reconstruct inspection rows from free text, silently dropping rows that
/// do not match.
pub fn reconstruct_rows(text: &str) -> Vec<InspectionRow> {
    group_rows(non_empty_lines(text))
        .iter()
        .filter_map(|row| parse_planning_row(row))
        .collect()
}
