//! Incremental delivery of inspection plan rows.
//!
//! Rows are produced one at a time and written as a JSON document of the
//! form `{"extracted_data":[row, row, ...]}`. A written row is never taken
//! back; if writing fails midway the output simply stops after the last
//! complete row.

use std::io::Write;

use crate::error::InspexError;
use crate::model::{InspectionRow, RawCell, Sheet};
use crate::parsing::plan::{PlanColumns, LABEL_ROW};

const OPEN: &[u8] = br#"{"extracted_data":["#;
const CLOSE: &[u8] = b"]}";

/// Lazily mapped rows of a plan sheet, keeping only numeric feature numbers.
pub struct PlanRowStream<'a> {
    columns: PlanColumns,
    rows: std::slice::Iter<'a, Vec<RawCell>>,
}

impl<'a> PlanRowStream<'a> {
    pub fn new(sheet: &'a Sheet) -> Self {
        let columns = sheet
            .rows
            .get(LABEL_ROW)
            .map(|labels| PlanColumns::from_labels(labels))
            .unwrap_or_default();
        let data = sheet.rows.get(LABEL_ROW + 1..).unwrap_or(&[]);
        PlanRowStream {
            columns,
            rows: data.iter(),
        }
    }
}

impl Iterator for PlanRowStream<'_> {
    type Item = InspectionRow;

    fn next(&mut self) -> Option<InspectionRow> {
        for row in self.rows.by_ref() {
            match self.columns.map_row(row) {
                Some(mapped) if is_numeric_feature(&mapped.feature_no) => return Some(mapped),
                _ => continue,
            }
        }
        None
    }
}

/// At least one digit and no letters: `"12-3"` passes, `"AB12"` does not.
pub fn is_numeric_feature(feature_no: &str) -> bool {
    feature_no.chars().any(|c| c.is_ascii_digit())
        && !feature_no.chars().any(|c| c.is_ascii_alphabetic())
}

/// Write rows as a JSON array under `extracted_data`, flushing after each.
///
/// Each row, with its leading separator, goes out in a single write, so a
/// failing writer never receives part of a row. Returns the number of rows
/// written.
pub fn write_rows<W, I>(rows: I, out: &mut W) -> Result<usize, InspexError>
where
    W: Write,
    I: IntoIterator<Item = InspectionRow>,
{
    out.write_all(OPEN)?;
    out.flush()?;

    let mut written = 0;
    let mut buf = Vec::new();
    for row in rows {
        buf.clear();
        if written > 0 {
            buf.push(b',');
        }
        serde_json::to_writer(&mut buf, &row)?;
        out.write_all(&buf)?;
        out.flush()?;
        written += 1;
    }

    out.write_all(CLOSE)?;
    out.flush()?;
    tracing::debug!(rows = written, "row stream finished");
    Ok(written)
}
