use std::io::Cursor;

use calamine::{Data, Range, Reader};

use crate::error::InspexError;
use crate::extraction::WorkbookReader;
use crate::model::{RawCell, Sheet, Workbook};

/// Workbook reader for xls, xlsx, xlsm and xlsb files.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineReader;

impl WorkbookReader for CalamineReader {
    fn open_workbook(&self, bytes: &[u8]) -> Result<Workbook, InspexError> {
        let cursor = Cursor::new(bytes);
        let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
            .map_err(|e| InspexError::decode("spreadsheet", format!("failed to open workbook: {e}")))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name).map_err(|e| {
                InspexError::decode("spreadsheet", format!("failed to read sheet '{name}': {e}"))
            })?;
            sheets.push(Sheet::new(name, range_to_rows(&range)));
        }

        tracing::debug!(sheets = sheets.len(), "workbook opened");
        Ok(Workbook { sheets })
    }
}

/// Lay a used range out in absolute coordinates.
///
/// calamine ranges begin at the first used cell; leading rows and columns
/// are padded so `rows[r][c]` is spreadsheet cell (r + 1, c + 1).
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<RawCell>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut rows: Vec<Vec<RawCell>> = (0..start_row).map(|_| Vec::new()).collect();
    for row in range.rows() {
        let mut cells = vec![RawCell::Empty; start_col as usize];
        cells.extend(row.iter().map(to_raw_cell));
        rows.push(cells);
    }
    rows
}

fn to_raw_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Int(i) => RawCell::Int(*i),
        Data::Float(f) => RawCell::Float(*f),
        _ => RawCell::Text(cell.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_padding_to_absolute_coordinates() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("Feature".into()));
        range.set_value((3, 2), Data::Float(12.5));

        let rows = range_to_rows(&range);
        assert_eq!(rows.len(), 4);
        assert!(rows[0].is_empty());
        assert_eq!(rows[2][0], RawCell::Empty);
        assert_eq!(rows[2][1], RawCell::Text("Feature".into()));
        assert_eq!(rows[3][2], RawCell::Float(12.5));
    }

    #[test]
    fn test_empty_range() {
        let range: Range<Data> = Range::empty();
        assert!(range_to_rows(&range).is_empty());
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = CalamineReader.open_workbook(b"not a workbook").unwrap_err();
        assert!(matches!(err, InspexError::Decode { .. }));
    }
}
