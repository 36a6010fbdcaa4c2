use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A single spreadsheet cell as read from a workbook.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawCell {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
}

impl RawCell {
    /// Text form of the cell, `None` when the cell is absent.
    ///
    /// Floats with an integral value print without a fractional part
    /// (`12.0` -> `"12"`), which is how spreadsheet readers hand back
    /// whole numbers.
    pub fn to_text(&self) -> Option<String> {
        match self {
            RawCell::Empty => None,
            RawCell::Text(s) => Some(s.clone()),
            RawCell::Int(i) => Some(i.to_string()),
            RawCell::Float(f) => Some(f.to_string()),
        }
    }

    /// True for absent cells and cells whose text is only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            RawCell::Int(_) | RawCell::Float(_) => false,
        }
    }
}

impl fmt::Display for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(s) => write!(f, "{s}"),
            None => Ok(()),
        }
    }
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        RawCell::Text(s.to_string())
    }
}

impl From<String> for RawCell {
    fn from(s: String) -> Self {
        RawCell::Text(s)
    }
}

impl From<i64> for RawCell {
    fn from(i: i64) -> Self {
        RawCell::Int(i)
    }
}

impl From<f64> for RawCell {
    fn from(f: f64) -> Self {
        RawCell::Float(f)
    }
}

/// One worksheet in absolute coordinates: `rows[0]` is spreadsheet row 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<RawCell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Sheet {
            name: name.into(),
            rows,
        }
    }

    /// Cell at a zero-based position; out-of-range positions read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &RawCell {
        static EMPTY: RawCell = RawCell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }
}

/// Sheets in their declared workbook order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// The named sheet when present, otherwise the first one.
    pub fn designated_or_first(&self, name: &str) -> Option<&Sheet> {
        self.sheet(name).or_else(|| self.sheets.first())
    }
}

/// A logical row of an inspection plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionRow {
    pub operation: String,
    pub feature_no: String,
    pub drawing_ref: String,
    pub description: String,
}

/// Closed interval of every numeric actual seen for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
}

impl FeatureRange {
    pub fn point(v: f64) -> Self {
        FeatureRange { min: v, max: v }
    }

    pub fn include(&mut self, v: f64) {
        if v < self.min {
            self.min = v;
        }
        if v > self.max {
            self.max = v;
        }
    }
}

/// Where the header detector located the columns of one sheet.
///
/// `header_row_idx` is the 1-based spreadsheet row number; the column
/// indices are zero-based. All three are `None` when nothing was detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDetection {
    pub header_row_idx: Option<usize>,
    pub feature_col_idx: Option<usize>,
    pub actual_col_idx: Option<usize>,
}

impl ColumnDetection {
    pub fn undetected() -> Self {
        ColumnDetection::default()
    }

    /// Both columns are known, so the sheet can be read.
    pub fn columns(&self) -> Option<(usize, usize)> {
        Some((self.feature_col_idx?, self.actual_col_idx?))
    }
}

/// Detection outcome recorded for every sheet, used or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetDetection {
    pub sheet: String,
    #[serde(flatten)]
    pub detection: ColumnDetection,
}

/// Merged view of a CMM workbook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CmmReport {
    pub feature_actual_map: IndexMap<String, String>,
    pub feature_range_map: IndexMap<String, FeatureRange>,
    pub refer_only_keys: BTreeSet<String>,
    pub detector_debug: Vec<SheetDetection>,
}

/// Result of the document extraction pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionResult {
    ExtractedData(Vec<InspectionRow>),
    ExtractedText(String),
}

/// Document families accepted by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Spreadsheet,
    Pdf,
    Image,
    Word,
}

impl DocumentKind {
    /// Detect the document family from a file name's extension.
    pub fn from_filename(name: &str) -> Option<DocumentKind> {
        let lower = name.to_lowercase();
        let ext = lower.rsplit_once('.').map(|(_, e)| e)?;
        match ext {
            "xlsx" | "xlsm" | "xls" => Some(DocumentKind::Spreadsheet),
            "pdf" => Some(DocumentKind::Pdf),
            "png" | "jpg" | "jpeg" => Some(DocumentKind::Image),
            "docx" => Some(DocumentKind::Word),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Spreadsheet => write!(f, "spreadsheet"),
            DocumentKind::Pdf => write!(f, "PDF"),
            DocumentKind::Image => write!(f, "image"),
            DocumentKind::Word => write!(f, "word-processor"),
        }
    }
}
