//! End-to-end tests for the extraction pipeline, CMM merge and row stream.
//!
//! PDF, OCR and workbook capabilities are replaced by in-memory fakes, so
//! none of these tests need poppler-utils or tesseract.

use std::sync::{Arc, Mutex};

use image::{DynamicImage, GrayImage};
use inspex_core::error::InspexError;
use inspex_core::extraction::{OcrEngine, OcrSettings, PageContent, PdfExtractor, WorkbookReader};
use inspex_core::model::{ExtractionResult, InspectionRow, RawCell, Sheet, Workbook};
use inspex_core::parsing::header::{ColumnFamily, HeaderRules, MatchTier, SynonymRule};
use inspex_core::parsing::normalize::normalize_feature_key;
use inspex_core::{parse_cmm_report, InspexConfig, Pipeline};

struct MockExtractor {
    pages: Vec<PageContent>,
}

impl PdfExtractor for MockExtractor {
    fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageContent>, InspexError> {
        Ok(self.pages.clone())
    }

    fn rasterize_page(&self, _: &[u8], _: usize, _: u32) -> Result<DynamicImage, InspexError> {
        Ok(DynamicImage::ImageLuma8(GrayImage::new(8, 8)))
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

/// Returns canned text and records the settings of every request.
struct MockOcr {
    text: String,
    requests: Arc<Mutex<Vec<OcrSettings>>>,
}

impl OcrEngine for MockOcr {
    fn recognize_text(&self, _: &GrayImage, settings: &OcrSettings) -> String {
        self.requests.lock().unwrap().push(settings.clone());
        self.text.clone()
    }

    fn engine_name(&self) -> &str {
        "mock"
    }
}

struct MemoryWorkbook(Workbook);

impl WorkbookReader for MemoryWorkbook {
    fn open_workbook(&self, _bytes: &[u8]) -> Result<Workbook, InspexError> {
        Ok(self.0.clone())
    }
}

fn page(number: usize, lines: &[&str]) -> PageContent {
    PageContent {
        page_number: number,
        lines: lines.iter().map(|s| s.to_string()).collect(),
    }
}

fn cells(values: &[&str]) -> Vec<RawCell> {
    values
        .iter()
        .map(|v| if v.is_empty() { RawCell::Empty } else { RawCell::from(*v) })
        .collect()
}

struct Fixture {
    pipeline: Pipeline,
    ocr_requests: Arc<Mutex<Vec<OcrSettings>>>,
}

fn fixture(pages: Vec<PageContent>, ocr_text: &str, workbook: Workbook) -> Fixture {
    let ocr_requests = Arc::new(Mutex::new(Vec::new()));
    let pipeline = Pipeline::new(
        Box::new(MemoryWorkbook(workbook)),
        Box::new(MockExtractor { pages }),
        Box::new(MockOcr {
            text: ocr_text.to_string(),
            requests: ocr_requests.clone(),
        }),
        InspexConfig::default(),
    );
    Fixture {
        pipeline,
        ocr_requests,
    }
}

fn plan_workbook() -> Workbook {
    let plan = Sheet::new(
        "Sheet2",
        vec![
            cells(&["Inspection Planning Sheet"]),
            cells(&["Operation", "Feature\nNumber", "Drawing Ref", "Description"]),
            cells(&["10", "12-3", "SHEET1", "Check bore"]),
            cells(&["20", "AB12", "", "Visual"]),
            cells(&["", "99", "", "no operation"]),
            cells(&["30", "", "", "Deburr"]),
        ],
    );
    let cover = Sheet::new("Sheet1", vec![cells(&["Cover page"])]);
    Workbook {
        sheets: vec![cover, plan],
    }
}

// ---------------------------------------------------------------------------
// PDF planning sheets
// ---------------------------------------------------------------------------
#[test]
fn planning_pdf_reconstructs_rows_from_native_text() {
    let f = fixture(
        vec![page(
            1,
            &[
                "0010 140-1 SHEET2 Check bore",
                "   diameter 12.5",
                "",
                "0020 141 Deburr all edges",
            ],
        )],
        "",
        Workbook::default(),
    );

    let result = f
        .pipeline
        .extract("Inspection Planning Sheet - 4711.pdf", b"%PDF")
        .unwrap();

    assert_eq!(
        result,
        ExtractionResult::ExtractedData(vec![
            InspectionRow {
                operation: "0010".into(),
                feature_no: "140-1".into(),
                drawing_ref: "SHEET2".into(),
                description: "Check bore diameter 12.5".into(),
            },
            InspectionRow {
                operation: "0020".into(),
                feature_no: "141".into(),
                drawing_ref: "".into(),
                description: "Deburr all edges".into(),
            },
        ])
    );
    assert!(f.ocr_requests.lock().unwrap().is_empty());
}

#[test]
fn scanned_planning_page_is_read_with_ocr() {
    let f = fixture(
        vec![page(1, &["  "])],
        "0110 7 SHEET3 Measure flatness\n",
        Workbook::default(),
    );

    let result = f
        .pipeline
        .extract("inspection planning sheet.pdf", b"%PDF")
        .unwrap();

    match result {
        ExtractionResult::ExtractedData(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].drawing_ref, "SHEET3");
            assert_eq!(rows[0].description, "Measure flatness");
        }
        other => panic!("expected rows, got {other:?}"),
    }
    let requests = f.ocr_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].page_segmentation, 4);
    assert_eq!(requests[0].engine_mode, 3);
}

#[test]
fn planning_pdf_without_rows_falls_back_to_text() {
    let prose = "This drawing set contains general notes and no operation table at all.";
    let f = fixture(vec![page(1, &[prose])], "", Workbook::default());

    let result = f
        .pipeline
        .extract("Inspection Planning Sheet.pdf", b"%PDF")
        .unwrap();

    assert_eq!(result, ExtractionResult::ExtractedText(format!("{prose}\n\n")));
}

#[test]
fn generic_pdf_returns_text_even_with_row_shapes() {
    let f = fixture(
        vec![page(1, &["0010 140-1 SHEET2 Check bore diameter"])],
        "",
        Workbook::default(),
    );

    let result = f.pipeline.extract("drawing.pdf", b"%PDF").unwrap();

    assert!(matches!(result, ExtractionResult::ExtractedText(_)));
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------
#[test]
fn image_is_read_with_page_segmentation() {
    let f = fixture(vec![], "  Part 4711 rev B \n", Workbook::default());
    let mut png = Vec::new();
    DynamicImage::ImageLuma8(GrayImage::new(4, 4))
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();

    let result = f.pipeline.extract("scan.png", &png).unwrap();

    assert_eq!(result, ExtractionResult::ExtractedText("Part 4711 rev B".into()));
    let requests = f.ocr_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].page_segmentation, 4);
    assert_eq!(requests[0].engine_mode, 3);
    assert_eq!(requests[0].language, "eng");
}

// ---------------------------------------------------------------------------
// Spreadsheet plans and streaming
// ---------------------------------------------------------------------------
#[test]
fn spreadsheet_uses_designated_sheet_and_keeps_all_operations() {
    let f = fixture(vec![], "", plan_workbook());

    let result = f.pipeline.extract("plan.xlsm", b"").unwrap();

    let ExtractionResult::ExtractedData(rows) = result else {
        panic!("expected rows");
    };
    let features: Vec<_> = rows.iter().map(|r| r.feature_no.as_str()).collect();
    assert_eq!(features, vec!["12-3", "AB12", ""]);
    assert_eq!(rows[0].drawing_ref, "SHEET1");
}

#[test]
fn stream_keeps_only_numeric_features() {
    let f = fixture(vec![], "", plan_workbook());
    let mut out = Vec::new();

    let written = f.pipeline.stream_plan("plan.xlsx", b"", &mut out).unwrap();

    assert_eq!(written, 1);
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["extracted_data"][0]["feature_no"], "12-3");
    assert_eq!(json["extracted_data"].as_array().unwrap().len(), 1);
}

#[test]
fn stream_rejects_non_spreadsheet_before_writing() {
    let f = fixture(vec![], "", plan_workbook());
    let mut out = Vec::new();

    let err = f.pipeline.stream_plan("plan.pdf", b"%PDF", &mut out).unwrap_err();

    assert!(matches!(err, InspexError::UnsupportedInput(_)));
    assert!(out.is_empty());
}

// ---------------------------------------------------------------------------
// CMM reports
// ---------------------------------------------------------------------------
fn cmm_workbook() -> Workbook {
    let detailed = Sheet::new(
        "Detail",
        vec![
            cells(&["CMM report", "Part 4711"]),
            cells(&[""]),
            cells(&["Char. No", "Nominal", "Actual"]),
            cells(&["#140-1", "12.5", ""]),
            cells(&["140-2 REF ONLY", "3", "3.01"]),
            cells(&["141", "8", "7.98 mm"]),
        ],
    );
    // No header row: columns found by content.
    let summary = Sheet::new(
        "Summary",
        vec![
            vec!["140-1".into(), RawCell::Float(12.49)],
            vec!["141".into(), RawCell::Float(8.02)],
            vec!["142".into(), RawCell::Float(4.0)],
        ],
    );
    let notes = Sheet::new("Notes", vec![cells(&["Operator", "J. Doe"])]);
    Workbook {
        sheets: vec![detailed, summary, notes],
    }
}

#[test]
fn cmm_merge_across_sheets() {
    let report = parse_cmm_report(b"", &MemoryWorkbook(cmm_workbook())).unwrap();

    assert_eq!(report.feature_actual_map["140-1"], "12.49");
    assert_eq!(report.feature_actual_map["141"], "7.98");
    assert_eq!(report.feature_actual_map["142"], "4");
    assert_eq!(report.feature_range_map["141"].min, 7.98);
    assert_eq!(report.feature_range_map["141"].max, 8.02);
    assert!(report.refer_only_keys.contains("140-2"));
    assert_eq!(report.detector_debug.len(), 3);
    assert_eq!(report.detector_debug[0].detection.header_row_idx, Some(3));
    assert_eq!(report.detector_debug[1].detection.header_row_idx, None);
    assert_eq!(report.detector_debug[1].detection.feature_col_idx, Some(0));
    assert_eq!(report.detector_debug[1].detection.actual_col_idx, Some(1));
}

#[test]
fn cmm_keys_are_canonical() {
    let report = parse_cmm_report(b"", &MemoryWorkbook(cmm_workbook())).unwrap();

    for key in report.feature_actual_map.keys() {
        assert!(!key.is_empty());
        assert_eq!(&normalize_feature_key(key), key);
    }
    for (key, range) in &report.feature_range_map {
        assert!(report.feature_actual_map.contains_key(key));
        assert!(range.min <= range.max);
    }
}

#[test]
fn cmm_without_structure_reports_trace() {
    let workbook = Workbook {
        sheets: vec![
            Sheet::new("A", vec![cells(&["Title only"])]),
            Sheet::new("B", vec![]),
        ],
    };

    let err = parse_cmm_report(b"", &MemoryWorkbook(workbook)).unwrap_err();

    match err {
        InspexError::StructureNotFound { trace } => {
            let names: Vec<_> = trace.iter().map(|t| t.sheet.as_str()).collect();
            assert_eq!(names, vec!["A", "B"]);
            assert!(trace.iter().all(|t| t.detection.columns().is_none()));
        }
        other => panic!("expected StructureNotFound, got {other:?}"),
    }
}

#[test]
fn cmm_report_serializes_with_public_field_names() {
    let report = parse_cmm_report(b"", &MemoryWorkbook(cmm_workbook())).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["feature_range_map"]["141"]["min"], 7.98);
    assert_eq!(json["refer_only_keys"][0], "140-2");
    assert_eq!(json["detector_debug"][0]["sheet"], "Detail");
    assert_eq!(json["detector_debug"][0]["feature_col_idx"], 0);
    assert_eq!(json["detector_debug"][0]["actual_col_idx"], 2);
}

#[test]
fn cmm_uses_injected_header_rules() {
    let workbook = Workbook {
        sheets: vec![Sheet::new(
            "Custom",
            vec![cells(&["Item", "Reading"]), cells(&["12-4", "0.75"])],
        )],
    };
    let f = fixture(vec![], "", workbook);

    let err = f.pipeline.parse_cmm("cmm.xlsx", b"").unwrap_err();
    assert!(matches!(err, InspexError::StructureNotFound { .. }));

    let rules = HeaderRules::new(vec![
        SynonymRule::new(ColumnFamily::Feature, MatchTier::Synonym, r"^item$", 2).unwrap(),
        SynonymRule::new(ColumnFamily::Actual, MatchTier::Synonym, r"^reading$", 2).unwrap(),
    ]);
    let report = f.pipeline.with_rules(rules).parse_cmm("cmm.xlsx", b"").unwrap();

    assert_eq!(report.feature_actual_map["12-4"], "0.75");
    assert_eq!(report.detector_debug[0].detection.header_row_idx, Some(1));
}
