pub mod docx;
pub mod ocr;
pub mod pdftotext;
pub mod workbook;

use crate::error::InspexError;
use crate::model::Workbook;
use image::{DynamicImage, GrayImage};

/// Content extracted from a single page of a PDF.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub page_number: usize,
    pub lines: Vec<String>,
}

impl PageContent {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Trait for PDF backends: native text per page and page rasterization.
pub trait PdfExtractor: Send + Sync {
    /// Extract text content from PDF bytes, returning one PageContent per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, InspexError>;

    /// Render one page (1-based) to an image at the given resolution.
    fn rasterize_page(
        &self,
        pdf_bytes: &[u8],
        page_number: usize,
        dpi: u32,
    ) -> Result<DynamicImage, InspexError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Engine options passed with every recognition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrSettings {
    pub page_segmentation: u8,
    pub engine_mode: u8,
    pub language: String,
}

/// Optical character recognition as a black box.
///
/// Recognition is best effort: failures surface as empty text, never as
/// errors.
pub trait OcrEngine: Send + Sync {
    fn recognize_text(&self, image: &GrayImage, settings: &OcrSettings) -> String;

    fn engine_name(&self) -> &str;
}

/// Turns spreadsheet bytes into sheets.
pub trait WorkbookReader: Send + Sync {
    fn open_workbook(&self, bytes: &[u8]) -> Result<Workbook, InspexError>;
}
