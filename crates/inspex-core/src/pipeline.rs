//! Document dispatch: picks the extraction strategy from the file type and
//! wires the black-box capabilities together.

use std::collections::HashMap;
use std::io::Write;

use crate::cmm;
use crate::config::InspexConfig;
use crate::error::InspexError;
use crate::extraction::ocr::{ocr_image, TesseractCli};
use crate::extraction::pdftotext::PdftotextExtractor;
use crate::extraction::workbook::CalamineReader;
use crate::extraction::{docx, OcrEngine, OcrSettings, PageContent, PdfExtractor, WorkbookReader};
use crate::model::{CmmReport, DocumentKind, ExtractionResult, Workbook};
use crate::parsing::header::HeaderRules;
use crate::parsing::plan::plan_rows;
use crate::parsing::rows::reconstruct_rows;
use crate::stream::{write_rows, PlanRowStream};

pub struct Pipeline {
    workbooks: Box<dyn WorkbookReader>,
    pdf: Box<dyn PdfExtractor>,
    ocr: Box<dyn OcrEngine>,
    rules: HeaderRules,
    config: InspexConfig,
}

impl Pipeline {
    pub fn new(
        workbooks: Box<dyn WorkbookReader>,
        pdf: Box<dyn PdfExtractor>,
        ocr: Box<dyn OcrEngine>,
        config: InspexConfig,
    ) -> Self {
        let rules = HeaderRules::builtin().with_max_scan_rows(config.detector.max_scan_rows);
        Pipeline {
            workbooks,
            pdf,
            ocr,
            rules,
            config,
        }
    }

    /// Pipeline backed by calamine, poppler-utils and the tesseract CLI at
    /// the configured paths.
    pub fn from_config(config: InspexConfig) -> Self {
        let pdf = PdftotextExtractor::with_paths(&config.ocr.pdftotext_path, &config.ocr.pdftoppm_path);
        let ocr = TesseractCli::new(&config.ocr.tesseract_path);
        Self::new(Box::new(CalamineReader), Box::new(pdf), Box::new(ocr), config)
    }

    /// Replace the header vocabulary used by [`Pipeline::parse_cmm`].
    pub fn with_rules(mut self, rules: HeaderRules) -> Self {
        self.rules = rules;
        self
    }

    /// Extract structured rows or plain text from one uploaded document.
    pub fn extract(&self, filename: &str, bytes: &[u8]) -> Result<ExtractionResult, InspexError> {
        let kind = document_kind(filename)?;
        tracing::debug!(filename, %kind, bytes = bytes.len(), "extracting document");

        let result = match kind {
            DocumentKind::Spreadsheet => self.extract_spreadsheet(bytes)?,
            DocumentKind::Pdf => self.extract_pdf(filename, bytes)?,
            DocumentKind::Image => {
                let image = decode_image(bytes)?;
                let text = ocr_image(
                    self.ocr.as_ref(),
                    &image,
                    &self.settings(self.config.ocr.page_segmentation),
                    self.config.ocr.contrast,
                );
                ExtractionResult::ExtractedText(text)
            }
            DocumentKind::Word => ExtractionResult::ExtractedText(docx::paragraph_text(bytes)?),
        };

        match &result {
            ExtractionResult::ExtractedData(rows) => {
                tracing::info!(filename, rows = rows.len(), "extracted structured rows")
            }
            ExtractionResult::ExtractedText(text) => {
                tracing::info!(filename, chars = text.len(), "extracted text")
            }
        }
        Ok(result)
    }

    /// Stream the designated plan sheet of a spreadsheet into `out`.
    ///
    /// Input problems are reported before the first byte is written.
    pub fn stream_plan<W: Write>(
        &self,
        filename: &str,
        bytes: &[u8],
        out: &mut W,
    ) -> Result<usize, InspexError> {
        let workbook = self.open_spreadsheet(filename, bytes)?;
        match workbook.designated_or_first(&self.config.designated_sheet) {
            Some(sheet) => write_rows(PlanRowStream::new(sheet), out),
            None => write_rows(std::iter::empty(), out),
        }
    }

    /// OCR a user-cropped image region.
    pub fn ocr_region(&self, bytes: &[u8]) -> Result<String, InspexError> {
        let image = decode_image(bytes)?;
        Ok(ocr_image(
            self.ocr.as_ref(),
            &image,
            &self.settings(self.config.ocr.region_segmentation),
            self.config.ocr.contrast,
        ))
    }

    /// Merge the feature/actual columns of every sheet of a CMM workbook.
    pub fn parse_cmm(&self, filename: &str, bytes: &[u8]) -> Result<CmmReport, InspexError> {
        let workbook = self.open_spreadsheet(filename, bytes)?;
        cmm::merge_workbook(&workbook, &self.rules)
    }

    fn open_spreadsheet(&self, filename: &str, bytes: &[u8]) -> Result<Workbook, InspexError> {
        if document_kind(filename)? != DocumentKind::Spreadsheet {
            return Err(InspexError::UnsupportedInput(format!(
                "only spreadsheet files are supported here, got '{filename}'"
            )));
        }
        self.workbooks.open_workbook(bytes)
    }

    fn extract_spreadsheet(&self, bytes: &[u8]) -> Result<ExtractionResult, InspexError> {
        let workbook = self.workbooks.open_workbook(bytes)?;
        let rows = workbook
            .designated_or_first(&self.config.designated_sheet)
            .map(|sheet| {
                tracing::debug!(sheet = %sheet.name, "reading plan sheet");
                plan_rows(&sheet.rows)
            })
            .unwrap_or_default();
        Ok(ExtractionResult::ExtractedData(rows))
    }

    fn extract_pdf(&self, filename: &str, bytes: &[u8]) -> Result<ExtractionResult, InspexError> {
        let pages = self.pdf.extract_pages(bytes)?;
        tracing::debug!(
            backend = self.pdf.backend_name(),
            pages = pages.len(),
            "PDF text extracted"
        );
        let mut recognized = HashMap::new();

        let marker = self.config.pdf.planning_marker.to_lowercase();
        if !marker.is_empty() && filename.to_lowercase().contains(&marker) {
            let mut full_text = String::new();
            for page in &pages {
                let text = self.page_text(
                    bytes,
                    page,
                    self.config.pdf.ocr_threshold_planning,
                    &mut recognized,
                );
                full_text.push_str(&text);
                full_text.push('\n');
            }
            let rows = reconstruct_rows(&full_text);
            if !rows.is_empty() {
                return Ok(ExtractionResult::ExtractedData(rows));
            }
            tracing::debug!(filename, "no planning rows recognized, returning text");
        }

        let mut text = String::new();
        for page in &pages {
            text.push_str(&self.page_text(
                bytes,
                page,
                self.config.pdf.ocr_threshold_generic,
                &mut recognized,
            ));
            text.push_str("\n\n");
        }
        Ok(ExtractionResult::ExtractedText(text))
    }

    /// Native text of a page, or its OCR text when the native text is
    /// shorter than `threshold` characters.
    ///
    /// OCR output is kept in `recognized` so a page is rasterized at most
    /// once per document.
    fn page_text(
        &self,
        bytes: &[u8],
        page: &PageContent,
        threshold: usize,
        recognized: &mut HashMap<usize, String>,
    ) -> String {
        let native = page.text().trim().to_string();
        if native.chars().count() >= threshold {
            return native;
        }
        if let Some(text) = recognized.get(&page.page_number) {
            return text.clone();
        }

        tracing::debug!(page = page.page_number, chars = native.len(), "page below text threshold, running OCR");
        let text = match self.pdf.rasterize_page(bytes, page.page_number, self.config.pdf.dpi) {
            Ok(image) => ocr_image(
                self.ocr.as_ref(),
                &image,
                &self.settings(self.config.ocr.page_segmentation),
                self.config.ocr.contrast,
            ),
            Err(e) => {
                tracing::warn!(page = page.page_number, error = %e, "page rasterization failed, keeping native text");
                native
            }
        };
        recognized.insert(page.page_number, text.clone());
        text
    }

    fn settings(&self, page_segmentation: u8) -> OcrSettings {
        OcrSettings {
            page_segmentation,
            engine_mode: self.config.ocr.engine_mode,
            language: self.config.ocr.language.clone(),
        }
    }
}

fn document_kind(filename: &str) -> Result<DocumentKind, InspexError> {
    DocumentKind::from_filename(filename)
        .ok_or_else(|| InspexError::UnsupportedInput(format!("unsupported file type: '{filename}'")))
}

fn decode_image(bytes: &[u8]) -> Result<image::DynamicImage, InspexError> {
    image::load_from_memory(bytes).map_err(|e| InspexError::decode("image", e))
}
