use crate::error::InspexError;
use crate::extraction::{PageContent, PdfExtractor};
use image::DynamicImage;
use std::io::Write;
use std::process::{Command, Output};

/// PDF backend built on poppler-utils.
///
/// Text comes from `pdftotext -layout`, page images from `pdftoppm`.
pub struct PdftotextExtractor {
    pdftotext: String,
    pdftoppm: String,
}

impl PdftotextExtractor {
    pub fn new() -> Self {
        Self::with_paths("pdftotext", "pdftoppm")
    }

    pub fn with_paths(pdftotext: impl Into<String>, pdftoppm: impl Into<String>) -> Self {
        PdftotextExtractor {
            pdftotext: pdftotext.into(),
            pdftoppm: pdftoppm.into(),
        }
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available(&self) -> bool {
        Command::new(&self.pdftotext)
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn write_temp_pdf(pdf_bytes: &[u8]) -> Result<tempfile::NamedTempFile, InspexError> {
    let mut tmpfile = tempfile::Builder::new().suffix(".pdf").tempfile()?;
    tmpfile.write_all(pdf_bytes)?;
    tmpfile.flush()?;
    Ok(tmpfile)
}

fn run_tool(tool: &str, command: &mut Command) -> Result<Output, InspexError> {
    let output = command.output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            InspexError::ToolNotFound {
                tool: tool.to_string(),
            }
        } else {
            InspexError::decode("PDF", format!("{tool} failed: {e}"))
        }
    })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(InspexError::decode(
            "PDF",
            format!("{tool} exited with code {code}: {}", stderr.trim()),
        ));
    }

    Ok(output)
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, InspexError> {
        let tmpfile = write_temp_pdf(pdf_bytes)?;

        let output = run_tool(
            &self.pdftotext,
            Command::new(&self.pdftotext)
                .arg("-layout")
                .arg(tmpfile.path())
                .arg("-"),
        )?;

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(split_pages(&text))
    }

    fn rasterize_page(
        &self,
        pdf_bytes: &[u8],
        page_number: usize,
        dpi: u32,
    ) -> Result<DynamicImage, InspexError> {
        let tmpfile = write_temp_pdf(pdf_bytes)?;
        let out_dir = tempfile::tempdir()?;
        let prefix = out_dir.path().join("page");
        let page = page_number.to_string();

        run_tool(
            &self.pdftoppm,
            Command::new(&self.pdftoppm)
                .arg("-r")
                .arg(dpi.to_string())
                .arg("-f")
                .arg(&page)
                .arg("-l")
                .arg(&page)
                .arg("-png")
                .arg("-singlefile")
                .arg(tmpfile.path())
                .arg(&prefix),
        )?;

        let png = prefix.with_extension("png");
        image::open(&png).map_err(|e| InspexError::decode("PDF", format!("page {page_number} image: {e}")))
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Split pdftotext output into pages.
///
/// pdftotext ends every page with a form feed, so the piece after the last
/// one is dropped when empty. Pages without text are kept since they are the
/// ones that need OCR.
fn split_pages(text: &str) -> Vec<PageContent> {
    let mut chunks: Vec<&str> = text.split('\x0c').collect();
    if chunks.len() > 1 && chunks.last().is_some_and(|c| c.trim().is_empty()) {
        chunks.pop();
    }

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, page_text)| PageContent {
            page_number: i + 1,
            lines: page_text.lines().map(|l| l.to_string()).collect(),
        })
        .collect()
}
