//! OCR through the Tesseract CLI.
//!
//! Images are converted to grayscale and contrast-stretched before they are
//! handed to the engine. The engine never fails a request: a missing binary,
//! a crash or unreadable output all come back as empty text.

use crate::extraction::{OcrEngine, OcrSettings};
use image::{DynamicImage, GrayImage};
use std::process::Command;

/// Tesseract invoked as an external process.
pub struct TesseractCli {
    binary: String,
}

impl TesseractCli {
    pub fn new(binary: impl Into<String>) -> Self {
        TesseractCli {
            binary: binary.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn run(&self, image: &GrayImage, settings: &OcrSettings) -> Result<String, String> {
        let input = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .map_err(|e| format!("temp file: {e}"))?;
        image
            .save_with_format(input.path(), image::ImageFormat::Png)
            .map_err(|e| format!("encode image: {e}"))?;

        let output = Command::new(&self.binary)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&settings.language)
            .arg("--oem")
            .arg(settings.engine_mode.to_string())
            .arg("--psm")
            .arg(settings.page_segmentation.to_string())
            .output()
            .map_err(|e| format!("failed to run {}: {e}", self.binary))?;

        if !output.status.success() {
            return Err(format!(
                "exit code {}: {}",
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl OcrEngine for TesseractCli {
    fn recognize_text(&self, image: &GrayImage, settings: &OcrSettings) -> String {
        match self.run(image, settings) {
            Ok(text) => text,
            Err(reason) => {
                tracing::warn!(%reason, psm = settings.page_segmentation, "OCR produced no text");
                String::new()
            }
        }
    }

    fn engine_name(&self) -> &str {
        "tesseract"
    }
}

/// Grayscale the image and scale pixel distance from the mean luminance by
/// `contrast` (1.0 leaves the image unchanged).
pub fn prepare_image(image: &DynamicImage, contrast: f32) -> GrayImage {
    let mut gray = image.to_luma8();
    let count = u64::from(gray.width()) * u64::from(gray.height());
    if count == 0 {
        return gray;
    }

    let sum: u64 = gray.pixels().map(|p| u64::from(p.0[0])).sum();
    let mean = (sum as f32 / count as f32 + 0.5).floor();
    for p in gray.pixels_mut() {
        let v = mean + contrast * (f32::from(p.0[0]) - mean);
        p.0[0] = v.round().clamp(0.0, 255.0) as u8;
    }
    gray
}

/// Prepare an image, recognize it and trim the result.
pub fn ocr_image(
    engine: &dyn OcrEngine,
    image: &DynamicImage,
    settings: &OcrSettings,
    contrast: f32,
) -> String {
    let prepared = prepare_image(image, contrast);
    let text = engine.recognize_text(&prepared, settings);
    tracing::debug!(
        engine = engine.engine_name(),
        chars = text.len(),
        "OCR finished"
    );
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn settings() -> OcrSettings {
        OcrSettings {
            page_segmentation: 4,
            engine_mode: 3,
            language: "eng".into(),
        }
    }

    #[test]
    fn test_prepare_image_stretches_around_mean() {
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(0, 0, Luma([100]));
        img.put_pixel(1, 0, Luma([150]));
        let out = prepare_image(&DynamicImage::ImageLuma8(img), 2.0);
        // mean 125: 125 + 2 * (100 - 125) = 75, 125 + 2 * 25 = 175
        assert_eq!(out.get_pixel(0, 0).0[0], 75);
        assert_eq!(out.get_pixel(1, 0).0[0], 175);
    }

    #[test]
    fn test_prepare_image_clamps_and_grays() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([0, 0, 0]));
        img.put_pixel(1, 0, Rgb([255, 255, 255]));
        let out = prepare_image(&DynamicImage::ImageRgb8(img), 4.0);
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert_eq!(out.get_pixel(1, 0).0[0], 255);
    }

    #[test]
    fn test_missing_tesseract_yields_empty_text() {
        let engine = TesseractCli::new("/nonexistent/tesseract");
        assert!(!engine.is_available());
        let img = DynamicImage::ImageLuma8(GrayImage::new(4, 4));
        assert_eq!(ocr_image(&engine, &img, &settings(), 2.0), "");
    }
}
