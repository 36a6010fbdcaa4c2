use crate::error::InspexError;
use crate::parsing::header::DEFAULT_MAX_SCAN_ROWS;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "inspex.toml";

/// Prefix of environment overrides, e.g. `INSPEX_PDF__DPI=300`.
pub const ENV_PREFIX: &str = "INSPEX_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspexConfig {
    /// Upload ceiling enforced before any document is decoded.
    pub max_upload_bytes: u64,
    /// Directory holding `suppliers.json|xlsx|xlsm|xls|csv`.
    pub supplier_data_dir: PathBuf,
    pub supplier_limit: usize,
    /// Sheet read by the inspection-plan spreadsheet path when present.
    pub designated_sheet: String,
    pub log_level: String,
    pub pdf: PdfConfig,
    pub ocr: OcrConfig,
    pub detector: DetectorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    pub dpi: u32,
    /// Pages of a planning sheet with less native text than this are OCR'd.
    pub ocr_threshold_planning: usize,
    /// Same cut-off for generic PDFs.
    pub ocr_threshold_generic: usize,
    /// Lowercased file-name fragment selecting the planning-sheet layout.
    pub planning_marker: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub tesseract_path: String,
    pub pdftotext_path: String,
    pub pdftoppm_path: String,
    pub language: String,
    pub engine_mode: u8,
    /// Segmentation mode for whole pages and uploaded images.
    pub page_segmentation: u8,
    /// Segmentation mode for user-cropped regions.
    pub region_segmentation: u8,
    pub contrast: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub max_scan_rows: usize,
}

impl Default for InspexConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 20 * 1024 * 1024,
            supplier_data_dir: PathBuf::from("data"),
            supplier_limit: 10,
            designated_sheet: "Sheet2".to_string(),
            log_level: "info".to_string(),
            pdf: PdfConfig::default(),
            ocr: OcrConfig::default(),
            detector: DetectorConfig::default(),
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            ocr_threshold_planning: 50,
            ocr_threshold_generic: 20,
            planning_marker: "inspection planning sheet".to_string(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: "tesseract".to_string(),
            pdftotext_path: "pdftotext".to_string(),
            pdftoppm_path: "pdftoppm".to_string(),
            language: "eng".to_string(),
            engine_mode: 3,
            page_segmentation: 4,
            region_segmentation: 6,
            contrast: 2.0,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_scan_rows: DEFAULT_MAX_SCAN_ROWS,
        }
    }
}

impl InspexConfig {
    /// Layer defaults, an optional TOML file and `INSPEX_*` variables.
    ///
    /// With `path == None` the default file is used if it exists; an
    /// explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, InspexError> {
        let file = match path {
            Some(p) => {
                if !p.is_file() {
                    return Err(InspexError::Config(format!(
                        "config file {} does not exist",
                        p.display()
                    )));
                }
                p.to_path_buf()
            }
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        Self::figment(&file).extract().map_err(InspexError::from)
    }

    pub fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(InspexConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
