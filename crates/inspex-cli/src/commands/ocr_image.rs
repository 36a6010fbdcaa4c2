use inspex_core::error::InspexError;
use inspex_core::model::ExtractionResult;
use inspex_core::{InspexConfig, Pipeline};
use std::path::PathBuf;

use crate::output;

pub fn run(input_file: PathBuf, config: InspexConfig) -> Result<(), InspexError> {
    let (_, bytes) = super::read_upload(&input_file, config.max_upload_bytes)?;
    let text = Pipeline::from_config(config).ocr_region(&bytes)?;
    output::json::print(&ExtractionResult::ExtractedText(text))
}
