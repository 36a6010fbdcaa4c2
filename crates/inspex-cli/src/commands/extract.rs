use inspex_core::error::InspexError;
use inspex_core::{InspexConfig, Pipeline};
use std::path::PathBuf;

use crate::output;

pub fn run(input_file: PathBuf, output_format: &str, config: InspexConfig) -> Result<(), InspexError> {
    let (filename, bytes) = super::read_upload(&input_file, config.max_upload_bytes)?;
    let pipeline = Pipeline::from_config(config);
    let result = pipeline.extract(&filename, &bytes)?;

    match output_format {
        "table" => print!("{}", output::table::format_extraction(&result)),
        _ => output::json::print(&result)?,
    }
    Ok(())
}
