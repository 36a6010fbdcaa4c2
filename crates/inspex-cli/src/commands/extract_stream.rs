use inspex_core::error::InspexError;
use inspex_core::{InspexConfig, Pipeline};
use std::io::Write;
use std::path::PathBuf;

pub fn run(input_file: PathBuf, config: InspexConfig) -> Result<(), InspexError> {
    let (filename, bytes) = super::read_upload(&input_file, config.max_upload_bytes)?;
    let pipeline = Pipeline::from_config(config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let rows = pipeline.stream_plan(&filename, &bytes, &mut out)?;
    writeln!(out)?;

    eprintln!("Streamed {rows} row(s) from {filename}");
    Ok(())
}
