pub mod extract;
pub mod extract_stream;
pub mod ocr_image;
pub mod parse_cmm;
pub mod suppliers;

use inspex_core::error::InspexError;
use std::path::Path;

/// Read an input file, refusing anything above the upload ceiling before
/// its contents are loaded.
///
/// Returns the bare file name (used for type detection) and the bytes.
pub fn read_upload(path: &Path, max_bytes: u64) -> Result<(String, Vec<u8>), InspexError> {
    let size = std::fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(InspexError::UnsupportedInput(format!(
            "{} is {size} bytes, above the {max_bytes} byte upload limit",
            path.display()
        )));
    }

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if filename.is_empty() {
        return Err(InspexError::UnsupportedInput("no file selected".into()));
    }

    Ok((filename, std::fs::read(path)?))
}
