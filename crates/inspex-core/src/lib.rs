pub mod cmm;
pub mod config;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod pipeline;
pub mod stream;
pub mod suppliers;

pub use config::InspexConfig;
pub use error::InspexError;
pub use pipeline::Pipeline;
pub use suppliers::SupplierIndex;

use extraction::WorkbookReader;
use model::CmmReport;
use parsing::header::HeaderRules;

/// Merge a CMM measurement workbook with the built-in header vocabulary.
///
/// Every sheet is inspected; the per-sheet detection outcome is returned in
/// `detector_debug` whether or not the sheet contributed values.
pub fn parse_cmm_report(
    bytes: &[u8],
    reader: &dyn WorkbookReader,
) -> Result<CmmReport, InspexError> {
    let workbook = reader.open_workbook(bytes)?;
    cmm::merge_workbook(&workbook, &HeaderRules::builtin())
}
