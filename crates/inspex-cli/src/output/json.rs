use inspex_core::error::InspexError;
use inspex_core::model::SheetDetection;
use serde::Serialize;

pub fn print<T: Serialize>(value: &T) -> Result<(), InspexError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// Error body for workbooks where no sheet had detectable columns, with the
/// per-sheet detection trace for diagnosis.
pub fn print_structure_error(
    error: &InspexError,
    trace: &[SheetDetection],
) -> Result<(), InspexError> {
    print(&serde_json::json!({
        "error": error.to_string(),
        "detector_debug": trace,
    }))
}
