use inspex_core::error::InspexError;
use inspex_core::{InspexConfig, SupplierIndex};

use crate::output;

pub fn run(
    prefix: &str,
    limit: Option<i64>,
    output_format: &str,
    config: &InspexConfig,
) -> Result<(), InspexError> {
    let index = SupplierIndex::load(&config.supplier_data_dir);
    let matches = index.lookup(prefix, resolve_limit(limit, config.supplier_limit));

    match output_format {
        "table" => {
            for name in &matches {
                println!("{name}");
            }
        }
        _ => output::json::print(&serde_json::json!({ "suppliers": matches }))?,
    }
    Ok(())
}

/// No flag uses the configured default; a negative value lifts the limit.
fn resolve_limit(limit: Option<i64>, default: usize) -> Option<usize> {
    match limit {
        None => Some(default),
        Some(n) if n < 0 => None,
        Some(n) => Some(usize::try_from(n).unwrap_or(usize::MAX)),
    }
}
