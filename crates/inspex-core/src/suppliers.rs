//! Supplier names for prefix autocomplete.
//!
//! The index is built once from the first usable source in the data
//! directory and is read-only afterwards.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::InspexError;
use crate::extraction::workbook::CalamineReader;
use crate::extraction::WorkbookReader;
use crate::model::RawCell;

pub const DEFAULT_SUPPLIERS: [&str; 4] = [
    "Acme Components",
    "Globex Engineering",
    "Initech Precision",
    "Umbrella Machining",
];

/// Header prefixes that mark the supplier column of a tabular source.
const NAME_HEADERS: [&str; 5] = ["supplier name", "supplier", "vendor", "vendor name", "name"];

const WORKBOOK_FILES: [&str; 3] = ["suppliers.xlsx", "suppliers.xlsm", "suppliers.xls"];

/// Sorted, de-duplicated supplier names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplierIndex {
    names: Vec<String>,
}

impl SupplierIndex {
    /// Normalize, drop empties, sort and de-duplicate.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = names
            .into_iter()
            .map(|n| collapse_whitespace(n.as_ref()))
            .filter(|n| !n.is_empty())
            .collect();
        SupplierIndex {
            names: set.into_iter().collect(),
        }
    }

    /// Load from `dir`, trying `suppliers.json`, then the workbooks, then
    /// `suppliers.csv`, and finally the built-in defaults.
    ///
    /// A source that is missing, unreadable or empty is skipped.
    pub fn load(dir: &Path) -> Self {
        let sources: [(&str, fn(&Path) -> Result<Vec<String>, InspexError>); 3] = [
            ("json", load_json),
            ("workbook", load_workbooks),
            ("csv", load_csv),
        ];

        for (source, loader) in sources {
            match loader(dir) {
                Ok(names) if !names.is_empty() => {
                    let index = Self::from_names(names);
                    tracing::info!(source, suppliers = index.len(), "supplier index loaded");
                    return index;
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(source, error = %e, "skipping supplier source"),
            }
        }

        tracing::info!(dir = %dir.display(), "no supplier source found, using defaults");
        Self::from_names(DEFAULT_SUPPLIERS)
    }

    /// Names starting with `prefix` (case-insensitive, whitespace-collapsed),
    /// at most `limit` of them. An empty prefix matches everything and
    /// `None` means no limit.
    pub fn lookup(&self, prefix: &str, limit: Option<usize>) -> Vec<String> {
        let prefix = collapse_whitespace(prefix).to_lowercase();
        self.names
            .iter()
            .filter(|name| prefix.is_empty() || name.to_lowercase().starts_with(&prefix))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_name_header(header: &str) -> bool {
    let header = collapse_whitespace(header).to_lowercase();
    NAME_HEADERS.iter().any(|c| header.starts_with(c))
}

fn load_json(dir: &Path) -> Result<Vec<String>, InspexError> {
    let path = dir.join("suppliers.json");
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let payload: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;

    let list = match &payload {
        Value::Array(items) => Some(items),
        Value::Object(map) => match (map.get("suppliers"), map.get("names")) {
            (Some(Value::Array(items)), _) => Some(items),
            (_, Some(Value::Array(items))) => Some(items),
            _ => None,
        },
        _ => None,
    };

    Ok(list
        .map(|items| {
            items
                .iter()
                .filter_map(|v| match v {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .unwrap_or_default())
}

fn load_workbooks(dir: &Path) -> Result<Vec<String>, InspexError> {
    for file in WORKBOOK_FILES {
        let path = dir.join(file);
        if !path.is_file() {
            continue;
        }
        let workbook = CalamineReader.open_workbook(&fs::read(&path)?)?;
        let Some(sheet) = workbook.sheets.first() else {
            continue;
        };
        let Some((header, data)) = sheet.rows.split_first() else {
            continue;
        };

        let col = header
            .iter()
            .position(|cell| cell.to_text().is_some_and(|h| is_name_header(&h)))
            .unwrap_or(0);
        let names: Vec<String> = data
            .iter()
            .filter_map(|row| row.get(col))
            .filter(|cell| !cell.is_blank())
            .filter_map(RawCell::to_text)
            .collect();
        if !names.is_empty() {
            return Ok(names);
        }
    }
    Ok(Vec::new())
}

fn load_csv(dir: &Path) -> Result<Vec<String>, InspexError> {
    let path = dir.join("suppliers.csv");
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(&path)
        .map_err(|e| InspexError::decode("CSV", e))?;
    let headers = reader
        .headers()
        .map_err(|e| InspexError::decode("CSV", e))?
        .clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    let col = headers.iter().position(is_name_header).unwrap_or(0);

    let mut names = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| InspexError::decode("CSV", e))?;
        if let Some(value) = record.get(col).filter(|v| !v.is_empty()) {
            names.push(value.to_string());
        }
    }
    Ok(names)
}
