use crate::model::RawCell;
use regex::Regex;
use std::sync::LazyLock;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+-]?\d+(?:\.\d+)?").expect("valid number pattern"));

static TOKEN_DELIMITERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;|\s/]+").expect("valid delimiter pattern"));

static REFER_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.,;:()\[\]{}/_-]+").expect("valid punctuation pattern"));

static REFER_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bref(?:er(?:ence)?)?\s*only\b").expect("valid refer-only pattern")
});

/// Maximum length of a normalized key for a cell to count as feature-like.
const MAX_FEATURE_KEY_LEN: usize = 12;

/// Canonical feature-number key: digits and hyphens only.
///
/// `"Feature 140-1"` -> `"140-1"`, `"REF ONLY"` -> `""`.
pub fn normalize_feature_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect()
}

/// The canonical "actual" value of a cell.
///
/// Returns the first signed decimal number in the text, or failing that the
/// first token after splitting on `, ; | / whitespace`.
pub fn pick_first_actual(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        return String::new();
    }
    if let Some(m) = NUMBER.find(s) {
        return m.as_str().to_string();
    }
    TOKEN_DELIMITERS
        .split(s)
        .map(str::trim)
        .find(|t| !t.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// First signed decimal number in the text, if any.
pub fn to_float(raw: &str) -> Option<f64> {
    NUMBER.find(raw)?.as_str().parse().ok()
}

/// True for numeric cells and for text that parses fully as a float.
pub fn is_numeric_like(cell: &RawCell) -> bool {
    match cell {
        RawCell::Int(_) | RawCell::Float(_) => true,
        RawCell::Text(s) => s.trim().parse::<f64>().is_ok(),
        RawCell::Empty => false,
    }
}

pub fn is_feature_like(raw: &str) -> bool {
    let key = normalize_feature_key(raw);
    (1..=MAX_FEATURE_KEY_LEN).contains(&key.len())
}

/// Whether a feature cell carries a "refer only" annotation.
///
/// Tolerates case, punctuation and the `ref`/`refer`/`reference` spellings,
/// but only on word boundaries: `"preferred only"` does not match.
pub fn is_refer_only(raw: &str) -> bool {
    let spaced = raw.replace('\u{00A0}', " ");
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let lower = collapsed.to_lowercase();
    let stripped = REFER_PUNCTUATION.replace_all(&lower, " ");
    REFER_ONLY.is_match(&stripped)
}
