pub mod header;
pub mod normalize;
pub mod plan;
pub mod rows;

/// Split `text` into trimmed, non-empty lines.
pub fn non_empty_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}
