use crate::model::{ColumnDetection, RawCell};
use crate::parsing::normalize::{is_feature_like, is_numeric_like};
use regex::Regex;
use std::collections::BTreeMap;

/// Rows scanned from the top of a sheet in both detection passes.
pub const DEFAULT_MAX_SCAN_ROWS: usize = 50;

/// Occurrences a column needs before the statistical pass will pick it.
pub const MIN_COLUMN_HITS: usize = 3;

/// Which column a header synonym points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFamily {
    Feature,
    Actual,
}

/// How a rule participates in scoring.
///
/// `Synonym` rules are tried first on every cell. `Prefix` rules only apply
/// to a cell when no column of that family has been found yet in the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Synonym,
    Prefix,
}

#[derive(Debug, Clone)]
pub struct SynonymRule {
    pub family: ColumnFamily,
    pub tier: MatchTier,
    pub pattern: Regex,
    pub weight: u32,
}

impl SynonymRule {
    pub fn new(
        family: ColumnFamily,
        tier: MatchTier,
        pattern: &str,
        weight: u32,
    ) -> Result<Self, regex::Error> {
        Ok(SynonymRule {
            family,
            tier,
            pattern: Regex::new(pattern)?,
            weight,
        })
    }
}

/// Ordered synonym rules plus the scan budget used by [`detect_columns`].
#[derive(Debug, Clone)]
pub struct HeaderRules {
    rules: Vec<SynonymRule>,
    max_scan_rows: usize,
}

const FEATURE_SYNONYMS: &[&str] = &[
    r"feature.?number",
    r"\bfeature\s*n(?:o|c)\b",
    r"\bfeature\s*nu",
    r"\bfeature\b",
    r"\bballoon\b",
    r"\bbubble\b",
    r"char(?:\.|acteristic)?\s*no",
    r"\bchar\s*no\b",
    r"\bdim(?:\.|ension)?\s*no\b",
    r"\bfeat\s*no\b",
    r"\bid\b",
];

const ACTUAL_SYNONYMS: &[&str] = &[
    r"\bactual\b",
    r"\bactua\b",
    r"\bmeasured\b",
    r"\bresult\b",
    r"\bvalue\b",
    r"\bmeasurement\b",
    r"\bread\b",
];

const FEATURE_PREFIXES: &[&str] = &[r"^feature n", r"^feature nu", r"^feature$"];

const ACTUAL_PREFIXES: &[&str] = &[r"^actua", r"^meas", r"^resul", r"^value$"];

impl HeaderRules {
    pub fn new(rules: Vec<SynonymRule>) -> Self {
        HeaderRules {
            rules,
            max_scan_rows: DEFAULT_MAX_SCAN_ROWS,
        }
    }

    pub fn with_max_scan_rows(mut self, max_scan_rows: usize) -> Self {
        self.max_scan_rows = max_scan_rows;
        self
    }

    /// The production synonym set for CMM report headers.
    pub fn builtin() -> Self {
        let groups = [
            (ColumnFamily::Feature, MatchTier::Synonym, FEATURE_SYNONYMS, 2),
            (ColumnFamily::Actual, MatchTier::Synonym, ACTUAL_SYNONYMS, 2),
            (ColumnFamily::Feature, MatchTier::Prefix, FEATURE_PREFIXES, 1),
            (ColumnFamily::Actual, MatchTier::Prefix, ACTUAL_PREFIXES, 1),
        ];
        let rules = groups
            .iter()
            .flat_map(|(family, tier, patterns, weight)| {
                patterns.iter().map(move |p| SynonymRule {
                    family: *family,
                    tier: *tier,
                    pattern: Regex::new(p).expect("builtin header pattern"),
                    weight: *weight,
                })
            })
            .collect();
        HeaderRules::new(rules)
    }

    /// First rule of the given family and tier matching the cell.
    fn first_match(&self, family: ColumnFamily, tier: MatchTier, cell: &str) -> Option<&SynonymRule> {
        self.rules
            .iter()
            .filter(|r| r.family == family && r.tier == tier)
            .find(|r| r.pattern.is_match(cell))
    }
}

impl Default for HeaderRules {
    fn default() -> Self {
        HeaderRules::builtin()
    }
}

/// Locate the header row and the feature/actual columns of a sheet.
///
/// Pass 1 scores rows by header synonyms and keeps the best row that names
/// both columns (ties go to the earliest row). If no row qualifies, pass 2
/// picks columns by how many cells look like feature numbers and numbers.
/// When neither pass has evidence the result is fully undetected.
pub fn detect_columns(rows: &[Vec<RawCell>], rules: &HeaderRules) -> ColumnDetection {
    let scanned = &rows[..rows.len().min(rules.max_scan_rows)];

    if let Some(found) = score_header_rows(scanned, rules) {
        return found;
    }

    column_statistics(scanned)
}

#[derive(Debug, Default)]
struct RowScore {
    feature: Option<usize>,
    actual: Option<usize>,
    score: u32,
}

impl RowScore {
    fn slot(&mut self, family: ColumnFamily) -> &mut Option<usize> {
        match family {
            ColumnFamily::Feature => &mut self.feature,
            ColumnFamily::Actual => &mut self.actual,
        }
    }
}

const FAMILIES: [ColumnFamily; 2] = [ColumnFamily::Feature, ColumnFamily::Actual];

fn score_row(cells: &[String], rules: &HeaderRules) -> RowScore {
    let mut row = RowScore::default();

    for (idx, cell) in cells.iter().enumerate() {
        if cell.is_empty() {
            continue;
        }
        for family in FAMILIES {
            if let Some(rule) = rules.first_match(family, MatchTier::Synonym, cell) {
                let slot = row.slot(family);
                if slot.is_none() {
                    *slot = Some(idx);
                }
                row.score += rule.weight;
            }
        }
        for family in FAMILIES {
            if row.slot(family).is_some() {
                continue;
            }
            if let Some(rule) = rules.first_match(family, MatchTier::Prefix, cell) {
                *row.slot(family) = Some(idx);
                row.score += rule.weight;
            }
        }
    }

    row
}

fn score_header_rows(rows: &[Vec<RawCell>], rules: &HeaderRules) -> Option<ColumnDetection> {
    let mut best: Option<(u32, ColumnDetection)> = None;

    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .map(|c| c.to_text().unwrap_or_default().trim().to_lowercase())
            .collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }

        let scored = score_row(&cells, rules);
        let (Some(feature), Some(actual)) = (scored.feature, scored.actual) else {
            continue;
        };
        if best.as_ref().is_some_and(|(s, _)| scored.score <= *s) {
            continue;
        }
        best = Some((
            scored.score,
            ColumnDetection {
                header_row_idx: Some(i + 1),
                feature_col_idx: Some(feature),
                actual_col_idx: Some(actual),
            },
        ));
    }

    if let Some((score, detection)) = &best {
        tracing::debug!(score, ?detection, "header row found by synonym scoring");
    }
    best.map(|(_, d)| d)
}

#[derive(Debug, Default)]
struct ColumnStats {
    feature_like: usize,
    numeric_like: usize,
    non_empty: usize,
}

fn column_statistics(rows: &[Vec<RawCell>]) -> ColumnDetection {
    let mut stats: BTreeMap<usize, ColumnStats> = BTreeMap::new();

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let st = stats.entry(idx).or_default();
            if cell.is_blank() {
                continue;
            }
            st.non_empty += 1;
            if is_feature_like(&cell.to_text().unwrap_or_default()) {
                st.feature_like += 1;
            }
            if is_numeric_like(cell) {
                st.numeric_like += 1;
            }
        }
    }

    let mut feature: Option<(usize, usize)> = None;
    let mut actual: Option<(usize, usize)> = None;
    for (&idx, st) in &stats {
        tracing::trace!(
            col = idx,
            non_empty = st.non_empty,
            feature_like = st.feature_like,
            numeric_like = st.numeric_like,
            "column statistics"
        );
        if st.feature_like >= MIN_COLUMN_HITS && feature.map_or(true, |(_, n)| st.feature_like > n) {
            feature = Some((idx, st.feature_like));
        }
        if st.numeric_like >= MIN_COLUMN_HITS && actual.map_or(true, |(_, n)| st.numeric_like > n) {
            actual = Some((idx, st.numeric_like));
        }
    }

    match (feature, actual) {
        (Some((f, _)), Some((a, _))) if f != a => {
            tracing::debug!(feature_col = f, actual_col = a, "columns chosen by statistics");
            ColumnDetection {
                header_row_idx: None,
                feature_col_idx: Some(f),
                actual_col_idx: Some(a),
            }
        }
        _ => ColumnDetection::undetected(),
    }
}
