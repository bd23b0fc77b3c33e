pub mod lists;
pub mod professor;
pub mod subject;

use regex::Regex;

/// Cell `offset` of the row, or the last cell when the row is shorter.
/// Tolerates rows where label and value share one cell as well as rows
/// where they sit in separate cells.
pub(crate) fn positional(row: &[String], offset: usize) -> Option<&str> {
    let last = row.len().checked_sub(1)?;
    row.get(offset.min(last)).map(|s| s.as_str())
}

/// Cell `i` trimmed, or empty when the row is shorter.
pub(crate) fn cell(row: &[String], i: usize) -> String {
    row.get(i).map(|s| s.trim().to_string()).unwrap_or_default()
}

pub(crate) fn any_cell_matches(row: &[String], re: &Regex) -> bool {
    row.iter().any(|c| re.is_match(c))
}

/// Value of a labelled row: what follows the label in its own cell, else the
/// next non-empty cell. `rest` is the first cell with the label removed.
pub(crate) fn label_value(rest: &str, row: &[String]) -> String {
    let inline = rest.trim().trim_start_matches(':').trim();
    if !inline.is_empty() {
        return inline.to_string();
    }
    row.iter()
        .skip(1)
        .map(|c| c.trim())
        .find(|c| !c.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Ordinals are printed as `1.`; keep the digits only.
pub(crate) fn strip_ordinal(s: &str) -> String {
    s.trim().replace('.', "")
}

// ── Tests ──
