//! Cross-page boilerplate detection: headers, footers and watermarks repeat
//! verbatim on most pages of a document but carry no content value.

use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Lines judged to recur across a document's pages or slides. Computed once
/// per document before chunk emission and read-only afterward.
pub type BoilerplateSet = HashSet<String>;

/// Scan all pages and flag every stripped, non-empty line of length at most
/// `max_line_len` that appears on at least `min_fraction` of them.
/// Duplicates within one page count once. A frequency threshold rather than
/// presence-on-every-page tolerates OCR noise and edge pages. Callers decide
/// whether a document has enough pages for recurrence to mean anything.
pub fn find_boilerplate_lines(
    pages: &[String],
    min_fraction: f64,
    max_line_len: usize,
) -> BoilerplateSet {
    debug!(pages = pages.len(), min_fraction, "scanning for boilerplate");
    let total = pages.len().max(1) as f64;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for page in pages {
        let mut seen: HashSet<&str> = HashSet::new();
        for line in page.split('\n') {
            let line = line.trim();
            if !line.is_empty() && line.chars().count() <= max_line_len {
                seen.insert(line);
            }
        }
        for line in seen {
            *counts.entry(line).or_insert(0) += 1;
        }
    }
    let boiler: BoilerplateSet = counts
        .into_iter()
        .filter(|(_, c)| *c as f64 / total >= min_fraction)
        .map(|(line, _)| line.to_string())
        .collect();
    debug!(lines = boiler.len(), "boilerplate lines found");
    boiler
}

/// Remove exact-match boilerplate lines (and blank lines), preserving the
/// order of everything else.
pub fn drop_boilerplate(text: &str, boiler: &BoilerplateSet) -> String {
    if boiler.is_empty() {
        return text.to_string();
    }
    text.split('\n')
        .filter(|line| {
            let stripped = line.trim();
            !stripped.is_empty() && !boiler.contains(stripped)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
