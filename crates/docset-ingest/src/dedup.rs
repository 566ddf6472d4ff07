//! Content-addressed duplicate suppression.
//!
//! Used at two granularities: whole extracted pages/slides (skip
//! re-processing a repeated slide) and whole emitted chunks (per-document
//! safety net after chunking).

use std::collections::HashSet;
use tracing::debug;

use docset_core::types::Chunk;

/// Canonical form for hashing: lower-cased, page-number-only lines dropped,
/// one trailing period stripped per line, lines joined with ". ",
/// whitespace collapsed. Two spans differing only in such formatting hash
/// to the same signature.
pub fn canonicalize_for_hash(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let s = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<&str> = Vec::new();
    for line in s.split('\n') {
        let line = line.trim();
        if line.is_empty() || is_page_number_line(line) {
            continue;
        }
        lines.push(line.strip_suffix('.').unwrap_or(line));
    }
    let joined = lines.join(". ");
    joined
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A line carrying nothing but a page number: digits, optionally prefixed
/// with the word "page".
fn is_page_number_line(line: &str) -> bool {
    let rest = line
        .trim()
        .to_lowercase()
        .strip_prefix("page")
        .map(|r| r.trim_start().to_string())
        .unwrap_or_else(|| line.trim().to_string());
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

/// Fixed-length cryptographic signature of a canonical text form.
pub fn signature(canonical: &str) -> String {
    blake3::hash(canonical.as_bytes()).to_hex().to_string()
}

/// Insert-if-absent set of signatures, scoped to one document's (or one
/// run's) processing and discarded after.
#[derive(Debug, Default)]
pub struct SeenSignatures {
    seen: HashSet<String>,
}

impl SeenSignatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the signature was already present; inserts it
    /// otherwise, so the set doubles as an insert-if-absent check.
    pub fn is_duplicate(&mut self, sig: String) -> bool {
        !self.seen.insert(sig)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Final per-document chunk-level pass: drops any chunk whose canonical
/// signature was already emitted. Duplicates are a soft skip, never an
/// error.
pub fn dedup_chunks(chunks: Vec<Chunk>) -> Vec<Chunk> {
    let mut seen = SeenSignatures::new();
    let total = chunks.len();
    let kept: Vec<Chunk> = chunks
        .into_iter()
        .filter(|ch| !seen.is_duplicate(signature(&canonicalize_for_hash(&ch.text))))
        .collect();
    debug!(kept = kept.len(), total, "chunk-level dedup pass");
    kept
}
