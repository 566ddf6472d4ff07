//! Stable identifiers derived from file and chunk content.

use anyhow::Result;
use std::fs::File;
use std::path::Path;

/// Content hash of a file, streamed in 1 MiB blocks. The document id is the
/// first 32 hex characters, so renaming a file does not change its identity.
pub fn doc_id_from_path(path: &Path) -> Result<String> {
    let mut hasher = blake3::Hasher::new();
    let mut file = File::open(path)?;
    std::io::copy(&mut file, &mut hasher)?;
    let digest = hasher.finalize().to_hex().to_string();
    Ok(digest[..32].to_string())
}

/// Deterministic chunk id: `{doc_id}:{source}:{loc}:{sig}` where `sig` is a
/// short content digest over locator and text. Identical units re-ingested
/// later map to the same id (upsert semantics at the index).
pub fn stable_chunk_id(doc_id: &str, source: &str, loc: &str, text: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(loc.as_bytes());
    hasher.update(b"|");
    hasher.update(text.as_bytes());
    let sig = hasher.finalize().to_hex().to_string();
    format!("{}:{}:{}:{}", doc_id, source, loc, &sig[..12])
}

/// Human-readable title guessed from the file stem.
pub fn title_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let cleaned = stem.replace(['_', '-'], " ");
    cleaned
        .split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
