//! Rendering fused results into a context block for answer generation.

use docset_core::types::FusedResult;

/// Human-readable provenance tag for one result, built from whichever
/// locator its stored fields carry.
pub fn source_tag(result: &FusedResult) -> String {
    let fields = &result.hit.fields;
    let title = fields.title.as_deref().unwrap_or("Untitled");
    if let Some(page) = fields.page {
        return format!("{title}, p.{page}");
    }
    if let Some(slide) = fields.slide {
        return format!("{title}, slide {slide}");
    }
    if let Some(timecode) = &fields.timecode {
        return format!("{title}, {timecode}");
    }
    if let Some(section) = &fields.section {
        return format!("{title}, {section}");
    }
    title.to_string()
}

/// The passage text shown to the generator: the highlighted match snippet
/// when lexical search produced one, the full chunk text otherwise.
pub fn passage_text(result: &FusedResult) -> &str {
    result
        .hit
        .fields
        .snippet
        .as_deref()
        .unwrap_or(&result.hit.fields.text)
}

/// Tagged passages joined into one prompt-ready context block.
pub fn format_context(results: &[FusedResult]) -> String {
    results
        .iter()
        .map(|r| format!("[{}] {}", source_tag(r), passage_text(r)))
        .collect::<Vec<_>>()
        .join("\n\n")
}
