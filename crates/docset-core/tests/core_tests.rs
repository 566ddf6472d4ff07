use std::fs;
use tempfile::TempDir;

use docset_core::ids::{doc_id_from_path, stable_chunk_id, title_from_path};
use docset_core::types::{Caption, Chunk, SourceType};

#[test]
fn doc_id_depends_on_content_not_name() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("report_v1.pdf");
    let b = tmp.path().join("renamed copy.pdf");
    fs::write(&a, b"same bytes").unwrap();
    fs::write(&b, b"same bytes").unwrap();

    let id_a = doc_id_from_path(&a).unwrap();
    let id_b = doc_id_from_path(&b).unwrap();
    assert_eq!(id_a, id_b, "identical content hashes to the same doc id");
    assert_eq!(id_a.len(), 32);

    fs::write(&b, b"different bytes").unwrap();
    assert_ne!(id_a, doc_id_from_path(&b).unwrap());
}

#[test]
fn stable_chunk_id_is_deterministic() {
    let a = stable_chunk_id("d0", "paginated", "3", "alpha beta");
    let b = stable_chunk_id("d0", "paginated", "3", "alpha beta");
    assert_eq!(a, b);
    assert!(a.starts_with("d0:paginated:3:"));

    // Any component change yields a different id
    assert_ne!(a, stable_chunk_id("d0", "paginated", "4", "alpha beta"));
    assert_ne!(a, stable_chunk_id("d0", "paginated", "3", "alpha gamma"));
}

#[test]
fn chunk_finalize_uses_locator() {
    let page = Chunk::new("doc", SourceType::Paginated, "Title", "body")
        .with_page(7)
        .finalize();
    assert_eq!(page.locator(), "7");
    assert!(page.chunk_id.starts_with("doc:paginated:7:"));

    let tc = Chunk::new("doc", SourceType::Transcript, "Title", "body")
        .with_timecode("00:05:30-00:06:10")
        .finalize();
    assert_eq!(tc.locator(), "00:05:30-00:06:10");

    // No locator at all falls back to "0"
    let plain = Chunk::new("doc", SourceType::Transcript, "Title", "body").finalize();
    assert_eq!(plain.locator(), "0");

    // Re-finalizing an unchanged chunk reproduces the same id (upsert)
    let again = Chunk::new("doc", SourceType::Paginated, "Title", "body")
        .with_page(7)
        .finalize();
    assert_eq!(page.chunk_id, again.chunk_id);
}

#[test]
fn chunk_serializes_record_fields() {
    let chunk = Chunk::new("doc", SourceType::SlideDeck, "Deck", "cell text")
        .with_slide(2)
        .with_caption(Caption::Table)
        .finalize();
    let json = serde_json::to_value(&chunk).unwrap();
    assert_eq!(json["source"], "slide-deck");
    assert_eq!(json["slide"], 2);
    assert_eq!(json["caption"], "table");
    assert!(json["page"].is_null());
    assert!(json.get("created_at").is_some());
}

#[test]
fn title_from_path_cleans_stem() {
    let title = title_from_path(std::path::Path::new("/data/q3_sales-summary.pdf"));
    assert_eq!(title, "Q3 Sales Summary");
}
