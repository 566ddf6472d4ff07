use docset_ingest::boilerplate::{drop_boilerplate, find_boilerplate_lines};
use docset_ingest::dedup::{canonicalize_for_hash, dedup_chunks, signature, SeenSignatures};
use docset_ingest::normalize::normalize;

use docset_core::types::{Chunk, SourceType};

#[test]
fn test_normalize_line_endings_and_blank_runs() {
    let input = "first line\r\nsecond line\r\n\n\n\n\nthird line";
    let out = normalize(input);
    assert_eq!(out, "first line\nsecond line\n\nthird line");
}

#[test]
fn test_normalize_joins_hyphenated_breaks_without_space() {
    let out = normalize("transfor-\nmation complete");
    assert_eq!(out, "transformation complete");
}

#[test]
fn test_normalize_strips_bullets_and_collapses_whitespace() {
    let out = normalize("• first   item\n▪ second\t\titem\n- third item");
    assert_eq!(out, "first item\nsecond item\nthird item");
}

#[test]
fn test_normalize_is_idempotent() {
    let inputs = [
        "• bul-\nlet   text\r\n\n\n\nmore",
        "plain paragraph",
        "  padded  \n\n\n\n  lines  ",
        "",
    ];
    for input in inputs {
        let once = normalize(input);
        assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
    }
}

#[test]
fn test_boilerplate_flags_lines_at_threshold() {
    let pages: Vec<String> = vec![
        "Confidential Internal Use Only\nunique alpha content".to_string(),
        "Confidential Internal Use Only\nunique beta content".to_string(),
        "Confidential Internal Use Only\nunique gamma content".to_string(),
        "unique delta content".to_string(),
        "Confidential Internal Use Only\nunique epsilon content".to_string(),
    ];
    // 4 of 5 pages = 0.8 >= 0.6.
    let boiler = find_boilerplate_lines(&pages, 0.6, 120);
    assert!(boiler.contains("Confidential Internal Use Only"));
    assert!(!boiler.contains("unique alpha content"));
}

#[test]
fn test_boilerplate_below_threshold_is_kept() {
    let pages: Vec<String> = vec![
        "Draft watermark\nalpha".to_string(),
        "beta".to_string(),
        "gamma".to_string(),
        "Draft watermark\ndelta".to_string(),
        "epsilon".to_string(),
    ];
    // 2 of 5 pages = 0.4 < 0.6.
    let boiler = find_boilerplate_lines(&pages, 0.6, 120);
    assert!(boiler.is_empty());
}

#[test]
fn test_boilerplate_is_a_pure_fraction_threshold() {
    // The detector applies count/total >= min_fraction and nothing else:
    // with a permissive fraction even a line on one of three pages
    // qualifies, and on a single page every line trivially does. Callers
    // gate on page count.
    let pages: Vec<String> = vec![
        "rare footer\nalpha".to_string(),
        "beta".to_string(),
        "gamma".to_string(),
    ];
    let boiler = find_boilerplate_lines(&pages, 0.3, 120);
    assert!(boiler.contains("rare footer"));

    let single: Vec<String> = vec!["just a stamp\nmore text".to_string()];
    let boiler = find_boilerplate_lines(&single, 0.6, 120);
    assert!(boiler.contains("just a stamp"));
    assert!(boiler.contains("more text"));
}

#[test]
fn test_boilerplate_ignores_long_lines() {
    let long = "x".repeat(200);
    let pages: Vec<String> = vec![long.clone(), long.clone(), long];
    let boiler = find_boilerplate_lines(&pages, 0.6, 120);
    assert!(boiler.is_empty());
}

#[test]
fn test_drop_boilerplate_preserves_order() {
    let pages: Vec<String> = vec![
        "Header Line\nbody one\nbody two".to_string(),
        "Header Line\nother body".to_string(),
    ];
    let boiler = find_boilerplate_lines(&pages, 0.6, 120);
    let out = drop_boilerplate(&pages[0], &boiler);
    assert_eq!(out, "body one\nbody two");
}

#[test]
fn test_canonicalize_collapses_formatting_variants() {
    let a = canonicalize_for_hash("Quarterly Results.\nRevenue grew 4%.\nPage 12");
    let b = canonicalize_for_hash("quarterly results\n\nrevenue   grew 4%\n17");
    assert_eq!(a, b);
    assert_eq!(a, "quarterly results. revenue grew 4%");
}

#[test]
fn test_canonicalize_drops_only_bare_page_numbers() {
    assert_eq!(canonicalize_for_hash("Page 3"), "");
    assert_eq!(canonicalize_for_hash("42"), "");
    // A line with a number plus words is content.
    assert_eq!(canonicalize_for_hash("Chapter 42"), "chapter 42");
}

#[test]
fn test_seen_signatures_insert_if_absent() {
    let mut seen = SeenSignatures::new();
    let sig = signature("some canonical text");
    assert!(!seen.is_duplicate(sig.clone()));
    assert!(seen.is_duplicate(sig));
    assert_eq!(seen.len(), 1);
}

#[test]
fn test_dedup_chunks_drops_reformatted_repeats() {
    let make = |text: &str| Chunk::new("doc", SourceType::Paginated, "Title", text).finalize();
    let chunks = vec![
        make("Safety brief for all staff."),
        make("safety   brief for all staff"),
        make("An entirely different chunk of text."),
    ];
    let kept = dedup_chunks(chunks);
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].text, "Safety brief for all staff.");
    assert_eq!(kept[1].text, "An entirely different chunk of text.");
}
