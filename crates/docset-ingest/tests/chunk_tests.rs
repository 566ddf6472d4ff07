use docset_ingest::chunk::{split_sentences, TokenChunker};

/// A sentence of `n` copies of `word` (first letter upper-cased) ending in a
/// period, so the sentence segmenter sees real boundaries.
fn sentence(word: &str, n: usize) -> String {
    let mut words: Vec<String> = vec![word.to_string(); n];
    let mut first = word.to_string();
    first.replace_range(..1, &word[..1].to_uppercase());
    words[0] = first;
    format!("{}.", words.join(" "))
}

#[test]
fn test_split_sentences_finds_boundaries() {
    let text = "First sentence here. Second one follows. Third closes it.";
    let sentences = split_sentences(text);
    assert_eq!(sentences.len(), 3);
    assert_eq!(sentences[0], "First sentence here.");
}

#[test]
fn test_split_sentences_whole_text_fallback() {
    let text = "no terminator at all";
    assert_eq!(split_sentences(text), vec![text.to_string()]);
}

#[test]
fn test_chunk_overlap_too_small_yields_empty_tail() {
    // Three 60-char sentences estimate to 20 tokens each under the
    // ceil(chars/3) heuristic. Budget 50 fits two; an overlap budget of 10
    // cannot fit even one trailing sentence, so the second chunk starts
    // fresh.
    let s1 = sentence("alpha", 10);
    let s2 = sentence("bravo", 10);
    let s3 = sentence("delta", 10);
    let text = format!("{s1} {s2} {s3}");

    let chunker = TokenChunker::default().with_headroom(0);
    let chunks = chunker.chunk(&text, 50, 10);
    assert_eq!(chunks, vec![format!("{s1} {s2}"), s3]);
}

#[test]
fn test_chunk_overlap_repeats_trailing_sentence() {
    let s1 = sentence("alpha", 10);
    let s2 = sentence("bravo", 10);
    let s3 = sentence("delta", 10);
    let text = format!("{s1} {s2} {s3}");

    let chunker = TokenChunker::default().with_headroom(0);
    let chunks = chunker.chunk(&text, 50, 25);
    assert_eq!(chunks, vec![format!("{s1} {s2}"), format!("{s2} {s3}")]);
}

#[test]
fn test_chunk_budget_holds_for_every_piece() {
    let text: String = (0..40)
        .map(|i| sentence(&format!("word{i:02}x"), 7))
        .collect::<Vec<_>>()
        .join(" ");
    let chunker = TokenChunker::default().with_headroom(0);
    for chunk in chunker.chunk(&text, 40, 8) {
        assert!(
            chunker.estimate(&chunk) <= 40,
            "chunk over budget: {chunk:?}"
        );
    }
}

#[test]
fn test_chunk_headroom_shrinks_effective_budget() {
    let s1 = sentence("alpha", 10);
    let s2 = sentence("bravo", 10);
    let text = format!("{s1} {s2}");

    // 45 tokens fit both sentences outright; reserving 20 leaves room for
    // only one at a time.
    let flat = TokenChunker::default().with_headroom(0);
    assert_eq!(flat.chunk(&text, 45, 0).len(), 1);
    let reserved = TokenChunker::default().with_headroom(20);
    assert_eq!(reserved.chunk(&text, 45, 0).len(), 2);
}

#[test]
fn test_chunk_huge_sentence_wraps_without_splitting_words() {
    let words: Vec<String> = (0..200).map(|i| format!("w{i:03}")).collect();
    let text = words.join(" ");

    let chunker = TokenChunker::default().with_headroom(0);
    let chunks = chunker.chunk(&text, 20, 0);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunker.estimate(chunk) <= 20, "piece over budget: {chunk:?}");
    }
    // Every word survives intact and in order.
    let rejoined: Vec<String> = chunks
        .iter()
        .flat_map(|c| c.split_whitespace().map(str::to_string))
        .collect();
    assert_eq!(rejoined, words);
}

#[test]
fn test_chunk_empty_and_whitespace_inputs() {
    let chunker = TokenChunker::default();
    assert!(chunker.chunk("", 512, 120).is_empty());
    assert!(chunker.chunk("   \n\n  ", 512, 120).is_empty());
}

#[test]
fn test_chunk_deterministic() {
    let text: String = (0..20)
        .map(|i| sentence(&format!("term{i}"), 9))
        .collect::<Vec<_>>()
        .join(" ");
    let chunker = TokenChunker::default().with_headroom(0);
    let a = chunker.chunk(&text, 60, 15);
    let b = chunker.chunk(&text, 60, 15);
    assert_eq!(a, b);
}
