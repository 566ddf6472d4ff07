//! Sentence-aware token budgeting with overlap.

use std::path::Path;

use tokenizers::Tokenizer;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

/// Tokens reserved below the caller's budget for downstream prompt
/// scaffolding.
pub const DEFAULT_TOKEN_HEADROOM: usize = 64;

/// Token counting for budget enforcement: a real subword tokenizer when one
/// is available, otherwise a conservative character-based heuristic.
pub enum TokenEstimator {
    Subword(Box<Tokenizer>),
    Heuristic,
}

impl TokenEstimator {
    /// Load a subword tokenizer from a `tokenizer.json` file.
    pub fn subword_from_file(path: &Path) -> anyhow::Result<Self> {
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| anyhow::anyhow!("failed to load tokenizer from {}: {}", path.display(), e))?;
        Ok(Self::Subword(Box::new(tokenizer)))
    }

    pub fn estimate(&self, text: &str) -> usize {
        match self {
            TokenEstimator::Subword(tok) => match tok.encode(text, false) {
                Ok(enc) => enc.get_ids().len().max(1),
                Err(_) => heuristic_tokens(text),
            },
            TokenEstimator::Heuristic => heuristic_tokens(text),
        }
    }
}

/// Errs on the conservative side: one token per three characters.
fn heuristic_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(3).max(1)
}

/// Splits normalized text into overlapping, sentence-respecting chunks
/// under a token budget. Deterministic for identical input.
pub struct TokenChunker {
    estimator: TokenEstimator,
    headroom: usize,
}

impl Default for TokenChunker {
    fn default() -> Self {
        Self::new(TokenEstimator::Heuristic)
    }
}

impl TokenChunker {
    pub fn new(estimator: TokenEstimator) -> Self {
        Self {
            estimator,
            headroom: DEFAULT_TOKEN_HEADROOM,
        }
    }

    pub fn with_headroom(mut self, headroom: usize) -> Self {
        self.headroom = headroom;
        self
    }

    pub fn estimate(&self, text: &str) -> usize {
        self.estimator.estimate(text)
    }

    /// Chunk `text` so that every piece stays within `max_tokens` (less the
    /// reserved headroom), seeding each chunk after the first with a tail of
    /// trailing sentences whose estimate fits `overlap_tokens`.
    ///
    /// The overlap tail is legitimately empty when even the single most
    /// recent sentence exceeds the overlap budget; the overlap bound wins
    /// over non-emptiness. `overlap_tokens >= max_tokens` is not corrected;
    /// callers must pass sane ratios.
    pub fn chunk(&self, text: &str, max_tokens: usize, overlap_tokens: usize) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let effective = max_tokens.saturating_sub(self.headroom).max(1);
        let sentences = split_sentences(text);

        let mut chunks: Vec<String> = Vec::new();
        let mut cur: Vec<String> = Vec::new();
        let mut cur_tokens = 0usize;

        for sentence in sentences {
            let st = self.estimator.estimate(&sentence);
            if cur_tokens + st <= effective {
                cur.push(sentence);
                cur_tokens += st;
                continue;
            }
            if cur.is_empty() {
                // A single huge sentence: wrap at word boundaries under a
                // generous character proxy for the token budget.
                chunks.extend(split_long_sentence(&sentence, effective * 4));
                continue;
            }
            chunks.push(cur.join(" ").trim().to_string());

            // Build the overlap tail backward from the closed buffer.
            let mut tail: Vec<String> = Vec::new();
            let mut tail_tokens = 0usize;
            for prev in cur.iter().rev() {
                let t = self.estimator.estimate(prev);
                if tail_tokens + t <= overlap_tokens {
                    tail.insert(0, prev.clone());
                    tail_tokens += t;
                } else {
                    break;
                }
            }
            tail.push(sentence);
            cur_tokens = tail.iter().map(|s| self.estimator.estimate(s)).sum();
            cur = tail;
        }
        if !cur.is_empty() {
            chunks.push(cur.join(" ").trim().to_string());
        }

        // Hard cap: the sentence splitter can under-split, so bisect any
        // chunk still over budget.
        let mut bounded: Vec<String> = Vec::new();
        for ch in chunks {
            self.enforce_token_cap(&ch, effective, &mut bounded);
        }
        bounded.retain(|c| !c.is_empty());

        debug!(
            chunks = bounded.len(),
            max_tokens, effective, overlap_tokens, "chunker done"
        );
        bounded
    }

    /// Bisect `text` at the word boundary nearest its midpoint until every
    /// piece fits the budget. Same shape as a recursive split, but driven by
    /// an explicit work stack so pathological inputs cannot exhaust the call
    /// stack.
    fn enforce_token_cap(&self, text: &str, max_tokens: usize, out: &mut Vec<String>) {
        let mut stack: Vec<String> = vec![text.trim().to_string()];
        while let Some(piece) = stack.pop() {
            if piece.is_empty() {
                continue;
            }
            if self.estimator.estimate(&piece) <= max_tokens {
                out.push(piece);
                continue;
            }
            let split = match split_point(&piece, max_tokens) {
                Some(at) => at,
                None => {
                    // No word boundary anywhere useful; emit as-is.
                    out.push(piece);
                    continue;
                }
            };
            let left = piece[..split].trim().to_string();
            let right = piece[split..].trim().to_string();
            // LIFO: push the right half first so the left emerges first.
            if !right.is_empty() {
                stack.push(right);
            }
            if !left.is_empty() {
                stack.push(left);
            }
        }
    }
}

/// Word boundary nearest the midpoint, preferring the left side; falls back
/// to a raw character budget when the text has no usable space.
fn split_point(text: &str, max_tokens: usize) -> Option<usize> {
    let mut mid = text.len() / 2;
    while mid > 0 && !text.is_char_boundary(mid) {
        mid -= 1;
    }
    let at = text[..mid]
        .rfind(' ')
        .or_else(|| text[mid..].find(' ').map(|i| i + mid));
    match at {
        Some(at) if at > 0 && at < text.len() => Some(at),
        _ => {
            let mut fallback = (max_tokens * 4).min(text.len());
            while fallback > 0 && !text.is_char_boundary(fallback) {
                fallback -= 1;
            }
            if fallback == 0 || fallback >= text.len() {
                None
            } else {
                Some(fallback)
            }
        }
    }
}

/// Language-aware sentence boundaries (UAX #29). If segmentation yields
/// nothing useful, the whole input is one sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let sentences: Vec<String> = text
        .split_sentence_bounds()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.is_empty() {
        vec![text.to_string()]
    } else {
        sentences
    }
}

/// Greedily pack the words of one oversized sentence into pieces bounded by
/// `max_chars`, never splitting a word. A single word longer than the
/// budget becomes its own piece.
fn split_long_sentence(sentence: &str, max_chars: usize) -> Vec<String> {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    if words.is_empty() {
        let trimmed = sentence.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    }

    let mut parts: Vec<String> = Vec::new();
    let mut cur: Vec<&str> = Vec::new();
    let mut cur_len = 0usize;
    for word in words {
        let word_len = word.chars().count();
        let addition = word_len + usize::from(!cur.is_empty());
        if cur_len + addition > max_chars && !cur.is_empty() {
            parts.push(cur.join(" "));
            cur = vec![word];
            cur_len = word_len;
        } else {
            cur.push(word);
            cur_len += addition;
        }
    }
    if !cur.is_empty() {
        parts.push(cur.join(" "));
    }
    parts.retain(|p| !p.is_empty());
    parts
}
