//! Reciprocal-rank fusion of the two ranked candidate lists.
//!
//! Fusion is rank-based on purpose: vector similarity and BM25 scores live
//! on incomparable scales, so raw scores from either engine never enter the
//! fused score.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use docset_core::types::{FusedResult, SearchHit};

/// Rank-smoothing constant. Large enough that rank 1 vs rank 2 is not a
/// cliff.
pub const RRF_K: f32 = 60.0;

/// At most this many chunks of one document in a fused result set.
pub const PER_DOC_CAP: usize = 2;

/// Merge both ranked lists into at most `k` fused results.
///
/// Each list contributes `1 / (RRF_K + rank)` per hit (ranks are 1-based);
/// a chunk found by both engines sums its two partials. Ties in fused score
/// break toward first appearance (vector list first). Results scoring at or
/// below `min_score` are dropped, and no document contributes more than
/// [`PER_DOC_CAP`] chunks; a capped-out chunk is skipped without consuming
/// one of the `k` slots.
pub fn fuse(
    vector_hits: Vec<SearchHit>,
    lexical_hits: Vec<SearchHit>,
    k: usize,
    min_score: f32,
) -> Vec<FusedResult> {
    let mut order: Vec<String> = Vec::new();
    let mut by_id: HashMap<String, FusedResult> = HashMap::new();

    for (rank, hit) in vector_hits.into_iter().enumerate() {
        accumulate(&mut order, &mut by_id, hit, partial(rank));
    }
    for (rank, hit) in lexical_hits.into_iter().enumerate() {
        accumulate(&mut order, &mut by_id, hit, partial(rank));
    }

    // First-seen order, then a stable sort: equal scores keep that order.
    let mut fused: Vec<FusedResult> = order
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect();
    fused.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut per_doc: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<FusedResult> = Vec::new();
    for result in fused {
        if result.score <= min_score {
            break;
        }
        let doc = result.doc_id().to_string();
        let count = per_doc.entry(doc).or_insert(0);
        if *count >= PER_DOC_CAP {
            continue;
        }
        *count += 1;
        out.push(result);
        if out.len() == k {
            break;
        }
    }
    debug!(results = out.len(), k, "fusion done");
    out
}

fn partial(rank: usize) -> f32 {
    1.0 / (RRF_K + (rank + 1) as f32)
}

/// Fold one hit into the accumulator. The first sighting keeps the hit's
/// stored fields; a later sighting from the other engine only adds its
/// score partial and donates a match snippet if the entry has none.
fn accumulate(
    order: &mut Vec<String>,
    by_id: &mut HashMap<String, FusedResult>,
    hit: SearchHit,
    partial: f32,
) {
    if let Some(existing) = by_id.get_mut(&hit.id) {
        existing.score += partial;
        if existing.hit.fields.snippet.is_none() {
            existing.hit.fields.snippet = hit.fields.snippet;
        }
        return;
    }
    order.push(hit.id.clone());
    by_id.insert(
        hit.id.clone(),
        FusedResult {
            hit,
            score: partial,
        },
    );
}
