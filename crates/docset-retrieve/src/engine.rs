//! The query-side engine: embed, fan out, fuse.

use anyhow::{anyhow, Result};
use futures::try_join;
use serde::Deserialize;
use tracing::debug;

use docset_core::traits::{Embedder, LexicalSearcher, VectorSearcher};
use docset_core::types::{FusedResult, SourceKind};

use crate::fusion;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Fused results returned to the caller.
    pub k: usize,
    /// Fused scores at or below this are noise and dropped.
    pub min_score: f32,
    /// Candidates requested from each engine; deeper than `k` so fusion has
    /// real overlap to work with.
    pub fetch_depth: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            k: 6,
            min_score: 0.03,
            fetch_depth: 20,
        }
    }
}

/// Fans one query out to both search paths concurrently and fuses the
/// ranked lists. Generic over the collaborators so tests can drop in
/// in-memory stubs.
pub struct HybridRetriever<E, V, L> {
    embedder: E,
    vector: V,
    lexical: L,
    opts: QueryOptions,
}

impl<E, V, L> HybridRetriever<E, V, L>
where
    E: Embedder,
    V: VectorSearcher,
    L: LexicalSearcher,
{
    pub fn new(embedder: E, vector: V, lexical: L, opts: QueryOptions) -> Self {
        Self {
            embedder,
            vector,
            lexical,
            opts,
        }
    }

    pub async fn query(&self, query: &str) -> Result<Vec<FusedResult>> {
        let texts = [query.to_string()];
        let mut embeddings = self.embedder.embed(&texts).await?;
        let query_vector = embeddings
            .pop()
            .ok_or_else(|| anyhow!("embedder returned no vector for the query"))?;

        let (mut vector_hits, mut lexical_hits) = try_join!(
            self.vector.search(query_vector, self.opts.fetch_depth),
            self.lexical.search(query, self.opts.fetch_depth),
        )?;
        debug!(
            vector = vector_hits.len(),
            lexical = lexical_hits.len(),
            "search fan-out returned"
        );

        // Normalize provenance before fusion. Only lexical hits may carry a
        // match snippet.
        for hit in &mut vector_hits {
            hit.source = SourceKind::Vector;
            hit.fields.snippet = None;
        }
        for hit in &mut lexical_hits {
            hit.source = SourceKind::Lexical;
        }

        Ok(fusion::fuse(
            vector_hits,
            lexical_hits,
            self.opts.k,
            self.opts.min_score,
        ))
    }
}
