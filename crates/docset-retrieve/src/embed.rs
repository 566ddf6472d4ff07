//! Embedding-side plumbing: batching for the corpus path, plus a cheap
//! deterministic embedder for tests and offline development.

use std::hash::Hasher;

use anyhow::{bail, Result};
use tracing::debug;
use twox_hash::XxHash64;

use docset_core::traits::Embedder;

/// Batch size tuned for typical embedding-service request limits.
pub const EMBED_BATCH_SIZE: usize = 16;

/// Wraps an [`Embedder`] and feeds it fixed-size batches, preserving input
/// order across batch boundaries. Batches are sent sequentially; the
/// corpus path is throughput-bound, not latency-bound.
pub struct BatchedEmbedder<E> {
    inner: E,
    batch_size: usize,
}

impl<E: Embedder> BatchedEmbedder<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            batch_size: EMBED_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub async fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out: Vec<Vec<f32>> = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let vectors = self.inner.embed(batch).await?;
            if vectors.len() != batch.len() {
                bail!(
                    "embedder returned {} vectors for a batch of {}",
                    vectors.len(),
                    batch.len()
                );
            }
            out.extend(vectors);
        }
        debug!(texts = texts.len(), "embedding batches done");
        Ok(out)
    }
}

impl<E: Embedder> Embedder for BatchedEmbedder<E> {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.embed_all(texts).await
    }
}

/// Deterministic bag-of-words hash embedder. Not semantically meaningful;
/// it exists so retrieval plumbing can run without a model.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];
        for token in text.to_lowercase().split_whitespace() {
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.as_bytes());
            let idx = (hasher.finish() % self.dim as u64) as usize;
            v[idx] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl Embedder for HashEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
