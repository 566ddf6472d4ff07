use std::sync::{Arc, Mutex};

use docset_core::traits::{Embedder, LexicalSearcher, VectorSearcher};
use docset_core::types::{SearchHit, SourceKind, StoredFields};
use docset_retrieve::embed::{BatchedEmbedder, HashEmbedder};
use docset_retrieve::engine::{HybridRetriever, QueryOptions};

fn hit(id: &str, score: f32) -> SearchHit {
    SearchHit {
        id: id.to_string(),
        score,
        // Deliberately mis-tagged; the engine must overwrite provenance.
        source: SourceKind::Lexical,
        fields: StoredFields {
            text: format!("text of {id}"),
            ..Default::default()
        },
    }
}

struct FixedEmbedder {
    vector: Vec<f32>,
}

impl Embedder for FixedEmbedder {
    async fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(vec![self.vector.clone(); texts.len()])
    }
}

struct StubVector {
    hits: Vec<SearchHit>,
    seen_k: Arc<Mutex<Option<usize>>>,
}

impl VectorSearcher for StubVector {
    async fn search(&self, _vector: Vec<f32>, k: usize) -> anyhow::Result<Vec<SearchHit>> {
        *self.seen_k.lock().unwrap() = Some(k);
        Ok(self.hits.clone())
    }
}

struct StubLexical {
    hits: Vec<SearchHit>,
}

impl LexicalSearcher for StubLexical {
    async fn search(&self, _query: &str, _k: usize) -> anyhow::Result<Vec<SearchHit>> {
        Ok(self.hits.clone())
    }
}

#[tokio::test]
async fn test_query_fuses_and_normalizes_provenance() {
    let mut vector_a = hit("doc1:a", 0.93);
    // A snippet on a vector hit is bogus; the engine must clear it.
    vector_a.fields.snippet = Some("stale".to_string());
    let vector_b = hit("doc2:b", 0.80);

    let mut lexical_b = hit("doc2:b", 11.0);
    lexical_b.fields.snippet = Some("matched fragment".to_string());
    let lexical_c = hit("doc3:c", 7.0);

    let retriever = HybridRetriever::new(
        FixedEmbedder {
            vector: vec![1.0, 0.0],
        },
        StubVector {
            hits: vec![vector_a, vector_b],
            seen_k: Arc::default(),
        },
        StubLexical {
            hits: vec![lexical_b, lexical_c],
        },
        QueryOptions {
            k: 6,
            min_score: 0.0,
            fetch_depth: 17,
        },
    );

    let results = retriever.query("crane inspection interval").await.unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.hit.id.as_str()).collect();
    // doc2:b was found by both engines and outranks either single hit.
    assert_eq!(ids, vec!["doc2:b", "doc1:a", "doc3:c"]);

    assert_eq!(results[0].hit.source, SourceKind::Vector);
    assert_eq!(
        results[0].hit.fields.snippet.as_deref(),
        Some("matched fragment")
    );
    assert_eq!(results[1].hit.source, SourceKind::Vector);
    assert_eq!(results[1].hit.fields.snippet, None);
    assert_eq!(results[2].hit.source, SourceKind::Lexical);
}

#[tokio::test]
async fn test_query_requests_fetch_depth_candidates() {
    let seen_k = Arc::new(Mutex::new(None));
    let retriever = HybridRetriever::new(
        FixedEmbedder { vector: vec![0.5] },
        StubVector {
            hits: vec![],
            seen_k: Arc::clone(&seen_k),
        },
        StubLexical { hits: vec![] },
        QueryOptions {
            fetch_depth: 20,
            ..QueryOptions::default()
        },
    );
    let results = retriever.query("anything").await.unwrap();
    assert!(results.is_empty());
    assert_eq!(*seen_k.lock().unwrap(), Some(20));
}

struct BatchRecorder {
    batch_sizes: Arc<Mutex<Vec<usize>>>,
}

impl Embedder for BatchRecorder {
    async fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.batch_sizes.lock().unwrap().push(texts.len());
        // Each text embeds to its numeric payload so order is checkable.
        Ok(texts
            .iter()
            .map(|t| vec![t.parse::<f32>().unwrap()])
            .collect())
    }
}

#[tokio::test]
async fn test_batched_embedder_preserves_order_across_batches() {
    let texts: Vec<String> = (0..40).map(|i| i.to_string()).collect();
    let batch_sizes = Arc::new(Mutex::new(Vec::new()));
    let embedder = BatchedEmbedder::new(BatchRecorder {
        batch_sizes: Arc::clone(&batch_sizes),
    })
    .with_batch_size(16);

    let vectors = embedder.embed_all(&texts).await.unwrap();
    assert_eq!(vectors.len(), 40);
    for (i, v) in vectors.iter().enumerate() {
        assert_eq!(v[0], i as f32);
    }
    assert_eq!(*batch_sizes.lock().unwrap(), vec![16, 16, 8]);
}

struct ShortChangingEmbedder;

impl Embedder for ShortChangingEmbedder {
    async fn embed(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(vec![vec![0.0]])
    }
}

#[tokio::test]
async fn test_batched_embedder_rejects_length_mismatch() {
    let texts: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
    let embedder = BatchedEmbedder::new(ShortChangingEmbedder).with_batch_size(3);
    assert!(embedder.embed_all(&texts).await.is_err());
}

#[tokio::test]
async fn test_hash_embedder_is_deterministic_and_normalized() {
    let embedder = HashEmbedder::new(64);
    let texts = vec!["crane inspection interval".to_string()];
    let a = embedder.embed(&texts).await.unwrap();
    let b = embedder.embed(&texts).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a[0].len(), 64);

    let norm: f32 = a[0].iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-5);

    let other = embedder
        .embed(&["completely different words".to_string()])
        .await
        .unwrap();
    assert_ne!(a[0], other[0]);
}
