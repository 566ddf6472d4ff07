//! Interfaces of the external collaborators this core consumes.
//!
//! Extraction, recognition and transcription are synchronous (local
//! libraries or models); embedding, search and answer generation are async
//! network services. None of these are implemented here.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;

use crate::types::{
    DocBlock, FusedResult, PageUnit, RawImage, Recognition, SearchHit, SlideUnit, Transcription,
};

/// Extraction adapter for paginated documents.
pub trait PageExtractor: Send + Sync {
    /// Ordered per-page native text.
    fn pages(&self, path: &Path) -> anyhow::Result<Vec<PageUnit>>;
    /// Already-parsed tables as markdown, keyed by 1-based page number.
    fn tables(&self, path: &Path) -> anyhow::Result<HashMap<u32, Vec<String>>>;
    /// Rendered image of one page, for recognition fallback on sparse pages.
    fn page_image(&self, path: &Path, page: u32) -> anyhow::Result<Option<RawImage>>;
}

/// Extraction adapter for slide decks.
pub trait SlideExtractor: Send + Sync {
    fn slides(&self, path: &Path) -> anyhow::Result<Vec<SlideUnit>>;
}

/// Extraction adapter for word-processor documents: an ordered stream of
/// structural blocks.
pub trait BlockExtractor: Send + Sync {
    fn blocks(&self, path: &Path) -> anyhow::Result<Vec<DocBlock>>;
}

/// Image-to-text recognition service.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, image: &RawImage) -> anyhow::Result<Recognition>;
}

/// Speech-to-text service for audio/video files.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, media: &Path) -> anyhow::Result<Transcription>;
}

/// Batch embedding service. The output must be the same length and order
/// as the input.
pub trait Embedder: Send + Sync {
    fn embed(
        &self,
        texts: &[String],
    ) -> impl Future<Output = anyhow::Result<Vec<Vec<f32>>>> + Send;
}

/// Approximate-nearest-neighbor query against the search service.
pub trait VectorSearcher: Send + Sync {
    fn search(
        &self,
        vector: Vec<f32>,
        k: usize,
    ) -> impl Future<Output = anyhow::Result<Vec<SearchHit>>> + Send;
}

/// Keyword/BM25-style query against the search service. Hits may carry a
/// highlighted match snippet in their stored fields.
pub trait LexicalSearcher: Send + Sync {
    fn search(
        &self,
        query: &str,
        k: usize,
    ) -> impl Future<Output = anyhow::Result<Vec<SearchHit>>> + Send;
}

/// Answer-generation service consuming the fused, tagged context passages.
pub trait AnswerGenerator: Send + Sync {
    fn answer(
        &self,
        query: &str,
        context: &[FusedResult],
    ) -> impl Future<Output = anyhow::Result<String>> + Send;
}
