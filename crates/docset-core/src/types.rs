//! Domain types shared by the ingestion pipeline and the retrieval engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids;

pub type ChunkId = String;

/// Which kind of source material a chunk was extracted from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    Paginated,
    SlideDeck,
    Transcript,
    WordDoc,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Paginated => "paginated",
            SourceType::SlideDeck => "slide-deck",
            SourceType::Transcript => "transcript",
            SourceType::WordDoc => "word-doc",
        }
    }
}

/// How the chunk's text was obtained when it did not come from native
/// extraction: recognition output or a table rendered as markdown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Caption {
    Ocr,
    Table,
}

/// The atomic indexable unit and the sole hand-off artifact between
/// ingestion and indexing.
///
/// - `doc_id`: stable document identity derived from the file content hash
/// - `chunk_id`: deterministic per-chunk id (see [`Chunk::finalize`])
/// - exactly one of `page`/`slide`/`timecode`/`section` is meaningful for a
///   given source type; this is a convention, not enforced by the type
/// - `confidence` (0-100) is present only for recognition-derived text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub doc_id: String,
    pub chunk_id: ChunkId,
    pub source: SourceType,
    pub title: String,
    pub page: Option<u32>,
    pub slide: Option<u32>,
    pub timecode: Option<String>,
    pub section: Option<String>,
    pub text: String,
    pub caption: Option<Caption>,
    pub confidence: Option<f32>,
    pub created_at: DateTime<Utc>,
}

impl Chunk {
    pub fn new(
        doc_id: impl Into<String>,
        source: SourceType,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            chunk_id: String::new(),
            source,
            title: title.into(),
            page: None,
            slide: None,
            timecode: None,
            section: None,
            text: text.into(),
            caption: None,
            confidence: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_slide(mut self, slide: u32) -> Self {
        self.slide = Some(slide);
        self
    }

    pub fn with_timecode(mut self, timecode: impl Into<String>) -> Self {
        self.timecode = Some(timecode.into());
        self
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_caption(mut self, caption: Caption) -> Self {
        self.caption = Some(caption);
        self
    }

    pub fn with_confidence(mut self, confidence: Option<f32>) -> Self {
        self.confidence = confidence;
        self
    }

    /// The single location string used for identity: whichever locator field
    /// is set, or "0" when none is (plain transcripts).
    pub fn locator(&self) -> String {
        if let Some(p) = self.page {
            return p.to_string();
        }
        if let Some(s) = self.slide {
            return s.to_string();
        }
        if let Some(t) = &self.timecode {
            return t.clone();
        }
        if let Some(s) = &self.section {
            return s.clone();
        }
        "0".to_string()
    }

    /// Derives the deterministic `chunk_id` from {doc id, source type,
    /// locator, content} so re-ingesting an unchanged unit overwrites the
    /// indexed record instead of duplicating it.
    pub fn finalize(mut self) -> Self {
        self.chunk_id = ids::stable_chunk_id(
            &self.doc_id,
            self.source.as_str(),
            &self.locator(),
            &self.text,
        );
        self
    }
}

/// One extracted page of a paginated document. `number` is 1-based.
#[derive(Debug, Clone)]
pub struct PageUnit {
    pub number: u32,
    pub text: String,
}

/// One extracted slide: concatenated shape text plus embedded images and
/// tables already rendered as markdown.
#[derive(Debug, Clone)]
pub struct SlideUnit {
    pub number: u32,
    pub text: String,
    pub images: Vec<RawImage>,
    pub tables: Vec<String>,
}

/// A decoded raster image handed to the recognition collaborator.
#[derive(Debug, Clone)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RawImage {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// A structural block of a word-processor document. One case per block
/// kind, each carrying only the fields relevant to that kind.
#[derive(Debug, Clone)]
pub enum DocBlock {
    Heading { level: u8, text: String },
    BiggerFont(String),
    Underlined(String),
    Bold(String),
    Italic(String),
    ParagraphBreak(String),
    Paragraph(String),
    Table { markdown: String },
    Image(RawImage),
}

/// One raw speech-recognition time segment.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Recognition output for one image: text plus an average confidence on a
/// 0-100 scale when the backend reports one.
#[derive(Debug, Clone)]
pub struct Recognition {
    pub text: String,
    pub confidence: Option<f32>,
}

/// Full transcription of one media file.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub segments: Vec<TranscriptSegment>,
    pub language: Option<String>,
}

/// Indicates which retrieval path produced a hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    Vector,
    Lexical,
}

/// The chunk fields stored in (and read back from) the search service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredFields {
    pub text: String,
    pub title: Option<String>,
    pub page: Option<u32>,
    pub slide: Option<u32>,
    pub timecode: Option<String>,
    pub section: Option<String>,
    pub source_type: Option<SourceType>,
    /// Highlighted match fragment; only lexical hits ever carry one.
    pub snippet: Option<String>,
}

/// One candidate from either retrieval path. `id` matches
/// `Chunk::chunk_id`. `score` is engine-specific but higher is always
/// better; fusion is rank-based and never compares scores across engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: ChunkId,
    pub score: f32,
    pub source: SourceKind,
    pub fields: StoredFields,
}

/// A search hit annotated with its fused score, ready for the
/// answer-generation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedResult {
    pub hit: SearchHit,
    pub score: f32,
}

impl FusedResult {
    /// Document identity for the diversity cap: the chunk id prefix before
    /// its first separator.
    pub fn doc_id(&self) -> &str {
        self.hit.id.split(':').next().unwrap_or(&self.hit.id)
    }
}
